//! Signup API endpoints

use api_types::{
    Role,
    signup::{
        PatientCreated, PatientSignup, PharmacyCreated, PharmacyView, ProfileCreated, UserCreated,
    },
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{LicenseDocument, PatientSignupInput, PharmacySignupInput};

use crate::{ServerError, server::ServerState};

const LICENSE_FIELD: &str = "licenseDocument";

fn patient_input(payload: PatientSignup) -> PatientSignupInput {
    PatientSignupInput {
        email: payload.email,
        username: payload.username,
        password: payload.password,
        confirm_password: payload.confirm_password,
        phone: payload.phone,
        role: payload.role,
        full_name: payload.full_name,
        date_of_birth: payload.date_of_birth,
        gender: payload.gender,
        street_address: payload.street_address,
        city: payload.city,
        state_province: payload.state_province,
        postal_code: payload.postal_code,
        country: payload.country,
        medical_conditions: payload.medical_conditions,
        allergies: payload.allergies,
    }
}

fn api_role(role: engine::Role) -> Role {
    match role {
        engine::Role::Patient => Role::Patient,
        engine::Role::Pharmacy => Role::Pharmacy,
    }
}

fn multipart_error(err: MultipartError) -> ServerError {
    ServerError::Generic(err.body_text())
}

/// Handle requests for registering a patient account with its profile
pub async fn patient(
    State(state): State<ServerState>,
    payload: Result<Json<PatientSignup>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientCreated>), ServerError> {
    let Json(payload) = payload.map_err(|rejection| ServerError::Generic(rejection.body_text()))?;

    let registered = state.engine.register_patient(patient_input(payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(PatientCreated {
            success: true,
            user: UserCreated {
                id: registered.account.id.to_string(),
                email: registered.account.email,
                role: api_role(registered.account.role),
            },
            profile: ProfileCreated {
                full_name: registered.profile.full_name,
            },
        }),
    ))
}

/// Handle multipart requests for registering a pharmacy.
///
/// Text parts fill the signup form by name; the `licenseDocument` part
/// carries the license. An empty file part counts as no document.
pub async fn pharmacy(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PharmacyCreated>), ServerError> {
    let mut input = PharmacySignupInput::default();
    let mut document = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == LICENSE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            document = (!bytes.is_empty()).then(|| LicenseDocument {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = Some(field.text().await.map_err(multipart_error)?);
        match name.as_str() {
            "name" => input.name = value,
            "email" => input.email = value,
            "username" => input.username = value,
            "password" => input.password = value,
            "confirmPassword" => input.confirm_password = value,
            "licenseNumber" => input.license_number = value,
            "phone" => input.phone = value,
            "role" => input.role = value,
            "streetAddress" => input.street_address = value,
            "city" => input.city = value,
            "stateProvince" => input.state_province = value,
            "postalCode" => input.postal_code = value,
            "country" => input.country = value,
            other => tracing::debug!("ignoring unknown signup field {other}"),
        }
    }

    let pharmacy = state.engine.register_pharmacy(input, document).await?;

    Ok((
        StatusCode::CREATED,
        Json(PharmacyCreated {
            success: true,
            pharmacy: PharmacyView {
                id: pharmacy.id.to_string(),
                name: pharmacy.name,
                email: pharmacy.email,
                username: pharmacy.username,
                verified: pharmacy.verified,
                license_number: pharmacy.license_number,
            },
            message: "Pharmacy registered, pending verification".to_string(),
        }),
    ))
}
