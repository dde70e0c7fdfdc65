//! Endpoints for the authenticated caller

use api_types::{
    Role,
    user::{Me, PatientProfile},
};
use axum::{Extension, Json, extract::State};
use engine::Caller;

use crate::{ServerError, server::ServerState};

/// Handle requests for the identity of the caller
pub async fn me(Extension(caller): Extension<Caller>) -> Json<Me> {
    Json(Me {
        id: caller.id.to_string(),
        username: caller.username,
        email: caller.email,
        role: match caller.role {
            engine::Role::Patient => Role::Patient,
            engine::Role::Pharmacy => Role::Pharmacy,
        },
    })
}

/// Handle requests for the profile of a patient caller
pub async fn patient_profile(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<PatientProfile>, ServerError> {
    let profile = state.engine.patient_profile(&caller).await?;

    Ok(Json(PatientProfile {
        account_id: profile.account_id.to_string(),
        full_name: profile.full_name,
        date_of_birth: profile.date_of_birth.format("%Y-%m-%d").to_string(),
        gender: profile.gender.as_str().to_string(),
        street_address: profile.address.street_address,
        city: profile.address.city,
        state_province: profile.address.state_province,
        postal_code: profile.address.postal_code,
        country: profile.address.country,
        medical_conditions: profile.medical_conditions,
        allergies: profile.allergies,
    }))
}
