use sea_orm::ActiveModelTrait;
use uuid::Uuid;

use crate::{
    Account, EngineError, LicenseDocument, PatientProfile, PatientSignupInput, Pharmacy,
    PharmacySignup, PharmacySignupInput, ResultEngine, Role, credentials, patient_profiles,
};

use super::{Engine, with_tx};

/// Result of a patient signup: the account and its profile, created together.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredPatient {
    pub account: Account,
    pub profile: PatientProfile,
}

impl Engine {
    /// Registers a patient: one account plus one profile, both or neither.
    pub async fn register_patient(
        &self,
        input: PatientSignupInput,
    ) -> ResultEngine<RegisteredPatient> {
        let signup = input.validate_into()?;
        let credentials = signup.credentials;

        self.ensure_account_available(&credentials.email, &credentials.username)
            .await?;

        let password_hash = credentials::hash_password_blocking(credentials.password).await?;

        let account = Account::new(
            credentials.email,
            credentials.username,
            credentials.phone,
            Role::Patient,
        );
        let profile = PatientProfile {
            id: Uuid::new_v4(),
            account_id: account.id,
            full_name: signup.full_name,
            date_of_birth: signup.date_of_birth,
            gender: signup.gender,
            address: signup.address,
            medical_conditions: signup.medical_conditions,
            allergies: signup.allergies,
        };

        let persisted: ResultEngine<()> = with_tx!(self, |db_tx| {
            match account.active_model(password_hash).insert(&db_tx).await {
                Ok(_) => patient_profiles::ActiveModel::from(&profile)
                    .insert(&db_tx)
                    .await
                    .map(|_| ())
                    .map_err(EngineError::from),
                Err(err) => Err(EngineError::from(err)),
            }
        });
        if let Err(err) = &persisted {
            log_write_failure("patient", &account.username, err);
        }
        persisted?;

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            "patient registered"
        );
        Ok(RegisteredPatient { account, profile })
    }

    /// Registers a pharmacy with its license document.
    ///
    /// The document is written before the row so a stored pharmacy never
    /// points at a missing file. The reverse is possible: if anything fails
    /// after the document is stored, the document is left orphaned and a
    /// warning names it.
    pub async fn register_pharmacy(
        &self,
        input: PharmacySignupInput,
        document: Option<LicenseDocument>,
    ) -> ResultEngine<Pharmacy> {
        let signup = input.validate_into()?;
        let document = document.ok_or(EngineError::MissingDocument)?;
        let extension = document.validate(self.max_document_bytes)?;

        self.ensure_pharmacy_available(
            &signup.credentials.email,
            &signup.credentials.username,
            &signup.license_number,
        )
        .await?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let document_url = self.documents.store(&stored_name, &document.bytes).await?;

        let username = signup.credentials.username.clone();
        let pharmacy = self
            .persist_pharmacy(signup, document_url.clone())
            .await
            .inspect_err(|err| {
                log_write_failure("pharmacy", &username, err);
                tracing::warn!(
                    document = %document_url,
                    "license document orphaned by failed pharmacy registration"
                );
            })?;

        tracing::info!(
            pharmacy_id = %pharmacy.id,
            username = %pharmacy.username,
            "pharmacy registered"
        );
        Ok(pharmacy)
    }

    async fn persist_pharmacy(
        &self,
        signup: PharmacySignup,
        license_document_url: String,
    ) -> ResultEngine<Pharmacy> {
        let credentials = signup.credentials;
        let password_hash = credentials::hash_password_blocking(credentials.password).await?;

        let pharmacy = Pharmacy {
            id: Uuid::new_v4(),
            name: signup.name,
            email: credentials.email,
            username: credentials.username,
            license_number: signup.license_number,
            phone: credentials.phone,
            address: signup.address,
            license_document_url,
            verified: false,
            geo_location_id: None,
            created_at: chrono::Utc::now(),
        };

        with_tx!(self, |db_tx| {
            pharmacy
                .active_model(password_hash)
                .insert(&db_tx)
                .await
                .map_err(EngineError::from)
        })?;

        Ok(pharmacy)
    }
}

/// Conflicts are expected outcomes; anything else at write time is logged
/// with context before it is surfaced as an internal error.
fn log_write_failure(kind: &str, username: &str, err: &EngineError) {
    match err {
        EngineError::ExistingKey(field) => {
            tracing::info!(%username, %field, "{kind} registration lost a uniqueness race");
        }
        other => {
            tracing::error!(%username, "failed to persist {kind} registration: {other}");
        }
    }
}
