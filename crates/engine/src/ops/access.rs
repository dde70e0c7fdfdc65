use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, GeoLocation, PatientProfile, Pharmacy, PharmacyListing, ResultEngine, Role,
    accounts, credentials, geo_locations, patient_profiles, pharmacies, util::parse_uuid,
};

use super::Engine;

/// The authenticated caller of a request. Handlers receive it explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl Engine {
    /// Resolves credentials into a [`Caller`] of the given role.
    ///
    /// Patients authenticate against `accounts`, pharmacies against their own
    /// registration row. Unknown users and wrong passwords are both
    /// [`EngineError::Unauthorized`].
    pub async fn require_user(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> ResultEngine<Caller> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::Unauthorized);
        }

        let found = match role {
            Role::Patient => accounts::Entity::find()
                .filter(accounts::Column::Username.eq(username))
                .filter(accounts::Column::Role.eq(Role::Patient.as_str()))
                .one(&self.database)
                .await?
                .map(|m| (m.id, m.email, m.password_hash)),
            Role::Pharmacy => pharmacies::Entity::find()
                .filter(pharmacies::Column::Username.eq(username))
                .one(&self.database)
                .await?
                .map(|m| (m.id, m.email, m.password_hash)),
        };
        let Some((id, email, password_hash)) = found else {
            tracing::debug!(%username, role = role.as_str(), "unknown user");
            return Err(EngineError::Unauthorized);
        };

        if !credentials::verify_password_blocking(password.to_string(), password_hash).await? {
            tracing::debug!(%username, role = role.as_str(), "wrong password");
            return Err(EngineError::Unauthorized);
        }

        Ok(Caller {
            id: parse_uuid(&id, "caller")?,
            username: username.to_string(),
            email,
            role,
        })
    }

    /// The profile of a patient caller.
    pub async fn patient_profile(&self, caller: &Caller) -> ResultEngine<PatientProfile> {
        if caller.role != Role::Patient {
            return Err(EngineError::Unauthorized);
        }
        let model = patient_profiles::Entity::find()
            .filter(patient_profiles::Column::AccountId.eq(caller.id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("patient profile not exists".to_string()))?;
        PatientProfile::try_from(model)
    }

    /// All pharmacies ordered by name, with their location when the link
    /// resolves.
    pub async fn pharmacies(&self) -> ResultEngine<Vec<PharmacyListing>> {
        let rows = pharmacies::Entity::find()
            .find_also_related(geo_locations::Entity)
            .order_by_asc(pharmacies::Column::Name)
            .all(&self.database)
            .await?;

        rows.into_iter()
            .map(|(pharmacy, location)| -> ResultEngine<PharmacyListing> {
                Ok(PharmacyListing {
                    pharmacy: Pharmacy::try_from(pharmacy)?,
                    location: location.map(GeoLocation::try_from).transpose()?,
                })
            })
            .collect()
    }
}
