use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};

use crate::{
    EngineError, GeoLocation, GeoLocationInput, PharmacyLocation, ResultEngine,
    geo_locations::{self, Coordinates},
    pharmacies,
    util::{parse_lookup_id, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates or updates the location of a pharmacy.
    ///
    /// The link stored on the pharmacy is never trusted on its own: the linked
    /// row is re-fetched inside the transaction and, when it has vanished, a
    /// fresh row is created and linked instead.
    pub async fn upsert_pharmacy_location(
        &self,
        input: GeoLocationInput,
    ) -> ResultEngine<PharmacyLocation> {
        let coordinates = input.validate_into()?;
        let pharmacy_id = parse_lookup_id(&coordinates.pharmacy_id, "pharmacy")?;

        let model = with_tx!(self, |db_tx| {
            self.upsert_location_in(&db_tx, pharmacy_id, &coordinates)
                .await
        })?;

        tracing::debug!(
            %pharmacy_id,
            geo_location_id = %model.id,
            "pharmacy location saved"
        );
        Ok(PharmacyLocation {
            pharmacy_id,
            location: GeoLocation::try_from(model)?,
        })
    }

    /// Location of a pharmacy. A missing or dangling link is reported as not
    /// found.
    pub async fn pharmacy_location(&self, pharmacy_id: &str) -> ResultEngine<PharmacyLocation> {
        let pharmacy_uuid = parse_lookup_id(pharmacy_id, "pharmacy")?;
        let (pharmacy, location) = pharmacies::Entity::find_by_id(pharmacy_uuid.to_string())
            .find_also_related(geo_locations::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("pharmacy not exists".to_string()))?;
        let location = location.ok_or_else(|| {
            EngineError::KeyNotFound(format!("location of pharmacy {}", pharmacy.id))
        })?;

        Ok(PharmacyLocation {
            pharmacy_id: parse_uuid(&pharmacy.id, "pharmacy")?,
            location: GeoLocation::try_from(location)?,
        })
    }

    async fn upsert_location_in(
        &self,
        db_tx: &DatabaseTransaction,
        pharmacy_id: uuid::Uuid,
        coordinates: &Coordinates,
    ) -> ResultEngine<geo_locations::Model> {
        let pharmacy = pharmacies::Entity::find_by_id(pharmacy_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("pharmacy not exists".to_string()))?;

        let linked = match pharmacy.geo_location_id.as_deref() {
            Some(location_id) => {
                geo_locations::Entity::find_by_id(location_id.to_string())
                    .one(db_tx)
                    .await?
            }
            None => None,
        };

        if let Some(existing) = linked {
            let mut active: geo_locations::ActiveModel = existing.into();
            active.latitude = ActiveValue::Set(coordinates.latitude);
            active.longitude = ActiveValue::Set(coordinates.longitude);
            active.updated_at = ActiveValue::Set(Utc::now());
            return Ok(active.update(db_tx).await?);
        }

        if let Some(stale) = pharmacy.geo_location_id.as_deref() {
            tracing::warn!(
                %pharmacy_id,
                geo_location_id = stale,
                "pharmacy links a missing location, relinking"
            );
        }

        let created = geo_locations::ActiveModel::from(coordinates)
            .insert(db_tx)
            .await?;
        let mut pharmacy: pharmacies::ActiveModel = pharmacy.into();
        pharmacy.geo_location_id = ActiveValue::Set(Some(created.id.clone()));
        pharmacy.update(db_tx).await?;

        Ok(created)
    }
}
