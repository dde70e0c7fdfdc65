//! Point locations attached to pharmacies.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;
use validator::Validate;

use crate::{EngineError, FieldViolation, ResultEngine, util::parse_uuid, validation};

#[derive(Clone, Debug, PartialEq)]
pub struct GeoLocation {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

/// A location together with the pharmacy that owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct PharmacyLocation {
    pub pharmacy_id: Uuid,
    pub location: GeoLocation,
}

/// Raw geolocation upsert request. Every member is mandatory.
#[derive(Clone, Debug, Default, Validate)]
pub struct GeoLocationInput {
    #[validate(
        required(message = "latitude is required"),
        range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90")
    )]
    pub latitude: Option<f64>,
    #[validate(
        required(message = "longitude is required"),
        range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180")
    )]
    pub longitude: Option<f64>,
    #[validate(required(message = "pharmacyId is required"))]
    pub pharmacy_id: Option<String>,
}

/// Validated coordinates for a known pharmacy identifier.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Coordinates {
    pub pharmacy_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocationInput {
    pub(crate) fn validate_into(self) -> ResultEngine<Coordinates> {
        let pharmacy_id = self
            .pharmacy_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        let input = Self {
            pharmacy_id,
            ..self
        };

        let mut violations = validation::collect(input.validate());
        for (field, value) in [("latitude", input.latitude), ("longitude", input.longitude)] {
            if value.is_some_and(|v| !v.is_finite()) {
                violations.push(FieldViolation::new(field, format!("{field} must be finite")));
            }
        }
        if !violations.is_empty() {
            return Err(EngineError::Validation(violations));
        }

        match (input.pharmacy_id, input.latitude, input.longitude) {
            (Some(pharmacy_id), Some(latitude), Some(longitude)) => Ok(Coordinates {
                pharmacy_id,
                latitude,
                longitude,
            }),
            _ => Err(EngineError::Validation(vec![FieldViolation::new(
                "pharmacyId",
                "latitude, longitude and pharmacyId are required",
            )])),
        }
    }
}

impl TryFrom<Model> for GeoLocation {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "geo location")?,
            latitude: model.latitude,
            longitude: model.longitude,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Coordinates> for ActiveModel {
    fn from(value: &Coordinates) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            latitude: ActiveValue::Set(value.latitude),
            longitude: ActiveValue::Set(value.longitude),
            updated_at: ActiveValue::Set(Utc::now()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "geo_locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::pharmacies::Entity")]
    Pharmacy,
}

impl Related<super::pharmacies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pharmacy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(lat: Option<f64>, lon: Option<f64>, id: Option<&str>) -> GeoLocationInput {
        GeoLocationInput {
            latitude: lat,
            longitude: lon,
            pharmacy_id: id.map(ToString::to_string),
        }
    }

    #[test]
    fn accepts_complete_input() {
        let coords = input(Some(12.5), Some(77.6), Some(" abc "))
            .validate_into()
            .unwrap();
        assert_eq!(coords.pharmacy_id, "abc");
        assert_eq!(coords.latitude, 12.5);
        assert_eq!(coords.longitude, 77.6);
    }

    #[test]
    fn reports_every_missing_member() {
        let Err(EngineError::Validation(violations)) = input(None, None, Some("  ")).validate_into()
        else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["latitude", "longitude", "pharmacyId"]);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let Err(EngineError::Validation(violations)) =
            input(Some(91.0), Some(-181.0), Some("abc")).validate_into()
        else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 2);
    }
}
