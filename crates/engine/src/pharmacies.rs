//! The module contains `Pharmacy`, a standalone registrable entity.
//!
//! A pharmacy carries its own credentials instead of an [`Account`] row and
//! starts unverified; verification happens outside this system.
//!
//! [`Account`]: crate::Account

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Address, EngineError, GeoLocation, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub license_number: String,
    pub phone: String,
    pub address: Address,
    /// Retrievable location of the uploaded license document.
    pub license_document_url: String,
    pub verified: bool,
    /// Link to the pharmacy location. It may dangle if the row was removed
    /// out of band.
    pub geo_location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A pharmacy together with its resolved location, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct PharmacyListing {
    pub pharmacy: Pharmacy,
    pub location: Option<GeoLocation>,
}

impl Pharmacy {
    pub(crate) fn active_model(&self, password_hash: String) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            name: ActiveValue::Set(self.name.clone()),
            email: ActiveValue::Set(self.email.clone()),
            username: ActiveValue::Set(self.username.clone()),
            password_hash: ActiveValue::Set(password_hash),
            license_number: ActiveValue::Set(self.license_number.clone()),
            phone: ActiveValue::Set(self.phone.clone()),
            street_address: ActiveValue::Set(self.address.street_address.clone()),
            city: ActiveValue::Set(self.address.city.clone()),
            state_province: ActiveValue::Set(self.address.state_province.clone()),
            postal_code: ActiveValue::Set(self.address.postal_code.clone()),
            country: ActiveValue::Set(self.address.country.clone()),
            license_document_url: ActiveValue::Set(self.license_document_url.clone()),
            verified: ActiveValue::Set(self.verified),
            geo_location_id: ActiveValue::Set(self.geo_location_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(self.created_at),
        }
    }
}

impl TryFrom<Model> for Pharmacy {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let geo_location_id = model
            .geo_location_id
            .as_deref()
            .map(|id| parse_uuid(id, "geo location"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "pharmacy")?,
            name: model.name,
            email: model.email,
            username: model.username,
            license_number: model.license_number,
            phone: model.phone,
            address: Address {
                street_address: model.street_address,
                city: model.city,
                state_province: model.state_province,
                postal_code: model.postal_code,
                country: model.country,
            },
            license_document_url: model.license_document_url,
            verified: model.verified,
            geo_location_id,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pharmacies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    #[sea_orm(unique)]
    pub license_number: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    pub license_document_url: String,
    pub verified: bool,
    #[sea_orm(nullable)]
    pub geo_location_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::geo_locations::Entity",
        from = "Column::GeoLocationId",
        to = "super::geo_locations::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    GeoLocation,
}

impl Related<super::geo_locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeoLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
