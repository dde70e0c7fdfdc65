//! The module contains `PatientProfile`, the medical profile attached
//! one-to-one to a patient [`Account`](crate::Account).

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Address, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Demographic and medical data of a patient.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Address,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
}

impl From<&PatientProfile> for ActiveModel {
    fn from(value: &PatientProfile) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            full_name: ActiveValue::Set(value.full_name.clone()),
            date_of_birth: ActiveValue::Set(value.date_of_birth),
            gender: ActiveValue::Set(value.gender.as_str().to_string()),
            street_address: ActiveValue::Set(value.address.street_address.clone()),
            city: ActiveValue::Set(value.address.city.clone()),
            state_province: ActiveValue::Set(value.address.state_province.clone()),
            postal_code: ActiveValue::Set(value.address.postal_code.clone()),
            country: ActiveValue::Set(value.address.country.clone()),
            medical_conditions: ActiveValue::Set(value.medical_conditions.clone()),
            allergies: ActiveValue::Set(value.allergies.clone()),
        }
    }
}

impl TryFrom<Model> for PatientProfile {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let gender = Gender::parse(&model.gender).ok_or_else(|| {
            EngineError::Database(DbErr::Custom(format!(
                "invalid stored gender: {}",
                model.gender
            )))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "patient profile")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            full_name: model.full_name,
            date_of_birth: model.date_of_birth,
            gender,
            address: Address {
                street_address: model.street_address,
                city: model.city,
                state_province: model.state_province,
                postal_code: model.postal_code,
                country: model.country,
            },
            medical_conditions: model.medical_conditions,
            allergies: model.allergies,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "patient_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub account_id: String,
    pub full_name: String,
    pub date_of_birth: Date,
    pub gender: String,
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub medical_conditions: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub allergies: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
