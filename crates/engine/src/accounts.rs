//! Accounts: the authentication identity of a patient.
//!
//! The role is written once at creation and no operation updates it.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Patient,
    Pharmacy,
}

impl Role {
    /// Returns the canonical role string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "PATIENT",
            Self::Pharmacy => "PHARMACY",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PATIENT" => Ok(Self::Patient),
            "PHARMACY" => Ok(Self::Pharmacy),
            other => Err(EngineError::InvalidRole(format!("unknown role: {other}"))),
        }
    }
}

/// An account as returned to callers. The credential hash never leaves the
/// entity model.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: String, username: String, phone: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            phone,
            role,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn active_model(&self, password_hash: String) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            email: ActiveValue::Set(self.email.clone()),
            username: ActiveValue::Set(self.username.clone()),
            password_hash: ActiveValue::Set(password_hash),
            phone: ActiveValue::Set(self.phone.clone()),
            role: ActiveValue::Set(self.role.as_str().to_string()),
            created_at: ActiveValue::Set(self.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            role: Role::try_from(model.role.as_str())?,
            email: model.email,
            username: model.username,
            phone: model.phone,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub phone: String,
    pub role: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::patient_profiles::Entity")]
    PatientProfile,
}

impl Related<super::patient_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PatientProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_string() {
        for role in [Role::Patient, Role::Pharmacy] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert_eq!(Role::try_from(" patient ").unwrap(), Role::Patient);
        assert!(Role::try_from("ADMIN").is_err());
    }

    #[test]
    fn active_model_carries_hash_but_account_does_not() {
        let account = Account::new(
            "a@x.com".to_string(),
            "abc".to_string(),
            "555".to_string(),
            Role::Patient,
        );
        let model = account.active_model("hash".to_string());
        assert_eq!(model.password_hash.unwrap(), "hash");
        assert_eq!(model.role.unwrap(), "PATIENT");
    }
}
