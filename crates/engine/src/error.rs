//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a payload breaks its schema, carrying every
//!   violated field.
//! - [`MissingDocument`] thrown when a pharmacy signs up without a license.
//! - [`ExistingKey`] thrown when an identity field is already registered,
//!   either by the pre-check or by a unique index at write time.
//! - [`KeyNotFound`] thrown when a referenced item is absent.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`MissingDocument`]: EngineError::MissingDocument
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use std::fmt;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// A single field-level violation. `field` uses the wire (camelCase) name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Identity fields that must be unique, in the order they are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityField {
    Email,
    Username,
    LicenseNumber,
}

impl IdentityField {
    pub const PRIORITY: [IdentityField; 3] = [Self::Email, Self::Username, Self::LicenseNumber];

    /// Column name backing the field in `accounts` and `pharmacies`.
    pub fn column(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::LicenseNumber => "license_number",
        }
    }

    /// Recover the field from a unique-constraint message such as
    /// `UNIQUE constraint failed: accounts.email`.
    fn from_constraint_detail(detail: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|field| {
            let column = field.column();
            detail.contains(&format!(".{column}")) || detail.contains(&format!("-{column}-"))
        })
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::LicenseNumber => "license number",
        };
        f.write_str(label)
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),
    #[error("License document is required")]
    MissingDocument,
    #[error("An account with this {0} is already registered")]
    ExistingKey(IdentityField),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Document storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Credential hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Database(DbErr),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<DbErr> for EngineError {
    /// Unique-index violations on identity columns become [`EngineError::ExistingKey`],
    /// so a lost registration race reports the same conflict as the pre-check.
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err()
            && let Some(field) = IdentityField::from_constraint_detail(&detail)
        {
            return Self::ExistingKey(field);
        }
        Self::Database(err)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::MissingDocument, Self::MissingDocument) => true,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Hashing(a), Self::Hashing(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
