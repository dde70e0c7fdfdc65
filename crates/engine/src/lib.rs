//! Registration and location workflows for patients and pharmacies.
//!
//! Every workflow is a method on [`Engine`]. Inputs arrive as raw, loosely
//! filled structs and are validated in one pass before any side effect.

pub use accounts::{Account, Role};
pub use credentials::{hash_password, verify_password};
pub use documents::{DocumentStore, LocalDocumentStore};
pub use error::{EngineError, FieldViolation, IdentityField};
pub use geo_locations::{GeoLocation, GeoLocationInput, PharmacyLocation};
pub use ops::{Caller, DEFAULT_MAX_DOCUMENT_BYTES, Engine, EngineBuilder, RegisteredPatient};
pub use patient_profiles::{Gender, PatientProfile};
pub use pharmacies::{Pharmacy, PharmacyListing};
pub use validation::{
    Address, Credentials, LICENSE_EXTENSIONS, LicenseDocument, PatientSignup, PatientSignupInput,
    PharmacySignup, PharmacySignupInput,
};

mod accounts;
mod credentials;
mod documents;
mod error;
mod geo_locations;
mod ops;
mod patient_profiles;
mod pharmacies;
mod util;
mod validation;

type ResultEngine<T> = Result<T, EngineError>;
