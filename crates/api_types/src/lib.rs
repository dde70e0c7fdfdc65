use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Patient,
    Pharmacy,
}

/// Generic error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

pub mod signup {
    use super::*;

    /// Patient signup body.
    ///
    /// Every field is optional on the wire: missing and blank values are
    /// reported as validation details instead of a deserialization failure.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PatientSignup {
        pub email: Option<String>,
        pub username: Option<String>,
        pub password: Option<String>,
        pub confirm_password: Option<String>,
        pub phone: Option<String>,
        pub role: Option<String>,
        pub full_name: Option<String>,
        pub date_of_birth: Option<String>,
        pub gender: Option<String>,
        pub street_address: Option<String>,
        pub city: Option<String>,
        pub state_province: Option<String>,
        pub postal_code: Option<String>,
        pub country: Option<String>,
        pub medical_conditions: Option<String>,
        pub allergies: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: String,
        pub email: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProfileCreated {
        pub full_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PatientCreated {
        pub success: bool,
        pub user: UserCreated,
        pub profile: ProfileCreated,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PharmacyView {
        pub id: String,
        pub name: String,
        pub email: String,
        pub username: String,
        pub verified: bool,
        pub license_number: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PharmacyCreated {
        pub success: bool,
        pub pharmacy: PharmacyView,
        pub message: String,
    }
}

pub mod geolocation {
    use super::*;

    /// Geolocation upsert body. Missing members are validation failures.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GeoLocationUpsert {
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub pharmacy_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GeoLocation {
        pub id: String,
        pub latitude: f64,
        pub longitude: f64,
        pub pharmacy_id: String,
    }
}

pub mod pharmacy {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Location {
        pub id: String,
        pub latitude: f64,
        pub longitude: f64,
    }

    /// Public listing entry used when patients browse pharmacies.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PharmacySummary {
        pub id: String,
        pub name: String,
        pub city: String,
        pub verified: bool,
        pub location: Option<Location>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub id: String,
        pub username: String,
        pub email: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PatientProfile {
        pub account_id: String,
        pub full_name: String,
        pub date_of_birth: String,
        pub gender: String,
        pub street_address: String,
        pub city: String,
        pub state_province: String,
        pub postal_code: String,
        pub country: String,
        pub medical_conditions: Option<String>,
        pub allergies: Option<String>,
    }
}
