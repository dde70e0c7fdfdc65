//! Registration schemas.
//!
//! Raw inputs keep every field optional so that a missing field is reported
//! as a violation rather than a deserialization failure. Validation runs in a
//! single pass: text is trimmed, blank values count as missing, and every
//! violated field is collected before anything touches the store.

use std::{fmt, path::Path};

use chrono::{NaiveDate, Utc};
use unicode_normalization::UnicodeNormalization;
use validator::{Validate, ValidationErrors};

use crate::{EngineError, FieldViolation, Gender, ResultEngine, Role};

/// Extensions accepted for license documents.
pub const LICENSE_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Postal address shared by patients and pharmacies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
}

/// Normalized identity fields. The password is still plaintext here and is
/// dropped as soon as it has been hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatientSignup {
    pub credentials: Credentials,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Address,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PharmacySignup {
    pub credentials: Credentials,
    pub name: String,
    pub license_number: String,
    pub address: Address,
}

/// Raw patient signup payload.
#[derive(Clone, Debug, Default, Validate)]
pub struct PatientSignupInput {
    #[validate(
        required(message = "email is required"),
        email(message = "email must be a valid address")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "username is required"),
        length(min = 3, max = 20, message = "username must be 3 to 20 characters")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "password is required"),
        length(min = 8, message = "password must be at least 8 characters")
    )]
    pub password: Option<String>,
    #[validate(required(message = "confirmPassword is required"))]
    pub confirm_password: Option<String>,
    #[validate(required(message = "phone is required"))]
    pub phone: Option<String>,
    pub role: Option<String>,
    #[validate(required(message = "fullName is required"))]
    pub full_name: Option<String>,
    #[validate(required(message = "dateOfBirth is required"))]
    pub date_of_birth: Option<String>,
    #[validate(required(message = "gender is required"))]
    pub gender: Option<String>,
    #[validate(required(message = "streetAddress is required"))]
    pub street_address: Option<String>,
    #[validate(required(message = "city is required"))]
    pub city: Option<String>,
    #[validate(required(message = "stateProvince is required"))]
    pub state_province: Option<String>,
    #[validate(required(message = "postalCode is required"))]
    pub postal_code: Option<String>,
    #[validate(required(message = "country is required"))]
    pub country: Option<String>,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
}

/// Raw pharmacy signup payload (text fields of the multipart form).
#[derive(Clone, Debug, Default, Validate)]
pub struct PharmacySignupInput {
    #[validate(required(message = "name is required"))]
    pub name: Option<String>,
    #[validate(
        required(message = "email is required"),
        email(message = "email must be a valid address")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "username is required"),
        length(min = 3, max = 20, message = "username must be 3 to 20 characters")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "password is required"),
        length(min = 8, message = "password must be at least 8 characters")
    )]
    pub password: Option<String>,
    #[validate(required(message = "confirmPassword is required"))]
    pub confirm_password: Option<String>,
    #[validate(required(message = "licenseNumber is required"))]
    pub license_number: Option<String>,
    #[validate(required(message = "phone is required"))]
    pub phone: Option<String>,
    pub role: Option<String>,
    #[validate(required(message = "streetAddress is required"))]
    pub street_address: Option<String>,
    #[validate(required(message = "city is required"))]
    pub city: Option<String>,
    #[validate(required(message = "stateProvince is required"))]
    pub state_province: Option<String>,
    #[validate(required(message = "postalCode is required"))]
    pub postal_code: Option<String>,
    #[validate(required(message = "country is required"))]
    pub country: Option<String>,
}

/// An uploaded license document as received from the client.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for LicenseDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseDocument")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl LicenseDocument {
    /// Check size and type, returning the lower-cased extension to store the
    /// document under.
    pub(crate) fn validate(&self, max_bytes: usize) -> ResultEngine<String> {
        let mut violations = Vec::new();
        if self.bytes.is_empty() {
            violations.push(FieldViolation::new(
                "licenseDocument",
                "license document must not be empty",
            ));
        } else if self.bytes.len() > max_bytes {
            violations.push(FieldViolation::new(
                "licenseDocument",
                format!("license document must not exceed {max_bytes} bytes"),
            ));
        }

        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| LICENSE_EXTENSIONS.contains(&ext.as_str()));
        if extension.is_none() {
            violations.push(FieldViolation::new(
                "licenseDocument",
                format!(
                    "license document must be one of: {}",
                    LICENSE_EXTENSIONS.join(", ")
                ),
            ));
        }

        match extension {
            Some(extension) if violations.is_empty() => Ok(extension),
            _ => Err(EngineError::Validation(violations)),
        }
    }
}

impl PatientSignupInput {
    fn normalized(self) -> Self {
        Self {
            email: normalize_email(self.email),
            username: normalize_username(self.username),
            password: non_blank(self.password),
            confirm_password: non_blank(self.confirm_password),
            phone: trimmed(self.phone),
            role: trimmed(self.role),
            full_name: trimmed(self.full_name),
            date_of_birth: trimmed(self.date_of_birth),
            gender: trimmed(self.gender),
            street_address: trimmed(self.street_address),
            city: trimmed(self.city),
            state_province: trimmed(self.state_province),
            postal_code: trimmed(self.postal_code),
            country: trimmed(self.country),
            medical_conditions: trimmed(self.medical_conditions),
            allergies: trimmed(self.allergies),
        }
    }

    /// Validate and convert into a typed [`PatientSignup`].
    pub fn validate_into(self) -> ResultEngine<PatientSignup> {
        let input = self.normalized();
        let mut violations = collect(input.validate());
        check_passwords_match(&input.password, &input.confirm_password, &mut violations);

        check_role(input.role.as_deref(), Role::Patient, &mut violations);

        let date_of_birth = input
            .date_of_birth
            .as_deref()
            .and_then(|raw| match parse_date_of_birth(raw) {
                Ok(date) => Some(date),
                Err(violation) => {
                    violations.push(violation);
                    None
                }
            });

        let gender = input.gender.as_deref().and_then(|raw| {
            let gender = Gender::parse(raw);
            if gender.is_none() {
                violations.push(FieldViolation::new(
                    "gender",
                    "gender must be one of male, female, other",
                ));
            }
            gender
        });

        if !violations.is_empty() {
            return Err(EngineError::Validation(violations));
        }

        Ok(PatientSignup {
            credentials: Credentials {
                email: take(input.email, "email")?,
                username: take(input.username, "username")?,
                password: take(input.password, "password")?,
                phone: take(input.phone, "phone")?,
            },
            full_name: take(input.full_name, "fullName")?,
            date_of_birth: take(date_of_birth, "dateOfBirth")?,
            gender: take(gender, "gender")?,
            address: Address {
                street_address: take(input.street_address, "streetAddress")?,
                city: take(input.city, "city")?,
                state_province: take(input.state_province, "stateProvince")?,
                postal_code: take(input.postal_code, "postalCode")?,
                country: take(input.country, "country")?,
            },
            medical_conditions: input.medical_conditions,
            allergies: input.allergies,
        })
    }
}

impl PharmacySignupInput {
    fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: normalize_email(self.email),
            username: normalize_username(self.username),
            password: non_blank(self.password),
            confirm_password: non_blank(self.confirm_password),
            license_number: trimmed(self.license_number),
            phone: trimmed(self.phone),
            role: trimmed(self.role),
            street_address: trimmed(self.street_address),
            city: trimmed(self.city),
            state_province: trimmed(self.state_province),
            postal_code: trimmed(self.postal_code),
            country: trimmed(self.country),
        }
    }

    /// Validate and convert into a typed [`PharmacySignup`].
    pub fn validate_into(self) -> ResultEngine<PharmacySignup> {
        let input = self.normalized();
        let mut violations = collect(input.validate());
        check_passwords_match(&input.password, &input.confirm_password, &mut violations);
        check_role(input.role.as_deref(), Role::Pharmacy, &mut violations);
        if !violations.is_empty() {
            return Err(EngineError::Validation(violations));
        }

        Ok(PharmacySignup {
            credentials: Credentials {
                email: take(input.email, "email")?,
                username: take(input.username, "username")?,
                password: take(input.password, "password")?,
                phone: take(input.phone, "phone")?,
            },
            name: take(input.name, "name")?,
            license_number: take(input.license_number, "licenseNumber")?,
            address: Address {
                street_address: take(input.street_address, "streetAddress")?,
                city: take(input.city, "city")?,
                state_province: take(input.state_province, "stateProvince")?,
                postal_code: take(input.postal_code, "postalCode")?,
                country: take(input.country, "country")?,
            },
        })
    }
}

/// Flatten `validator` errors into wire-named violations, sorted by field.
pub(crate) fn collect(result: Result<(), ValidationErrors>) -> Vec<FieldViolation> {
    let Err(errors) = result else {
        return Vec::new();
    };

    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            let field = camel_case(&field);
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| format!("{field} is invalid ({})", error.code));
                FieldViolation::new(field.clone(), message)
            })
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

fn check_passwords_match(
    password: &Option<String>,
    confirm: &Option<String>,
    violations: &mut Vec<FieldViolation>,
) {
    if let (Some(password), Some(confirm)) = (password, confirm)
        && password != confirm
    {
        violations.push(FieldViolation::new(
            "confirmPassword",
            "passwords do not match",
        ));
    }
}

/// A declared role must be a known one and match the endpoint.
fn check_role(role: Option<&str>, expected: Role, violations: &mut Vec<FieldViolation>) {
    let Some(role) = role else {
        return;
    };
    match Role::try_from(role) {
        Ok(role) if role == expected => {}
        Ok(_) => violations.push(FieldViolation::new(
            "role",
            format!("role must be {} for this signup", expected.as_str()),
        )),
        Err(_) => violations.push(FieldViolation::new(
            "role",
            "role must be one of PATIENT, PHARMACY",
        )),
    }
}

fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, FieldViolation> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        FieldViolation::new("dateOfBirth", "dateOfBirth must be a date in YYYY-MM-DD format")
    })?;
    if date > Utc::now().date_naive() {
        return Err(FieldViolation::new(
            "dateOfBirth",
            "dateOfBirth must not be in the future",
        ));
    }
    Ok(date)
}

fn take<T>(value: Option<T>, field: &str) -> ResultEngine<T> {
    value.ok_or_else(|| EngineError::Validation(vec![FieldViolation::required(field)]))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Passwords are kept verbatim; only a fully blank value counts as missing.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn normalize_email(value: Option<String>) -> Option<String> {
    trimmed(value).map(|s| s.to_lowercase())
}

fn normalize_username(value: Option<String>) -> Option<String> {
    trimmed(value).map(|s| s.nfkc().collect())
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
