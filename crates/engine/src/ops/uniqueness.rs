use sea_orm::{QueryFilter, prelude::*};

use crate::{EngineError, IdentityField, ResultEngine, accounts, pharmacies};

use super::Engine;

impl Engine {
    /// Fails with the first identity field already taken by an account, in
    /// priority order.
    ///
    /// Always reads through the connection: concurrent signups can still race
    /// past this check, the unique indexes settle it at insert time.
    pub(super) async fn ensure_account_available(
        &self,
        email: &str,
        username: &str,
    ) -> ResultEngine<()> {
        for (field, value) in [
            (IdentityField::Email, email),
            (IdentityField::Username, username),
        ] {
            let column = match field {
                IdentityField::Email => accounts::Column::Email,
                _ => accounts::Column::Username,
            };
            let taken = accounts::Entity::find()
                .filter(column.eq(value))
                .one(&self.database)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(field));
            }
        }
        Ok(())
    }

    /// Same as [`Engine::ensure_account_available`] against pharmacies, with
    /// the license number checked last.
    pub(super) async fn ensure_pharmacy_available(
        &self,
        email: &str,
        username: &str,
        license_number: &str,
    ) -> ResultEngine<()> {
        for (field, value) in [
            (IdentityField::Email, email),
            (IdentityField::Username, username),
            (IdentityField::LicenseNumber, license_number),
        ] {
            let column = match field {
                IdentityField::Email => pharmacies::Column::Email,
                IdentityField::Username => pharmacies::Column::Username,
                IdentityField::LicenseNumber => pharmacies::Column::LicenseNumber,
            };
            let taken = pharmacies::Entity::find()
                .filter(column.eq(value))
                .one(&self.database)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(field));
            }
        }
        Ok(())
    }
}
