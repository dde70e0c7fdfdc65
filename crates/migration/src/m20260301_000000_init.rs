//! Initial schema migration.
//!
//! - `accounts`: authentication identities (patients)
//! - `patient_profiles`: one-to-one medical profile per patient account
//! - `pharmacies`: standalone pharmacy registrations with their license
//!
//! Email, username and license number uniqueness is enforced here with unique
//! indexes: the registration pre-check is only advisory.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Email,
    Username,
    PasswordHash,
    Phone,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum PatientProfiles {
    Table,
    Id,
    AccountId,
    FullName,
    DateOfBirth,
    Gender,
    StreetAddress,
    City,
    StateProvince,
    PostalCode,
    Country,
    MedicalConditions,
    Allergies,
}

#[derive(Iden)]
enum Pharmacies {
    Table,
    Id,
    Name,
    Email,
    Username,
    PasswordHash,
    LicenseNumber,
    Phone,
    StreetAddress,
    City,
    StateProvince,
    PostalCode,
    Country,
    LicenseDocumentUrl,
    Verified,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Email).string().not_null())
                    .col(ColumnDef::new(Accounts::Username).string().not_null())
                    .col(ColumnDef::new(Accounts::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Accounts::Phone).string().not_null())
                    .col(ColumnDef::new(Accounts::Role).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-email-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-username-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Patient profiles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PatientProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PatientProfiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PatientProfiles::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PatientProfiles::FullName).string().not_null())
                    .col(ColumnDef::new(PatientProfiles::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(PatientProfiles::Gender).string().not_null())
                    .col(
                        ColumnDef::new(PatientProfiles::StreetAddress)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PatientProfiles::City).string().not_null())
                    .col(
                        ColumnDef::new(PatientProfiles::StateProvince)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PatientProfiles::PostalCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PatientProfiles::Country).string().not_null())
                    .col(ColumnDef::new(PatientProfiles::MedicalConditions).text())
                    .col(ColumnDef::new(PatientProfiles::Allergies).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-patient_profiles-account_id")
                            .from(PatientProfiles::Table, PatientProfiles::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-patient_profiles-account_id-unique")
                    .table(PatientProfiles::Table)
                    .col(PatientProfiles::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Pharmacies
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Pharmacies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pharmacies::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pharmacies::Name).string().not_null())
                    .col(ColumnDef::new(Pharmacies::Email).string().not_null())
                    .col(ColumnDef::new(Pharmacies::Username).string().not_null())
                    .col(ColumnDef::new(Pharmacies::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Pharmacies::LicenseNumber).string().not_null())
                    .col(ColumnDef::new(Pharmacies::Phone).string().not_null())
                    .col(ColumnDef::new(Pharmacies::StreetAddress).string().not_null())
                    .col(ColumnDef::new(Pharmacies::City).string().not_null())
                    .col(ColumnDef::new(Pharmacies::StateProvince).string().not_null())
                    .col(ColumnDef::new(Pharmacies::PostalCode).string().not_null())
                    .col(ColumnDef::new(Pharmacies::Country).string().not_null())
                    .col(
                        ColumnDef::new(Pharmacies::LicenseDocumentUrl)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pharmacies::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Pharmacies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-pharmacies-email-unique", Pharmacies::Email),
            ("idx-pharmacies-username-unique", Pharmacies::Username),
            (
                "idx-pharmacies-license_number-unique",
                Pharmacies::LicenseNumber,
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Pharmacies::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pharmacies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PatientProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}
