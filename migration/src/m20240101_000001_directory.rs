use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Organisations {
    Table,
    Id,
    OrganisationName,
    OrganisationType,
    Status,
    Industry,
    Website,
    Email,
    Phone,
    BillingStreet,
    BillingSuburb,
    BillingState,
    BillingPostcode,
    BillingCountry,
    ShippingStreet,
    ShippingSuburb,
    ShippingState,
    ShippingPostcode,
    ShippingCountry,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Mobile,
    JobTitle,
    Department,
    Role,
    Status,
    City,
    State,
    Country,
    ProfileImageUrl,
    Colour,
    Icon,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganisationContacts {
    Table,
    Id,
    OrganisationId,
    ContactId,
    Role,
    IsPrimary,
    Priority,
    OrganisationName,
    ContactName,
    ContactEmail,
    ContactPhone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organisations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organisations::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Organisations::OrganisationName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Organisations::OrganisationType).string_len(64))
                    .col(ColumnDef::new(Organisations::Status).string_len(64).not_null())
                    .col(ColumnDef::new(Organisations::Industry).string_len(128))
                    .col(ColumnDef::new(Organisations::Website).string_len(512))
                    .col(ColumnDef::new(Organisations::Email).string_len(320))
                    .col(ColumnDef::new(Organisations::Phone).string_len(64))
                    .col(ColumnDef::new(Organisations::BillingStreet).string_len(256))
                    .col(ColumnDef::new(Organisations::BillingSuburb).string_len(128))
                    .col(ColumnDef::new(Organisations::BillingState).string_len(128))
                    .col(ColumnDef::new(Organisations::BillingPostcode).string_len(16))
                    .col(ColumnDef::new(Organisations::BillingCountry).string_len(128))
                    .col(ColumnDef::new(Organisations::ShippingStreet).string_len(256))
                    .col(ColumnDef::new(Organisations::ShippingSuburb).string_len(128))
                    .col(ColumnDef::new(Organisations::ShippingState).string_len(128))
                    .col(ColumnDef::new(Organisations::ShippingPostcode).string_len(16))
                    .col(ColumnDef::new(Organisations::ShippingCountry).string_len(128))
                    .col(ColumnDef::new(Organisations::Notes).text())
                    .col(
                        ColumnDef::new(Organisations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organisations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organisations_name")
                    .table(Organisations::Table)
                    .col(Organisations::OrganisationName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contacts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Contacts::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Contacts::LastName).string_len(128))
                    .col(ColumnDef::new(Contacts::Email).string_len(320))
                    .col(ColumnDef::new(Contacts::Phone).string_len(64))
                    .col(ColumnDef::new(Contacts::Mobile).string_len(64))
                    .col(ColumnDef::new(Contacts::JobTitle).string_len(128))
                    .col(ColumnDef::new(Contacts::Department).string_len(128))
                    .col(ColumnDef::new(Contacts::Role).string_len(64))
                    .col(ColumnDef::new(Contacts::Status).string_len(64))
                    .col(ColumnDef::new(Contacts::City).string_len(128))
                    .col(ColumnDef::new(Contacts::State).string_len(128))
                    .col(ColumnDef::new(Contacts::Country).string_len(128))
                    .col(ColumnDef::new(Contacts::ProfileImageUrl).string_len(1024))
                    .col(ColumnDef::new(Contacts::Colour).string_len(32))
                    .col(ColumnDef::new(Contacts::Icon).string_len(32))
                    .col(ColumnDef::new(Contacts::Notes).text())
                    .col(
                        ColumnDef::new(Contacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contacts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contacts_email")
                    .table(Contacts::Table)
                    .col(Contacts::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganisationContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganisationContacts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganisationContacts::OrganisationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganisationContacts::ContactId).uuid().not_null())
                    .col(
                        ColumnDef::new(OrganisationContacts::Role)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationContacts::IsPrimary)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationContacts::Priority)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationContacts::OrganisationName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationContacts::ContactName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganisationContacts::ContactEmail).string_len(320))
                    .col(ColumnDef::new(OrganisationContacts::ContactPhone).string_len(64))
                    .col(
                        ColumnDef::new(OrganisationContacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationContacts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_organisation_contacts_pair")
                    .table(OrganisationContacts::Table)
                    .col(OrganisationContacts::OrganisationId)
                    .col(OrganisationContacts::ContactId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organisation_contacts_contact")
                    .table(OrganisationContacts::Table)
                    .col(OrganisationContacts::ContactId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OrganisationContacts::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Contacts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organisations::Table).if_exists().to_owned())
            .await
    }
}
