use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    ContactPerson,
    CompanyName,
    Status,
    Source,
    OrganisationId,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Quotes {
    Table,
    Id,
    Subject,
    QuoteNumber,
    Status,
    IssueDate,
    ExpiryDate,
    LineItems,
    TotalCents,
    OrganisationId,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Websites {
    Table,
    Id,
    Name,
    Url,
    OrganisationId,
    Status,
    WebsiteType,
    HostingProvider,
    LaunchDate,
    Notes,
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
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Leads::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Leads::ContactPerson).json().not_null())
                    .col(ColumnDef::new(Leads::CompanyName).string_len(256))
                    .col(ColumnDef::new(Leads::Status).string_len(64).not_null())
                    .col(ColumnDef::new(Leads::Source).string_len(64))
                    .col(ColumnDef::new(Leads::OrganisationId).uuid())
                    .col(ColumnDef::new(Leads::Notes).text())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Leads::UpdatedAt)
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
                    .name("idx_leads_organisation")
                    .table(Leads::Table)
                    .col(Leads::OrganisationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Quotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quotes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Quotes::Subject).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Quotes::QuoteNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Quotes::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Quotes::IssueDate).date().not_null())
                    .col(ColumnDef::new(Quotes::ExpiryDate).date())
                    .col(ColumnDef::new(Quotes::LineItems).json().not_null())
                    .col(ColumnDef::new(Quotes::TotalCents).big_integer().not_null())
                    .col(ColumnDef::new(Quotes::OrganisationId).uuid())
                    .col(ColumnDef::new(Quotes::Notes).text())
                    .col(
                        ColumnDef::new(Quotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Quotes::UpdatedAt)
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
                    .name("idx_quotes_organisation")
                    .table(Quotes::Table)
                    .col(Quotes::OrganisationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Websites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Websites::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Websites::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Websites::Url).string_len(512).not_null())
                    .col(ColumnDef::new(Websites::OrganisationId).uuid())
                    .col(ColumnDef::new(Websites::Status).string_len(64))
                    .col(ColumnDef::new(Websites::WebsiteType).string_len(64))
                    .col(ColumnDef::new(Websites::HostingProvider).string_len(128))
                    .col(ColumnDef::new(Websites::LaunchDate).date())
                    .col(ColumnDef::new(Websites::Notes).text())
                    .col(
                        ColumnDef::new(Websites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Websites::UpdatedAt)
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
                    .name("idx_websites_organisation")
                    .table(Websites::Table)
                    .col(Websites::OrganisationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Websites::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quotes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Leads::Table).if_exists().to_owned())
            .await
    }
}
