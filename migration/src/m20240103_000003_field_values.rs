use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum FieldValues {
    Table,
    Id,
    FieldType,
    Value,
    Label,
    IsDefault,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FieldValues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FieldValues::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FieldValues::FieldType).string_len(32).not_null())
                    .col(ColumnDef::new(FieldValues::Value).string_len(128).not_null())
                    .col(ColumnDef::new(FieldValues::Label).string_len(128).not_null())
                    .col(ColumnDef::new(FieldValues::IsDefault).boolean().not_null())
                    .col(ColumnDef::new(FieldValues::SortOrder).integer().not_null())
                    .col(
                        ColumnDef::new(FieldValues::CreatedAt)
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
                    .name("uq_field_values_type_value")
                    .table(FieldValues::Table)
                    .col(FieldValues::FieldType)
                    .col(FieldValues::Value)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FieldValues::Table).if_exists().to_owned())
            .await
    }
}
