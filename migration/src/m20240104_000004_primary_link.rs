use sea_orm_migration::prelude::*;

// Partial index: Postgres and SQLite both accept the `WHERE` clause.
const UP_SQL: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS uq_organisation_contacts_primary
    ON organisation_contacts (contact_id)
    WHERE is_primary;
"#;

const DOWN_SQL: &str = "DROP INDEX IF EXISTS uq_organisation_contacts_primary";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}
