pub use sea_orm_migration::prelude::*;

mod m20240101_000001_directory;
mod m20240102_000002_pipeline;
mod m20240103_000003_field_values;
mod m20240104_000004_primary_link;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_directory::Migration),
            Box::new(m20240102_000002_pipeline::Migration),
            Box::new(m20240103_000003_field_values::Migration),
            Box::new(m20240104_000004_primary_link::Migration),
        ]
    }
}
