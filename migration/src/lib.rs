pub use sea_orm_migration::prelude::*;

mod m20250815_000001_create_schema_and_base_db_setup;
mod m20250815_000002_create_meeting_intel_table;
mod m20250815_000003_create_client_mappings_table;
mod m20250816_000001_add_scoring_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_000001_create_schema_and_base_db_setup::Migration),
            Box::new(m20250815_000002_create_meeting_intel_table::Migration),
            Box::new(m20250815_000003_create_client_mappings_table::Migration),
            Box::new(m20250816_000001_add_scoring_indexes::Migration),
        ]
    }
}
