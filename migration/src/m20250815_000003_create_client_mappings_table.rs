use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Maps raw client-name variants to their canonical company name
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE meeting_intel.client_mappings (
                    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                    variant_name text NOT NULL,
                    canonical_name text NOT NULL,
                    notes text,
                    created_at timestamptz NOT NULL DEFAULT now(),
                    updated_at timestamptz NOT NULL DEFAULT now()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE meeting_intel.client_mappings OWNER TO meeting_intel")
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("client_mappings_variant_name")
                    .table((Alias::new("meeting_intel"), Alias::new("client_mappings")))
                    .col(Alias::new("variant_name"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS meeting_intel.client_mappings")
            .await?;

        Ok(())
    }
}
