use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the warehouse schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS meeting_intel;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO meeting_intel, public;")
            .await?;

        // gen_random_uuid() lives in pgcrypto on Postgres < 13
        manager
            .get_connection()
            .execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto;")
            .await?;

        // Grant the pipeline DB user full access to the schema
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE meeting_intel TO meeting_intel;
                    GRANT ALL ON SCHEMA meeting_intel TO meeting_intel;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_intel GRANT ALL ON TABLES TO meeting_intel;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_intel GRANT ALL ON SEQUENCES TO meeting_intel;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_intel GRANT ALL ON FUNCTIONS TO meeting_intel;
                END $$;
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_intel REVOKE ALL ON FUNCTIONS FROM meeting_intel;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_intel REVOKE ALL ON SEQUENCES FROM meeting_intel;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_intel REVOKE ALL ON TABLES FROM meeting_intel;
                    REVOKE ALL ON SCHEMA meeting_intel FROM meeting_intel;
                    REVOKE ALL PRIVILEGES ON DATABASE meeting_intel FROM meeting_intel;
                END $$;
            "#,
            )
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS meeting_intel CASCADE;")
            .await?;

        Ok(())
    }
}
