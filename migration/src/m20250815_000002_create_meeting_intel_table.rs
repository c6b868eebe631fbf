use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per meeting. All scoring columns are nullable so partial
        // runs can merge into existing rows without clobbering earlier data.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE meeting_intel.meeting_intel (
                    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                    meeting_id text NOT NULL,
                    title text,
                    date date,
                    source text,
                    participants jsonb,
                    client_name text,
                    salesperson_name text,
                    salesperson_email text,
                    enhanced_notes text,
                    my_notes text,
                    full_transcript text,
                    "now" jsonb,
                    "next" jsonb,
                    measure jsonb,
                    blocker jsonb,
                    fit jsonb,
                    total_qualified_sections integer,
                    qualified boolean,
                    sales_introduction jsonb,
                    sales_discovery jsonb,
                    sales_opportunity_scoping jsonb,
                    sales_solution_positioning jsonb,
                    sales_commercial_confidence jsonb,
                    sales_case_studies jsonb,
                    sales_next_steps jsonb,
                    sales_strategic_context jsonb,
                    sales_total_score integer,
                    sales_total_qualified integer,
                    sales_qualified boolean,
                    sales_performance_rating varchar,
                    sales_strengths jsonb,
                    sales_improvements jsonb,
                    sales_overall_coaching text,
                    scored_at timestamptz,
                    model_id text,
                    created_at timestamptz NOT NULL DEFAULT now(),
                    updated_at timestamptz NOT NULL DEFAULT now()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE meeting_intel.meeting_intel OWNER TO meeting_intel")
            .await?;

        // The upsert conflict target
        manager
            .create_index(
                Index::create()
                    .name("meeting_intel_meeting_id")
                    .table((Alias::new("meeting_intel"), Alias::new("meeting_intel")))
                    .col(Alias::new("meeting_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS meeting_intel.meeting_intel")
            .await?;

        Ok(())
    }
}
