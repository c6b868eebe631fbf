use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Supports the dedupe pass and "latest scored" queries
        manager
            .create_index(
                Index::create()
                    .name("meeting_intel_scored_at")
                    .table((Alias::new("meeting_intel"), Alias::new("meeting_intel")))
                    .col(Alias::new("scored_at"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("meeting_intel_date")
                    .table((Alias::new("meeting_intel"), Alias::new("meeting_intel")))
                    .col(Alias::new("date"))
                    .to_owned(),
            )
            .await?;

        // Qualified-pipeline reporting filters on these two flags
        manager
            .create_index(
                Index::create()
                    .name("meeting_intel_qualified")
                    .table((Alias::new("meeting_intel"), Alias::new("meeting_intel")))
                    .col(Alias::new("qualified"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("meeting_intel_sales_qualified")
                    .table((Alias::new("meeting_intel"), Alias::new("meeting_intel")))
                    .col(Alias::new("sales_qualified"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "meeting_intel_scored_at",
            "meeting_intel_date",
            "meeting_intel_qualified",
            "meeting_intel_sales_qualified",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table((Alias::new("meeting_intel"), Alias::new("meeting_intel")))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
