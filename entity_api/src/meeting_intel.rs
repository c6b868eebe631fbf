//! Warehouse operations for the meeting_intel table.
//!
//! Writes go through a single atomic upsert keyed on meeting_id. Updates are
//! null-preserving: an incoming NULL never clobbers a value already stored, so
//! a metadata-only load cannot erase scores and a re-score cannot erase a
//! transcript loaded earlier.

use super::error::Error;
use entity::meeting_intel::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, Insert, IdenStatic, QueryOrder,
};
use std::collections::HashMap;

/// Columns merged with COALESCE(excluded, existing) on conflict. Everything
/// sparse belongs here; created_at and the surrogate id are never touched.
const MERGE_COLUMNS: [Column; 34] = [
    Column::Title,
    Column::Date,
    Column::Source,
    Column::Participants,
    Column::ClientName,
    Column::SalespersonName,
    Column::SalespersonEmail,
    Column::EnhancedNotes,
    Column::MyNotes,
    Column::FullTranscript,
    Column::Now,
    Column::Next,
    Column::Measure,
    Column::Blocker,
    Column::Fit,
    Column::TotalQualifiedSections,
    Column::Qualified,
    Column::SalesIntroduction,
    Column::SalesDiscovery,
    Column::SalesOpportunityScoping,
    Column::SalesSolutionPositioning,
    Column::SalesCommercialConfidence,
    Column::SalesCaseStudies,
    Column::SalesNextSteps,
    Column::SalesStrategicContext,
    Column::SalesTotalScore,
    Column::SalesTotalQualified,
    Column::SalesQualified,
    Column::SalesPerformanceRating,
    Column::SalesStrengths,
    Column::SalesImprovements,
    Column::SalesOverallCoaching,
    Column::ScoredAt,
    Column::ModelId,
];

fn merge_on_conflict() -> OnConflict {
    let mut on_conflict = OnConflict::column(Column::MeetingId);
    for column in MERGE_COLUMNS {
        let name = column.as_str();
        on_conflict.value(
            column,
            Expr::cust(format!(
                r#"COALESCE("excluded"."{name}", "meeting_intel"."{name}")"#
            )),
        );
    }
    on_conflict.update_column(Column::UpdatedAt);
    on_conflict
}

fn upsert_statement(model: Model) -> Insert<ActiveModel> {
    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        meeting_id: Set(model.meeting_id),
        title: Set(model.title),
        date: Set(model.date),
        source: Set(model.source),
        participants: Set(model.participants),
        client_name: Set(model.client_name),
        salesperson_name: Set(model.salesperson_name),
        salesperson_email: Set(model.salesperson_email),
        enhanced_notes: Set(model.enhanced_notes),
        my_notes: Set(model.my_notes),
        full_transcript: Set(model.full_transcript),
        now: Set(model.now),
        next: Set(model.next),
        measure: Set(model.measure),
        blocker: Set(model.blocker),
        fit: Set(model.fit),
        total_qualified_sections: Set(model.total_qualified_sections),
        qualified: Set(model.qualified),
        sales_introduction: Set(model.sales_introduction),
        sales_discovery: Set(model.sales_discovery),
        sales_opportunity_scoping: Set(model.sales_opportunity_scoping),
        sales_solution_positioning: Set(model.sales_solution_positioning),
        sales_commercial_confidence: Set(model.sales_commercial_confidence),
        sales_case_studies: Set(model.sales_case_studies),
        sales_next_steps: Set(model.sales_next_steps),
        sales_strategic_context: Set(model.sales_strategic_context),
        sales_total_score: Set(model.sales_total_score),
        sales_total_qualified: Set(model.sales_total_qualified),
        sales_qualified: Set(model.sales_qualified),
        sales_performance_rating: Set(model.sales_performance_rating),
        sales_strengths: Set(model.sales_strengths),
        sales_improvements: Set(model.sales_improvements),
        sales_overall_coaching: Set(model.sales_overall_coaching),
        scored_at: Set(model.scored_at),
        model_id: Set(model.model_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Entity::insert(active_model).on_conflict(merge_on_conflict())
}

/// Inserts or merges a single meeting row atomically. Safe to replay:
/// re-running the same input leaves the row unchanged apart from updated_at.
pub async fn upsert(db: &DatabaseConnection, model: Model) -> Result<(), Error> {
    debug!("Upserting meeting_intel row for meeting: {}", model.meeting_id);

    upsert_statement(model).exec_without_returning(db).await?;
    Ok(())
}

/// Upserts a batch of rows one statement at a time, returning how many were
/// written. Later duplicates within the batch merge into the earlier row.
pub async fn upsert_many(db: &DatabaseConnection, models: Vec<Model>) -> Result<u64, Error> {
    let mut written = 0;
    for model in models {
        upsert(db, model).await?;
        written += 1;
    }
    Ok(written)
}

/// Removes legacy duplicate rows sharing a meeting_id, keeping the most
/// recently scored row of each group. Unscored rows lose to scored ones.
/// Returns the number of rows deleted; 0 means the table was already clean.
pub async fn dedupe(db: &DatabaseConnection) -> Result<u64, Error> {
    let rows = Entity::find()
        .order_by_asc(Column::MeetingId)
        .all(db)
        .await?;

    let mut newest: HashMap<String, (Id, Option<DateTimeWithTimeZone>)> = HashMap::new();
    let mut stale: Vec<Id> = Vec::new();

    for row in rows {
        match newest.get(&row.meeting_id) {
            Some((kept_id, kept_scored_at)) => {
                if row.scored_at > *kept_scored_at {
                    stale.push(*kept_id);
                    newest.insert(row.meeting_id, (row.id, row.scored_at));
                } else {
                    stale.push(row.id);
                }
            }
            None => {
                newest.insert(row.meeting_id, (row.id, row.scored_at));
            }
        }
    }

    if stale.is_empty() {
        return Ok(0);
    }

    info!("Deduplicating meeting_intel: removing {} stale rows", stale.len());

    let result = Entity::delete_many()
        .filter(Column::Id.is_in(stale))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Finds a meeting row by its external meeting identifier
pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .one(db)
        .await?)
}

/// Lists a salesperson's meetings, optionally bounded to a date range,
/// newest meetings first
pub async fn find_by_salesperson(
    db: &DatabaseConnection,
    salesperson_name: &str,
    from_date: Option<Date>,
    to_date: Option<Date>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::SalespersonName.eq(salesperson_name));

    if let Some(from) = from_date {
        query = query.filter(Column::Date.gte(from));
    }
    if let Some(to) = to_date {
        query = query.filter(Column::Date.lte(to));
    }

    Ok(query.order_by_desc(Column::Date).all(db).await?)
}

/// Lists rows that have never been scored, oldest meetings first
pub async fn find_unscored(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ScoredAt.is_null())
        .order_by_asc(Column::Date)
        .all(db)
        .await?)
}

/// Lists opportunity-qualified meetings, most recently scored first
pub async fn find_qualified(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Qualified.eq(true))
        .order_by_desc(Column::ScoredAt)
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn bare_row(id: Id, meeting_id: &str, scored_at: Option<&str>) -> Model {
        Model {
            id,
            meeting_id: meeting_id.to_string(),
            title: None,
            date: None,
            source: None,
            participants: None,
            client_name: None,
            salesperson_name: None,
            salesperson_email: None,
            enhanced_notes: None,
            my_notes: None,
            full_transcript: None,
            now: None,
            next: None,
            measure: None,
            blocker: None,
            fit: None,
            total_qualified_sections: None,
            qualified: None,
            sales_introduction: None,
            sales_discovery: None,
            sales_opportunity_scoping: None,
            sales_solution_positioning: None,
            sales_commercial_confidence: None,
            sales_case_studies: None,
            sales_next_steps: None,
            sales_strategic_context: None,
            sales_total_score: None,
            sales_total_qualified: None,
            sales_qualified: None,
            sales_performance_rating: None,
            sales_strengths: None,
            sales_improvements: None,
            sales_overall_coaching: None,
            scored_at: scored_at.map(|ts| ts.parse().unwrap()),
            model_id: None,
            created_at: "2025-01-01T00:00:00Z".parse().unwrap(),
            updated_at: "2025-01-01T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn upsert_statement_merges_instead_of_clobbering() {
        let sql = upsert_statement(bare_row(Id::new_v4(), "granola-1", None))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"ON CONFLICT ("meeting_id") DO UPDATE"#));
        assert!(sql.contains(
            r#""full_transcript" = COALESCE("excluded"."full_transcript", "meeting_intel"."full_transcript")"#
        ));
        assert!(sql.contains(
            r#""sales_total_score" = COALESCE("excluded"."sales_total_score", "meeting_intel"."sales_total_score")"#
        ));
        assert!(sql.contains(r#""updated_at" = "excluded"."updated_at""#));
        // The surrogate id and created_at must survive a merge untouched
        assert!(!sql.contains(r#""id" = "#));
        assert!(!sql.contains(r#""created_at" = "#));
    }

    #[test]
    fn every_sparse_column_gets_a_coalesce_clause() {
        let sql = upsert_statement(bare_row(Id::new_v4(), "granola-1", None))
            .build(DatabaseBackend::Postgres)
            .to_string();

        for column in MERGE_COLUMNS {
            let name = column.as_str();
            assert!(
                sql.contains(&format!(
                    r#""{name}" = COALESCE("excluded"."{name}", "meeting_intel"."{name}")"#
                )),
                "{name} missing from the merge clause"
            );
        }
    }

    #[tokio::test]
    async fn dedupe_keeps_newest_scored_row_per_meeting() {
        let keeper = Id::new_v4();
        let older = Id::new_v4();
        let unscored = Id::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                bare_row(older, "granola-1", Some("2025-03-01T10:00:00Z")),
                bare_row(keeper, "granola-1", Some("2025-03-02T10:00:00Z")),
                bare_row(unscored, "granola-1", None),
            ]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let removed = dedupe(&db).await.unwrap();
        assert_eq!(removed, 2);

        // The delete statement must target the two stale ids, never the keeper
        let log = db.into_transaction_log();
        let delete_sql = format!("{:?}", log.last().unwrap());
        assert!(delete_sql.contains(&older.to_string()));
        assert!(delete_sql.contains(&unscored.to_string()));
        assert!(!delete_sql.contains(&keeper.to_string()));
    }

    #[tokio::test]
    async fn dedupe_on_clean_table_removes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                bare_row(Id::new_v4(), "granola-1", Some("2025-03-01T10:00:00Z")),
                bare_row(Id::new_v4(), "granola-2", None),
            ]])
            .into_connection();

        let removed = dedupe(&db).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn find_by_salesperson_bounds_the_date_range() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let from: Date = "2025-03-01".parse().unwrap();
        let to: Date = "2025-03-31".parse().unwrap();
        find_by_salesperson(&db, "Alex Morgan", Some(from), Some(to))
            .await
            .unwrap();

        let log = db.into_transaction_log();
        let select_sql = format!("{:?}", log.last().unwrap());
        assert!(select_sql.contains("Alex Morgan"));
        assert!(select_sql.contains("2025-03-01"));
        assert!(select_sql.contains("2025-03-31"));
        assert!(select_sql.contains(r#""date" DESC"#));
    }

    #[tokio::test]
    async fn find_by_meeting_id_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let found = find_by_meeting_id(&db, "granola-404").await.unwrap();
        assert!(found.is_none());
    }
}
