//! Warehouse operations over the meeting intel table, translated into
//! domain errors so callers never depend on the persistence layer.

use crate::error::Error;
use entity::meeting_intel::Model;
use entity_api::meeting_intel;
use sea_orm::DatabaseConnection;

pub async fn upsert(db: &DatabaseConnection, model: Model) -> Result<(), Error> {
    Ok(meeting_intel::upsert(db, model).await?)
}

pub async fn upsert_many(db: &DatabaseConnection, models: Vec<Model>) -> Result<u64, Error> {
    Ok(meeting_intel::upsert_many(db, models).await?)
}

/// Remove stale duplicate rows per meeting, keeping the newest-scored one.
/// Returns the number of rows deleted.
pub async fn dedupe(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(meeting_intel::dedupe(db).await?)
}

pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(meeting_intel::find_by_meeting_id(db, meeting_id).await?)
}

pub async fn find_by_salesperson(
    db: &DatabaseConnection,
    salesperson_name: &str,
    from_date: Option<sea_orm::prelude::Date>,
    to_date: Option<sea_orm::prelude::Date>,
) -> Result<Vec<Model>, Error> {
    Ok(meeting_intel::find_by_salesperson(db, salesperson_name, from_date, to_date).await?)
}

pub async fn find_unscored(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(meeting_intel::find_unscored(db).await?)
}

pub async fn find_qualified(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(meeting_intel::find_qualified(db).await?)
}
