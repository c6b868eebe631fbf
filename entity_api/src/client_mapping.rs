//! CRUD operations for the client_mappings table.

use super::error::Error;
use entity::client_mappings::{ActiveModel, Column, Entity, Model};
use log::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, QueryOrder};

/// Fetches every mapping row, variants in stable order
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_asc(Column::VariantName)
        .all(db)
        .await?)
}

/// Registers a variant -> canonical mapping. Re-registering an existing
/// variant repoints it at the new canonical name.
pub async fn upsert(
    db: &DatabaseConnection,
    variant_name: &str,
    canonical_name: &str,
    notes: Option<String>,
) -> Result<(), Error> {
    debug!("Mapping client variant {variant_name:?} to {canonical_name:?}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        variant_name: Set(variant_name.to_string()),
        canonical_name: Set(canonical_name.to_string()),
        notes: Set(notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Entity::insert(active_model)
        .on_conflict(
            OnConflict::column(Column::VariantName)
                .update_columns([Column::CanonicalName, Column::Notes, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Removes a mapping by its variant name. Deleting an unknown variant is not
/// an error; it reports 0 rows removed.
pub async fn delete_by_variant(db: &DatabaseConnection, variant_name: &str) -> Result<u64, Error> {
    let result = Entity::delete_many()
        .filter(Column::VariantName.eq(variant_name))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
