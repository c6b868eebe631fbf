//! SeaORM Entity for client name mappings.
//! Maps raw client name variants onto one canonical name.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meeting_intel", table_name = "client_mappings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Raw variant as it appears in transcripts, unique across the table
    #[sea_orm(unique)]
    pub variant_name: String,

    /// Canonical client name the variant resolves to
    pub canonical_name: String,

    /// Free-text note on where the variant came from
    pub notes: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
