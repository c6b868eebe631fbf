//! SeaORM Entity for the meeting_intel warehouse table.
//! One row per meeting, merged across pipeline runs.

use crate::sales_performance_rating::SalesPerformanceRating;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "meeting_intel", table_name = "meeting_intel")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Stable external meeting identifier, unique across the table
    #[sea_orm(unique)]
    pub meeting_id: String,

    pub title: Option<String>,

    pub date: Option<Date>,

    /// Origin system of the transcript (e.g. "granola", "fireflies")
    pub source: Option<String>,

    /// Participant display names as a JSON array of strings
    pub participants: Option<Json>,

    /// Canonical client name after identity normalization
    pub client_name: Option<String>,

    pub salesperson_name: Option<String>,

    pub salesperson_email: Option<String>,

    /// AI-enhanced meeting notes, preferred context for opportunity scoring
    #[sea_orm(column_type = "Text")]
    pub enhanced_notes: Option<String>,

    /// Raw note lines in "[timestamp] speaker: text" form
    #[sea_orm(column_type = "Text")]
    pub my_notes: Option<String>,

    /// Verbatim transcript, preferred context for sales coaching
    #[sea_orm(column_type = "Text")]
    pub full_transcript: Option<String>,

    // Opportunity rubric results, one JSON object per criterion
    pub now: Option<Json>,
    pub next: Option<Json>,
    pub measure: Option<Json>,
    pub blocker: Option<Json>,
    pub fit: Option<Json>,

    /// Count of opportunity criteria with score >= 1
    pub total_qualified_sections: Option<i32>,

    /// Opportunity record-level verdict: total_qualified_sections >= 3
    pub qualified: Option<bool>,

    // Sales coaching rubric results
    pub sales_introduction: Option<Json>,
    pub sales_discovery: Option<Json>,
    pub sales_opportunity_scoping: Option<Json>,
    pub sales_solution_positioning: Option<Json>,
    pub sales_commercial_confidence: Option<Json>,
    pub sales_case_studies: Option<Json>,
    pub sales_next_steps: Option<Json>,
    pub sales_strategic_context: Option<Json>,

    /// Sum of the eight coaching scores, 0-24
    pub sales_total_score: Option<i32>,

    /// Count of coaching criteria with score >= 2
    pub sales_total_qualified: Option<i32>,

    /// Coaching record-level verdict: sales_total_qualified >= 5
    pub sales_qualified: Option<bool>,

    pub sales_performance_rating: Option<SalesPerformanceRating>,

    /// JSON array of "Label: coaching note" strings for criteria scoring 3
    pub sales_strengths: Option<Json>,

    /// JSON array of the three lowest-scoring criterion labels
    pub sales_improvements: Option<Json>,

    #[sea_orm(column_type = "Text")]
    pub sales_overall_coaching: Option<String>,

    /// When this meeting was last scored; rows loaded metadata-only have none
    pub scored_at: Option<DateTimeWithTimeZone>,

    /// Model identifier the scores were produced with
    pub model_id: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
