use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Overall coaching rating derived from the total sales score (0-24).
#[derive(Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SalesPerformanceRating {
    #[sea_orm(string_value = "Excellent")]
    Excellent,
    #[sea_orm(string_value = "Strong")]
    Strong,
    #[sea_orm(string_value = "Developing")]
    Developing,
    #[sea_orm(string_value = "Needs Improvement")]
    NeedsImprovement,
    #[sea_orm(string_value = "Significant Development Needed")]
    SignificantDevelopmentNeeded,
}

impl SalesPerformanceRating {
    /// Maps a total sales score onto its rating band. Scores above 24
    /// cannot occur with eight criteria capped at 3, but saturate to
    /// the top band rather than panic.
    pub fn from_total_score(total: i32) -> Self {
        match total {
            21.. => SalesPerformanceRating::Excellent,
            16..=20 => SalesPerformanceRating::Strong,
            11..=15 => SalesPerformanceRating::Developing,
            6..=10 => SalesPerformanceRating::NeedsImprovement,
            _ => SalesPerformanceRating::SignificantDevelopmentNeeded,
        }
    }
}

impl std::fmt::Display for SalesPerformanceRating {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SalesPerformanceRating::Excellent => write!(fmt, "Excellent"),
            SalesPerformanceRating::Strong => write!(fmt, "Strong"),
            SalesPerformanceRating::Developing => write!(fmt, "Developing"),
            SalesPerformanceRating::NeedsImprovement => write!(fmt, "Needs Improvement"),
            SalesPerformanceRating::SignificantDevelopmentNeeded => {
                write!(fmt, "Significant Development Needed")
            }
        }
    }
}
