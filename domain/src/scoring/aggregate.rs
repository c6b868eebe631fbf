//! Pure aggregation of per-criterion verdicts into rubric-level results.
//!
//! No I/O lives here. Everything below is a deterministic function of the
//! criterion verdicts, which keeps the qualification thresholds and coaching
//! summaries directly testable.

use crate::scoring::criteria::SalesCriterion;
use crate::scoring::evaluator::{SalesAssessment, SectionResult};
use entity::sales_performance_rating::SalesPerformanceRating;

/// Qualified sections required for an opportunity-qualified record.
const OPPORTUNITY_QUALIFIED_THRESHOLD: usize = 3;

/// Qualified criteria required for a sales-qualified record.
const SALES_QUALIFIED_THRESHOLD: usize = 5;

/// Improvement areas reported per meeting, regardless of how well it went.
const IMPROVEMENT_COUNT: usize = 3;

/// The five opportunity verdicts plus their rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunityScores {
    pub now: SectionResult,
    pub next: SectionResult,
    pub measure: SectionResult,
    pub blocker: SectionResult,
    pub fit: SectionResult,
    pub total_qualified_sections: i32,
    pub qualified: bool,
}

impl OpportunityScores {
    pub fn from_sections(
        now: SectionResult,
        next: SectionResult,
        measure: SectionResult,
        blocker: SectionResult,
        fit: SectionResult,
    ) -> Self {
        let total_qualified_sections = [&now, &next, &measure, &blocker, &fit]
            .iter()
            .filter(|s| s.qualified)
            .count();
        Self {
            now,
            next,
            measure,
            blocker,
            fit,
            total_qualified_sections: total_qualified_sections as i32,
            qualified: total_qualified_sections >= OPPORTUNITY_QUALIFIED_THRESHOLD,
        }
    }
}

/// The eight sales verdicts plus their rollup and coaching summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesScores {
    /// Verdicts in criterion declaration order
    pub assessments: [SalesAssessment; 8],
    pub total_score: i32,
    pub total_qualified: i32,
    pub qualified: bool,
    pub performance_rating: SalesPerformanceRating,
    /// "Label: coaching focus" for every criterion scored exactly 3
    pub strengths: Vec<String>,
    /// The three lowest-scoring criteria, ties broken by declaration order
    pub improvements: Vec<String>,
    pub overall_coaching: String,
}

impl SalesScores {
    pub fn from_assessments(assessments: [SalesAssessment; 8]) -> Self {
        let total_score: i32 = assessments.iter().filter_map(|a| a.score).sum();
        let total_qualified = assessments.iter().filter(|a| a.qualified).count() as i32;
        let qualified = total_qualified >= SALES_QUALIFIED_THRESHOLD as i32;
        let performance_rating = SalesPerformanceRating::from_total_score(total_score);

        let strengths = assessments
            .iter()
            .zip(SalesCriterion::ALL)
            .filter(|(a, _)| a.score == Some(3))
            .map(|(a, criterion)| {
                let note = a
                    .coaching_note
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(&a.reason);
                format!("{}: {}", criterion.label(), note)
            })
            .collect();

        // Unscored criteria sort as zeros, so a criterion the model never
        // produced a valid verdict for always surfaces as an improvement.
        let mut ranked: Vec<(i32, SalesCriterion, &SalesAssessment)> = assessments
            .iter()
            .zip(SalesCriterion::ALL)
            .map(|(a, criterion)| (a.score.unwrap_or(0), criterion, a))
            .collect();
        ranked.sort_by_key(|(score, _, _)| *score);
        let improvements = ranked
            .iter()
            .take(IMPROVEMENT_COUNT)
            .map(|(_, criterion, a)| {
                let note = a
                    .coaching_note
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(&a.reason);
                format!("{}: {}", criterion.label(), note)
            })
            .collect();

        let overall_coaching = overall_coaching(total_score);

        Self {
            assessments,
            total_score,
            total_qualified,
            qualified,
            performance_rating,
            strengths,
            improvements,
            overall_coaching,
        }
    }
}

/// Banded summary line keyed off the same thresholds as the rating.
fn overall_coaching(total_score: i32) -> String {
    let guidance = match total_score {
        21.. => "Excellent meeting execution. Keep replicating this approach and share it with the team.",
        16..=20 => "Strong meeting with minor gaps. Tighten the weakest areas below to reach excellent.",
        11..=15 => "Developing skills with clear gaps. Focus practice on the three improvement areas.",
        6..=10 => "Needs improvement across several fundamentals. Prioritize discovery and next-step discipline.",
        _ => "Significant development needed. Revisit the core meeting structure before the next client call.",
    };
    format!("Overall score {total_score}/24. {guidance}")
}
