//! Drives both rubrics over one transcript and assembles the warehouse row.
//!
//! The two rubrics are independent: a total failure of one still yields a
//! record carrying the other's results, with the failed rubric's columns
//! left null so a later run can fill them in through the merge upsert.

use crate::error::Error;
use crate::normalizer::{ClientNameNormalizer, UNKNOWN_CLIENT};
use crate::scoring::aggregate::{OpportunityScores, SalesScores};
use crate::scoring::context::{format_opportunity_context, format_sales_context, note_lines};
use crate::scoring::criteria::{OpportunityCriterion, SalesCriterion};
use crate::scoring::evaluator::{CriterionEvaluator, SalesAssessment, SectionResult};
use crate::transcript::TranscriptDocument;
use chrono::Utc;
use entity::meeting_intel::Model;
use log::*;
use serde_json::{json, Value};
use uuid::Uuid;

const CLIENT_EXTRACTION_PROMPT: &str = r#"Identify the CLIENT company in this meeting (the company being sold to, not the vendor).

Return JSON with exactly these fields:
{
    "client": "company name or null if unclear",
    "domain": "company website domain or null",
    "size": "approximate headcount or null"
}"#;

/// Reason recorded on a criterion whose model calls never produced a
/// usable verdict.
const CRITERION_FAILURE_REASON: &str = "Criterion evaluation failed";

/// Keyword fallback for client identification when the model and the
/// participant list both fail to produce a name.
const DOMAIN_KEYWORDS: &[(&str, &str)] = &[
    ("agency", "Agency (unidentified)"),
    ("studio", "Studio (unidentified)"),
    ("consultancy", "Consultancy (unidentified)"),
];

/// The fully scored output for one meeting. Either rubric may be absent
/// when it failed outright; presence of one never depends on the other.
#[derive(Debug)]
pub struct ScoredRecord {
    pub meeting_id: String,
    pub client_name: String,
    pub opportunity: Option<OpportunityScores>,
    pub sales: Option<SalesScores>,
    pub model_id: String,
}

pub struct ScoringOrchestrator {
    evaluator: CriterionEvaluator,
    normalizer: ClientNameNormalizer,
    /// Score criteria one at a time instead of concurrently, for rate-limited keys
    sequential_criteria: bool,
}

impl ScoringOrchestrator {
    pub fn new(
        evaluator: CriterionEvaluator,
        normalizer: ClientNameNormalizer,
        sequential_criteria: bool,
    ) -> Self {
        Self {
            evaluator,
            normalizer,
            sequential_criteria,
        }
    }

    /// Run both rubrics plus client extraction over one transcript.
    ///
    /// Only fails when the document itself is unusable; rubric failures are
    /// logged and reflected as `None` in the returned record.
    pub async fn score(&self, doc: &TranscriptDocument) -> Result<ScoredRecord, Error> {
        let opportunity_context = format_opportunity_context(doc);
        let sales_context = format_sales_context(doc);

        let opportunity = match self.score_opportunity(&opportunity_context).await {
            Ok(scores) => Some(scores),
            Err(e) => {
                error!(
                    "opportunity rubric failed for meeting {}: {}",
                    doc.meeting_id, e
                );
                None
            }
        };

        let sales = match self.score_sales(&sales_context).await {
            Ok(scores) => Some(scores),
            Err(e) => {
                error!("sales rubric failed for meeting {}: {}", doc.meeting_id, e);
                None
            }
        };

        let client_name = self.extract_client_name(doc, &opportunity_context).await;

        Ok(ScoredRecord {
            meeting_id: doc.meeting_id.clone(),
            client_name,
            opportunity,
            sales,
            model_id: self.evaluator.model_id().to_string(),
        })
    }

    /// A criterion that exhausts its retries is recorded unscored so the
    /// remaining verdicts survive; the rubric only fails as a whole when
    /// every criterion errored.
    async fn score_opportunity(&self, context: &str) -> Result<OpportunityScores, Error> {
        let [now, next, measure, blocker, fit] = OpportunityCriterion::ALL;
        let results = if self.sequential_criteria {
            [
                self.evaluator.evaluate_opportunity(now, context).await,
                self.evaluator.evaluate_opportunity(next, context).await,
                self.evaluator.evaluate_opportunity(measure, context).await,
                self.evaluator.evaluate_opportunity(blocker, context).await,
                self.evaluator.evaluate_opportunity(fit, context).await,
            ]
        } else {
            let (r0, r1, r2, r3, r4) = tokio::join!(
                self.evaluator.evaluate_opportunity(now, context),
                self.evaluator.evaluate_opportunity(next, context),
                self.evaluator.evaluate_opportunity(measure, context),
                self.evaluator.evaluate_opportunity(blocker, context),
                self.evaluator.evaluate_opportunity(fit, context),
            );
            [r0, r1, r2, r3, r4]
        };

        let mut scored = 0usize;
        let mut first_error: Option<Error> = None;
        let mut criteria = OpportunityCriterion::ALL.into_iter();
        let sections = results.map(|result| {
            let label = criteria.next().map(|c| c.label()).unwrap_or_default();
            match result {
                Ok(section) => {
                    scored += 1;
                    section
                }
                Err(e) => {
                    warn!("{label} criterion failed after retries, recording unscored: {e}");
                    first_error.get_or_insert(e);
                    SectionResult::unscored(CRITERION_FAILURE_REASON)
                }
            }
        });

        if scored == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let [now, next, measure, blocker, fit] = sections;
        Ok(OpportunityScores::from_sections(
            now, next, measure, blocker, fit,
        ))
    }

    async fn score_sales(&self, context: &str) -> Result<SalesScores, Error> {
        let [c0, c1, c2, c3, c4, c5, c6, c7] = SalesCriterion::ALL;
        let results = if self.sequential_criteria {
            [
                self.evaluator.evaluate_sales(c0, context).await,
                self.evaluator.evaluate_sales(c1, context).await,
                self.evaluator.evaluate_sales(c2, context).await,
                self.evaluator.evaluate_sales(c3, context).await,
                self.evaluator.evaluate_sales(c4, context).await,
                self.evaluator.evaluate_sales(c5, context).await,
                self.evaluator.evaluate_sales(c6, context).await,
                self.evaluator.evaluate_sales(c7, context).await,
            ]
        } else {
            let (r0, r1, r2, r3, r4, r5, r6, r7) = tokio::join!(
                self.evaluator.evaluate_sales(c0, context),
                self.evaluator.evaluate_sales(c1, context),
                self.evaluator.evaluate_sales(c2, context),
                self.evaluator.evaluate_sales(c3, context),
                self.evaluator.evaluate_sales(c4, context),
                self.evaluator.evaluate_sales(c5, context),
                self.evaluator.evaluate_sales(c6, context),
                self.evaluator.evaluate_sales(c7, context),
            );
            [r0, r1, r2, r3, r4, r5, r6, r7]
        };

        let mut scored = 0usize;
        let mut first_error: Option<Error> = None;
        let mut criteria = SalesCriterion::ALL.into_iter();
        let assessments = results.map(|result| {
            let label = criteria.next().map(|c| c.label()).unwrap_or_default();
            match result {
                Ok(assessment) => {
                    scored += 1;
                    assessment
                }
                Err(e) => {
                    warn!("{label} criterion failed after retries, recording unscored: {e}");
                    first_error.get_or_insert(e);
                    SalesAssessment::unscored(CRITERION_FAILURE_REASON)
                }
            }
        });

        if scored == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Ok(SalesScores::from_assessments(assessments))
    }

    /// Client identification, in descending order of confidence: a model
    /// extraction, the export's own company field, the first non-salesperson
    /// participant, then a keyword heuristic. The winner always passes
    /// through the normalizer.
    async fn extract_client_name(&self, doc: &TranscriptDocument, context: &str) -> String {
        if let Some(name) = self.llm_client_name(context).await {
            return self.normalizer.normalize(&name);
        }

        if let Some(company) = doc.company.as_deref().filter(|c| !c.trim().is_empty()) {
            return self.normalizer.normalize(company);
        }

        let salesperson = doc.salesperson_name();
        if let Some(participant) = doc
            .participants
            .iter()
            .find(|p| Some(p.as_str()) != salesperson)
        {
            return self.normalizer.normalize(participant);
        }

        let haystack = context.to_lowercase();
        for (keyword, label) in DOMAIN_KEYWORDS {
            if haystack.contains(keyword) {
                return self.normalizer.normalize(label);
            }
        }

        UNKNOWN_CLIENT.to_string()
    }

    async fn llm_client_name(&self, context: &str) -> Option<String> {
        let prompt = format!("{CLIENT_EXTRACTION_PROMPT}\n\n{context}");
        match self.evaluator.raw_json_completion(&prompt).await {
            Ok(Some(value)) => value
                .get("client")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("null"))
                .map(String::from),
            Ok(None) => None,
            Err(e) => {
                warn!("client extraction failed, falling back to heuristics: {e}");
                None
            }
        }
    }
}

impl ScoredRecord {
    /// Assemble the warehouse row. Columns belonging to a rubric that did
    /// not run stay `None` so the merge upsert preserves any earlier values.
    pub fn into_model(self, doc: &TranscriptDocument) -> Model {
        let now = Utc::now().fixed_offset();
        let scored = self.opportunity.is_some() || self.sales.is_some();

        let mut model = Model {
            id: Uuid::nil(),
            meeting_id: self.meeting_id,
            title: doc.title.clone(),
            date: doc.date,
            source: doc.source.clone(),
            participants: (!doc.participants.is_empty()).then(|| json!(doc.participants)),
            client_name: Some(self.client_name),
            salesperson_name: doc.salesperson_name().map(String::from),
            salesperson_email: doc.creator_email.clone(),
            enhanced_notes: doc.enhanced_notes.clone(),
            my_notes: doc
                .my_notes
                .clone()
                .or_else(|| (!doc.notes.is_empty()).then(|| note_lines(&doc.notes))),
            full_transcript: doc.full_transcript.clone(),
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
            scored_at: scored.then_some(now),
            model_id: scored.then_some(self.model_id),
            created_at: now,
            updated_at: now,
        };

        if let Some(opportunity) = self.opportunity {
            model.now = Some(json!(opportunity.now));
            model.next = Some(json!(opportunity.next));
            model.measure = Some(json!(opportunity.measure));
            model.blocker = Some(json!(opportunity.blocker));
            model.fit = Some(json!(opportunity.fit));
            model.total_qualified_sections = Some(opportunity.total_qualified_sections);
            model.qualified = Some(opportunity.qualified);
        }

        if let Some(sales) = self.sales {
            let [intro, discovery, scoping, solution, commercial, cases, next_steps, strategic] =
                &sales.assessments;
            model.sales_introduction = Some(json!(intro));
            model.sales_discovery = Some(json!(discovery));
            model.sales_opportunity_scoping = Some(json!(scoping));
            model.sales_solution_positioning = Some(json!(solution));
            model.sales_commercial_confidence = Some(json!(commercial));
            model.sales_case_studies = Some(json!(cases));
            model.sales_next_steps = Some(json!(next_steps));
            model.sales_strategic_context = Some(json!(strategic));
            model.sales_total_score = Some(sales.total_score);
            model.sales_total_qualified = Some(sales.total_qualified);
            model.sales_qualified = Some(sales.qualified);
            model.sales_performance_rating = Some(sales.performance_rating);
            model.sales_strengths = Some(json!(sales.strengths));
            model.sales_improvements = Some(json!(sales.improvements));
            model.sales_overall_coaching = Some(sales.overall_coaching);
        }

        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::evaluator::RetryPolicy;
    use scoring_ai::{CompletionRequest, Error as ProviderError, Provider};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const SECTION: &str = r#"{"qualified": true, "reason": "clear need", "summary": "s", "evidence": "e"}"#;
    const SALES: &str = r#"{"qualified": true, "score": 2, "reason": "solid", "evidence": "e", "coaching_note": "tighten close"}"#;
    const CLIENT: &str = r#"{"client": "Omnicom / DDB", "domain": "ddb.com", "size": "1000"}"#;

    /// Answers by prompt content rather than call order, since the two
    /// rubrics run concurrently.
    struct RoutingProvider {
        fail_opportunity: bool,
        /// Prompts containing this substring get a transport error
        fail_substring: Option<&'static str>,
        client_response: String,
        calls: Mutex<usize>,
    }

    impl RoutingProvider {
        fn new() -> Self {
            Self {
                fail_opportunity: false,
                fail_substring: None,
                client_response: CLIENT.to_string(),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for RoutingProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            let prompt = match request {
                CompletionRequest::Chat { messages, .. } => messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default(),
                CompletionRequest::Reasoning { input, .. } => input,
            };
            if let Some(substring) = self.fail_substring {
                if prompt.contains(substring) {
                    return Err(ProviderError::Network("unreachable".to_string()));
                }
            }
            if prompt.contains("Scoring guide:") {
                Ok(SALES.to_string())
            } else if prompt.contains("(the company being sold to, not the vendor)") {
                Ok(self.client_response.clone())
            } else if self.fail_opportunity {
                Err(ProviderError::Network("unreachable".to_string()))
            } else {
                Ok(SECTION.to_string())
            }
        }

        fn provider_id(&self) -> &str {
            "routing"
        }

        async fn verify_credentials(&self) -> Result<bool, ProviderError> {
            Ok(true)
        }
    }

    fn orchestrator(provider: Arc<RoutingProvider>) -> ScoringOrchestrator {
        orchestrator_with(provider, ClientNameNormalizer::new())
    }

    fn orchestrator_with(
        provider: Arc<RoutingProvider>,
        normalizer: ClientNameNormalizer,
    ) -> ScoringOrchestrator {
        let retry = RetryPolicy {
            schema_retries: 0,
            transport_retries: 0,
            transport_backoff: Duration::from_millis(1),
        };
        let evaluator = CriterionEvaluator::new(provider, "gpt-4o-mini", 0.3, 500, retry);
        ScoringOrchestrator::new(evaluator, normalizer, false)
    }

    fn doc() -> TranscriptDocument {
        TranscriptDocument {
            meeting_id: "granola-abc123".to_string(),
            title: Some("Discovery call".to_string()),
            participants: vec!["Pat Doyle".to_string(), "Sam Ellis".to_string()],
            creator_name: Some("Pat Doyle".to_string()),
            full_transcript: Some(format!("Me: intro.\nThem: {}", "context ".repeat(30))),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn scores_both_rubrics_and_extracts_the_client() {
        let provider = Arc::new(RoutingProvider::new());
        let record = orchestrator(provider).score(&doc()).await.unwrap();

        let opportunity = record.opportunity.unwrap();
        assert_eq!(opportunity.total_qualified_sections, 5);
        assert!(opportunity.qualified);

        let sales = record.sales.unwrap();
        assert_eq!(sales.total_score, 16);
        assert!(sales.qualified);

        // Pass-through normalization without a stored mapping.
        assert_eq!(record.client_name, "Omnicom / DDB");
        assert_eq!(record.model_id, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn opportunity_failure_leaves_sales_results_intact() {
        let provider = Arc::new(RoutingProvider {
            fail_opportunity: true,
            ..RoutingProvider::new()
        });
        let record = orchestrator(provider).score(&doc()).await.unwrap();
        assert!(record.opportunity.is_none());
        assert!(record.sales.is_some());
    }

    #[tokio::test]
    async fn unparseable_client_extraction_falls_back_to_participants() {
        let provider = Arc::new(RoutingProvider {
            client_response: r#"{"client": null, "domain": null, "size": null}"#.to_string(),
            ..RoutingProvider::new()
        });
        let record = orchestrator(provider).score(&doc()).await.unwrap();
        // First participant is the salesperson; the next one wins.
        assert_eq!(record.client_name, "Sam Ellis");
    }

    #[tokio::test]
    async fn extracted_client_outranks_the_export_company_field() {
        let provider = Arc::new(RoutingProvider::new());
        let mut d = doc();
        d.company = Some("Acme Talent".to_string());
        let record = orchestrator(provider).score(&d).await.unwrap();
        assert_eq!(record.client_name, "Omnicom / DDB");
    }

    #[tokio::test]
    async fn export_company_field_fills_in_when_extraction_is_empty() {
        let provider = Arc::new(RoutingProvider {
            client_response: r#"{"client": null, "domain": null, "size": null}"#.to_string(),
            ..RoutingProvider::new()
        });
        let mut d = doc();
        d.company = Some("Acme Talent".to_string());
        let record = orchestrator(provider).score(&d).await.unwrap();
        assert_eq!(record.client_name, "Acme Talent");
    }

    #[tokio::test]
    async fn domain_heuristic_label_passes_through_the_normalizer() {
        let provider = Arc::new(RoutingProvider {
            client_response: r#"{"client": null, "domain": null, "size": null}"#.to_string(),
            ..RoutingProvider::new()
        });
        let normalizer = ClientNameNormalizer::new();
        normalizer.install(
            [(
                "agency (unidentified)".to_string(),
                "Bright Side Agency".to_string(),
            )]
            .into(),
        );

        // Only the salesperson attended, so the participant tier yields nothing.
        let mut d = doc();
        d.participants = vec!["Pat Doyle".to_string()];
        d.full_transcript = Some(format!(
            "Me: intro.\nThem: we run an agency. {}",
            "context ".repeat(30)
        ));

        let record = orchestrator_with(provider, normalizer).score(&d).await.unwrap();
        assert_eq!(record.client_name, "Bright Side Agency");
    }

    #[tokio::test]
    async fn single_failed_sales_criterion_leaves_the_other_seven_scored() {
        let provider = Arc::new(RoutingProvider {
            fail_substring: Some("closed the meeting and agreed next steps"),
            ..RoutingProvider::new()
        });
        let record = orchestrator(provider).score(&doc()).await.unwrap();

        let sales = record.sales.unwrap();
        assert_eq!(sales.total_score, 14);
        assert_eq!(sales.total_qualified, 7);
        assert!(sales.assessments[6].score.is_none());
        assert_eq!(sales.assessments[6].reason, "Criterion evaluation failed");
    }

    #[tokio::test]
    async fn single_failed_opportunity_criterion_keeps_the_rest() {
        let provider = Arc::new(RoutingProvider {
            fail_substring: Some("biggest BLOCKERS"),
            ..RoutingProvider::new()
        });
        let record = orchestrator(provider).score(&doc()).await.unwrap();

        let opportunity = record.opportunity.unwrap();
        assert_eq!(opportunity.total_qualified_sections, 4);
        assert!(!opportunity.blocker.qualified);
        assert!(opportunity.qualified);
    }

    #[tokio::test]
    async fn failed_rubric_columns_stay_null_in_the_model() {
        let provider = Arc::new(RoutingProvider {
            fail_opportunity: true,
            ..RoutingProvider::new()
        });
        let d = doc();
        let record = orchestrator(provider).score(&d).await.unwrap();
        let model = record.into_model(&d);

        assert!(model.now.is_none());
        assert!(model.qualified.is_none());
        assert!(model.sales_total_score.is_some());
        assert!(model.scored_at.is_some());
        assert_eq!(model.model_id.as_deref(), Some("gpt-4o-mini"));
    }

    #[tokio::test]
    async fn scored_model_carries_both_rubrics_and_provenance() {
        let provider = Arc::new(RoutingProvider::new());
        let d = doc();
        let record = orchestrator(provider).score(&d).await.unwrap();
        let model = record.into_model(&d);

        assert_eq!(model.meeting_id, "granola-abc123");
        assert_eq!(model.total_qualified_sections, Some(5));
        assert_eq!(model.sales_total_score, Some(16));
        assert_eq!(
            model.sales_performance_rating,
            Some(entity::sales_performance_rating::SalesPerformanceRating::Strong)
        );
        assert!(model.sales_strengths.is_some());
        assert_eq!(model.salesperson_name.as_deref(), Some("Pat Doyle"));
        let participants = model.participants.unwrap();
        assert_eq!(participants.as_array().unwrap().len(), 2);
    }
}
