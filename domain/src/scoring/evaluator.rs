//! Runs a single criterion prompt against the completion provider and
//! parses the strict-JSON verdict out of the response.
//!
//! Two failure modes are handled separately. Transport errors are retried
//! with a short backoff and eventually surfaced to the caller. Malformed
//! model output (empty, unparseable, or off-schema JSON) gets corrective
//! retries with an appended instruction; when those are exhausted the
//! criterion is recorded as unscored rather than failing the meeting.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::scoring::criteria::{
    OpportunityCriterion, SalesCriterion, SCORING_SYSTEM_INSTRUCTION,
};
use log::*;
use scoring_ai::{CompletionRequest, Provider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const SCHEMA_CORRECTION: &str = "You returned invalid JSON. Return exactly the schema.";

/// Verdict for one opportunity criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub qualified: bool,
    pub reason: String,
    pub summary: String,
    pub evidence: String,
}

impl SectionResult {
    pub fn unscored(reason: impl Into<String>) -> Self {
        Self {
            qualified: false,
            reason: reason.into(),
            summary: String::new(),
            evidence: String::new(),
        }
    }
}

/// Verdict for one sales coaching criterion. `score` is absent when the
/// model never produced a valid verdict for this criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesAssessment {
    pub qualified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coaching_note: Option<String>,
}

impl SalesAssessment {
    pub fn unscored(reason: impl Into<String>) -> Self {
        Self {
            qualified: false,
            score: None,
            reason: reason.into(),
            evidence: None,
            coaching_note: None,
        }
    }
}

/// Retry shape for both failure modes.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after a malformed or empty response
    pub schema_retries: u32,
    /// Extra attempts after a transport failure
    pub transport_retries: u32,
    /// Backoff between transport attempts
    pub transport_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            schema_retries: 2,
            transport_retries: 2,
            transport_backoff: Duration::from_secs(2),
        }
    }
}

/// Evaluates one criterion at a time against a completion provider.
pub struct CriterionEvaluator {
    provider: Arc<dyn Provider>,
    model_id: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl CriterionEvaluator {
    pub fn new(
        provider: Arc<dyn Provider>,
        model_id: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            temperature,
            max_tokens,
            retry,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Score one opportunity criterion against the prepared context.
    /// Returns an unscored verdict when the model never produces valid JSON.
    pub async fn evaluate_opportunity(
        &self,
        criterion: OpportunityCriterion,
        context: &str,
    ) -> Result<SectionResult, Error> {
        let prompt = format!("{}\n\n{}", criterion.prompt(), context);
        match self
            .completion_with_schema_retries(&prompt, parse_section_result)
            .await?
        {
            Some(result) => Ok(result),
            None => {
                warn!(
                    "criterion '{}' unscored after invalid model output",
                    criterion.label()
                );
                Ok(SectionResult::unscored("Model returned invalid output"))
            }
        }
    }

    /// Score one sales coaching criterion against the prepared context.
    pub async fn evaluate_sales(
        &self,
        criterion: SalesCriterion,
        context: &str,
    ) -> Result<SalesAssessment, Error> {
        let prompt = format!("{}\n\n{}", criterion.prompt(), context);
        match self
            .completion_with_schema_retries(&prompt, parse_sales_assessment)
            .await?
        {
            Some(result) => Ok(result),
            None => {
                warn!(
                    "criterion '{}' unscored after invalid model output",
                    criterion.label()
                );
                Ok(SalesAssessment::unscored("Model returned invalid output"))
            }
        }
    }

    /// Run an arbitrary prompt expecting a JSON object back, with the same
    /// corrective retry behavior as the criterion paths. Used for auxiliary
    /// extractions that share the provider but not a rubric schema.
    pub async fn raw_json_completion(&self, prompt: &str) -> Result<Option<Value>, Error> {
        self.completion_with_schema_retries(prompt, parse_json_object)
            .await
    }

    /// Runs the prompt, retrying malformed output with a corrective suffix.
    /// `None` means every attempt produced output the parser rejected.
    async fn completion_with_schema_retries<T>(
        &self,
        prompt: &str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<Option<T>, Error> {
        let mut prompt = prompt.to_string();
        for attempt in 0..=self.retry.schema_retries {
            let raw = self.completion_with_transport_retries(&prompt).await?;
            let cleaned = strip_code_fences(&raw);
            if let Some(parsed) = parse(cleaned) {
                return Ok(Some(parsed));
            }
            debug!(
                "schema-invalid response on attempt {} ({} chars)",
                attempt + 1,
                raw.len()
            );
            prompt = format!("{prompt}\n\n{SCHEMA_CORRECTION}");
        }
        Ok(None)
    }

    async fn completion_with_transport_retries(&self, prompt: &str) -> Result<String, Error> {
        let mut last_error: Option<Error> = None;
        for attempt in 0..=self.retry.transport_retries {
            let request = CompletionRequest::for_model(
                &self.model_id,
                SCORING_SYSTEM_INSTRUCTION,
                prompt,
                self.temperature,
                self.max_tokens,
            );
            match self.provider.complete(request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(
                        "completion attempt {} failed against {}: {}",
                        attempt + 1,
                        self.provider.provider_id(),
                        e
                    );
                    last_error = Some(e.into());
                    if attempt < self.retry.transport_retries {
                        tokio::time::sleep(self.retry.transport_backoff).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::ModelInvocation),
        }))
    }
}

/// Removes a surrounding ``` or ```json fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn parse_json_object(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text).ok()?;
    value.is_object().then_some(value)
}

/// Parses a strict opportunity verdict: exactly the four expected keys,
/// with a boolean `qualified`. Extra or missing keys reject the response.
fn parse_section_result(text: &str) -> Option<SectionResult> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    let expected = ["qualified", "reason", "summary", "evidence"];
    if object.len() != expected.len() || !expected.iter().all(|k| object.contains_key(*k)) {
        return None;
    }
    Some(SectionResult {
        qualified: object.get("qualified")?.as_bool()?,
        reason: string_or_joined(object.get("reason")),
        summary: string_or_joined(object.get("summary")),
        evidence: string_or_joined(object.get("evidence")),
    })
}

/// Parses a sales verdict. The score is clamped to 0..=3 and `qualified`
/// is recomputed from the clamped score rather than trusted from the model.
fn parse_sales_assessment(text: &str) -> Option<SalesAssessment> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    let score = object.get("score")?.as_i64()?.clamp(0, 3) as i32;
    Some(SalesAssessment {
        qualified: score >= 2,
        score: Some(score),
        reason: string_or_joined(object.get("reason")),
        evidence: optional_string(object.get("evidence")),
        coaching_note: optional_string(object.get("coaching_note")),
    })
}

/// Models occasionally return evidence as a list of quotes; joined here so
/// the stored verdict is always a flat string.
fn string_or_joined(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring_ai::Error as ProviderError;
    use std::sync::Mutex;

    /// Provider stub that serves canned responses in order.
    struct ScriptedProvider {
        responses: Mutex<Vec<Result<String, ProviderError>>>,
        requests_seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
            let prompt = match request {
                CompletionRequest::Chat { messages, .. } => messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default(),
                CompletionRequest::Reasoning { input, .. } => input,
            };
            self.requests_seen.lock().unwrap().push(prompt);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(String::new());
            }
            responses.remove(0)
        }

        fn provider_id(&self) -> &str {
            "scripted"
        }

        async fn verify_credentials(&self) -> Result<bool, ProviderError> {
            Ok(true)
        }
    }

    fn evaluator(provider: Arc<ScriptedProvider>) -> CriterionEvaluator {
        let retry = RetryPolicy {
            schema_retries: 2,
            transport_retries: 1,
            transport_backoff: Duration::from_millis(1),
        };
        CriterionEvaluator::new(provider, "gpt-4o-mini", 0.3, 500, retry)
    }

    const VALID_SECTION: &str = r#"{"qualified": true, "reason": "hiring now", "summary": "Ten open roles.", "evidence": "we need ten hires"}"#;

    #[tokio::test]
    async fn valid_section_response_parses_first_try() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(VALID_SECTION.to_string())]));
        let result = evaluator(provider.clone())
            .evaluate_opportunity(OpportunityCriterion::Now, "MEETING: x")
            .await
            .unwrap();
        assert!(result.qualified);
        assert_eq!(result.evidence, "we need ten hires");
        assert_eq!(provider.requests_seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let fenced = format!("```json\n{VALID_SECTION}\n```");
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(fenced)]));
        let result = evaluator(provider)
            .evaluate_opportunity(OpportunityCriterion::Fit, "MEETING: x")
            .await
            .unwrap();
        assert!(result.qualified);
    }

    #[tokio::test]
    async fn malformed_output_triggers_corrective_retries_then_unscored() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("not json".to_string()),
            Ok(String::new()),
            Ok(r#"{"qualified": "yes"}"#.to_string()),
        ]));
        let result = evaluator(provider.clone())
            .evaluate_opportunity(OpportunityCriterion::Next, "MEETING: x")
            .await
            .unwrap();
        assert!(!result.qualified);
        assert_eq!(result.reason, "Model returned invalid output");

        let seen = provider.requests_seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(!seen[0].contains(SCHEMA_CORRECTION));
        assert!(seen[1].contains(SCHEMA_CORRECTION));
        assert!(seen[2].contains(SCHEMA_CORRECTION));
    }

    #[tokio::test]
    async fn extra_keys_reject_an_opportunity_verdict() {
        let with_extra = r#"{"qualified": true, "reason": "r", "summary": "s", "evidence": "e", "score": 3}"#;
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(with_extra.to_string()),
            Ok(VALID_SECTION.to_string()),
        ]));
        let result = evaluator(provider)
            .evaluate_opportunity(OpportunityCriterion::Measure, "MEETING: x")
            .await
            .unwrap();
        assert!(result.qualified);
        assert_eq!(result.reason, "hiring now");
    }

    #[tokio::test]
    async fn transport_failure_retries_then_surfaces_the_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Network("connection reset".to_string())),
            Err(ProviderError::Network("connection reset".to_string())),
        ]));
        let outcome = evaluator(provider.clone())
            .evaluate_opportunity(OpportunityCriterion::Blocker, "MEETING: x")
            .await;
        assert!(outcome.is_err());
        assert_eq!(provider.requests_seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_then_success_recovers() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Timeout("deadline exceeded".to_string())),
            Ok(VALID_SECTION.to_string()),
        ]));
        let result = evaluator(provider)
            .evaluate_opportunity(OpportunityCriterion::Now, "MEETING: x")
            .await
            .unwrap();
        assert!(result.qualified);
    }

    #[tokio::test]
    async fn sales_scores_are_clamped_and_qualification_recomputed() {
        let inflated = r#"{"qualified": false, "score": 7, "reason": "strong open", "evidence": "hi, agenda is...", "coaching_note": null}"#;
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(inflated.to_string())]));
        let result = evaluator(provider)
            .evaluate_sales(SalesCriterion::Introduction, "MEETING: x")
            .await
            .unwrap();
        assert_eq!(result.score, Some(3));
        assert!(result.qualified);
        assert_eq!(result.coaching_note, None);
    }

    #[tokio::test]
    async fn sales_score_below_two_is_not_qualified() {
        let low = r#"{"qualified": true, "score": 1, "reason": "thin discovery", "evidence": null, "coaching_note": "ask layered questions"}"#;
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(low.to_string())]));
        let result = evaluator(provider)
            .evaluate_sales(SalesCriterion::Discovery, "MEETING: x")
            .await
            .unwrap();
        assert_eq!(result.score, Some(1));
        assert!(!result.qualified);
        assert_eq!(result.coaching_note.as_deref(), Some("ask layered questions"));
    }

    #[tokio::test]
    async fn sales_verdict_without_a_score_is_unscored() {
        let missing = r#"{"qualified": true, "reason": "r"}"#;
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(missing.to_string()),
            Ok(missing.to_string()),
            Ok(missing.to_string()),
        ]));
        let result = evaluator(provider)
            .evaluate_sales(SalesCriterion::NextSteps, "MEETING: x")
            .await
            .unwrap();
        assert_eq!(result.score, None);
        assert!(!result.qualified);
    }

    #[test]
    fn evidence_lists_are_joined() {
        let listy = r#"{"qualified": true, "reason": "r", "summary": "s", "evidence": ["first quote", "second quote"]}"#;
        let parsed = parse_section_result(listy).unwrap();
        assert_eq!(parsed.evidence, "first quote; second quote");
    }

    #[test]
    fn fence_stripping_handles_plain_and_tagged_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }
}
