//! Request types for the two completion API families providers expose.

use serde::{Deserialize, Serialize};

/// Model id prefixes that must be routed to the reasoning request family.
const REASONING_MODEL_PREFIXES: &[&str] = &["gpt-5", "o1"];

/// Reasoning models stall on tight output budgets; requests are floored here.
const REASONING_MIN_OUTPUT_TOKENS: u32 = 1500;

/// Which request family a model identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Chat-completions style: role-tagged messages, sampling temperature
    Chat,
    /// Responses style: one combined input, reasoning effort, no temperature
    Reasoning,
}

impl ModelFamily {
    /// Routing is a pure function of the model identifier, nothing else.
    pub fn of(model_id: &str) -> Self {
        if REASONING_MODEL_PREFIXES
            .iter()
            .any(|prefix| model_id.starts_with(prefix))
        {
            ModelFamily::Reasoning
        } else {
            ModelFamily::Chat
        }
    }
}

/// A single role-tagged message in a chat-family request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A provider request in one of the two supported API families.
///
/// Both variants resolve to the same output contract: a single plain-text
/// completion. Callers never pick a variant directly; [`CompletionRequest::for_model`]
/// routes on the model identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionRequest {
    Chat {
        model: String,
        messages: Vec<ChatMessage>,
        /// Ignored by providers for models that reject sampling controls
        temperature: Option<f32>,
        max_tokens: u32,
    },
    Reasoning {
        model: String,
        /// System instruction and prompt combined into one input block
        input: String,
        /// Kept low to avoid request timeouts on long transcripts
        effort: String,
        verbosity: String,
        max_output_tokens: u32,
    },
}

impl CompletionRequest {
    /// Builds the request shape the given model requires.
    ///
    /// Reasoning models take the system instruction folded into the input and
    /// carry no temperature; their token budget is floored at
    /// [`REASONING_MIN_OUTPUT_TOKENS`]. Everything else becomes a two-message
    /// chat request.
    pub fn for_model(
        model_id: &str,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        match ModelFamily::of(model_id) {
            ModelFamily::Reasoning => CompletionRequest::Reasoning {
                model: model_id.to_string(),
                input: format!("{system}\n\n{prompt}"),
                effort: "minimal".to_string(),
                verbosity: "low".to_string(),
                max_output_tokens: max_tokens.max(REASONING_MIN_OUTPUT_TOKENS),
            },
            ModelFamily::Chat => CompletionRequest::Chat {
                model: model_id.to_string(),
                messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
                temperature: Some(temperature),
                max_tokens,
            },
        }
    }

    /// The model identifier this request targets.
    pub fn model(&self) -> &str {
        match self {
            CompletionRequest::Chat { model, .. } => model,
            CompletionRequest::Reasoning { model, .. } => model,
        }
    }
}
