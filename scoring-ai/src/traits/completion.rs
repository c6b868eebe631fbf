//! Completion provider trait.

use crate::types::completion::CompletionRequest;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM text completion backends.
///
/// Implementations dispatch both request families against their native APIs
/// and return the completion as plain text. This trait enables model
/// comparison, cost optimization, and provider switching. Completely
/// domain-agnostic - applications define what to ask via the request prompt.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a completion request and return the raw response text.
    ///
    /// An empty string is a valid return value; callers decide whether an
    /// empty completion warrants a retry. Transport and provider failures
    /// surface as [`Error`] variants.
    async fn complete(&self, request: CompletionRequest) -> Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "openai", "azure").
    ///
    /// Used for cost tracking, model-specific logic, and provider selection.
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;

    /// Validate API credentials by making a lightweight test request.
    ///
    /// Returns false if credentials are invalid, expired, or lack access to
    /// the configured model.
    async fn verify_credentials(&self) -> Result<bool, Error>;
}
