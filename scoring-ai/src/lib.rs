//! Completion provider abstraction for LLM-powered transcript scoring.
//!
//! This crate provides trait-based abstractions for rubric scoring workflows:
//! - A provider trait for text completion against an LLM backend
//! - Request types covering the two API families providers expose
//! - Pure routing from a model identifier to the request family it requires
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different model vendors or self-hosted gateways without changing
//! application code. Every request family yields the same output contract:
//! a single plain-text completion.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use traits::completion::Provider;
pub use types::completion::{ChatMessage, CompletionRequest, ModelFamily};
