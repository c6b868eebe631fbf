//! HTTP clients for external services.

pub mod open_ai;
