//! Business logic for transcript scoring and warehouse loading.
//!
//! This crate re-exports various items from the `entity_api` crate so that
//! consumers of the `domain` crate do not need to depend on it directly. The
//! underlying persistence details remain encapsulated in `entity_api`.

pub use entity_api::{client_mappings, Id};

pub mod error;
pub mod normalizer;
pub mod scoring;
pub mod transcript;
pub mod warehouse;

pub mod gateway;
