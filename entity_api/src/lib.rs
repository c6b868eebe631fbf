pub use entity::{client_mappings, Id};

pub mod client_mapping;
pub mod error;
pub mod meeting_intel;
