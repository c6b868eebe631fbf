use uuid::Uuid;

pub mod prelude;

pub mod client_mappings;
pub mod meeting_intel;
pub mod sales_performance_rating;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
