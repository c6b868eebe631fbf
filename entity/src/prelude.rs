pub use super::client_mappings::Entity as ClientMappings;
pub use super::meeting_intel::Entity as MeetingIntel;
