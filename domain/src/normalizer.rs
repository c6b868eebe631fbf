//! Client identity normalization.
//!
//! Maps raw client-name strings extracted from transcripts onto canonical
//! client names using the client_mappings table, cached in memory for the
//! process lifetime. Corrupted identifiers that leak through extraction
//! (UUID-shaped strings, mostly-hex fragments) resolve to the sentinel
//! "Unknown" instead of polluting the warehouse.

use crate::error::Error;
use entity_api::client_mapping;
use log::*;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Canonical name used when no trustworthy client name exists
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Share of hex digits above which a digit-bearing name is treated as a
/// leaked identifier rather than a company name.
const HEX_CORRUPTION_RATIO: f64 = 0.8;

/// Cached variant -> canonical lookup over the client_mappings table.
///
/// The cache is read-mostly shared state: `normalize` takes a snapshot and
/// never blocks on writers. Mutations write through to the store and swap in
/// a freshly-loaded snapshot atomically, so readers never observe a
/// partially-updated map.
pub struct ClientNameNormalizer {
    cache: RwLock<Arc<HashMap<String, String>>>,
}

impl Default for ClientNameNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientNameNormalizer {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Loads the full mapping set from the store. If the store is
    /// unreachable the cache stays empty and normalization degrades to
    /// identity passthrough; scoring never fails because of this.
    pub async fn load(&self, db: &DatabaseConnection) {
        match client_mapping::find_all(db).await {
            Ok(mappings) => {
                let map: HashMap<String, String> = mappings
                    .into_iter()
                    .map(|m| (m.variant_name.trim().to_lowercase(), m.canonical_name))
                    .collect();
                info!("Loaded {} client name mappings", map.len());
                self.install(map);
            }
            Err(e) => {
                warn!("Client mappings unavailable, using passthrough normalization: {e}");
                self.install(HashMap::new());
            }
        }
    }

    /// Resolves a raw extracted name to its canonical form.
    pub fn normalize(&self, raw_name: &str) -> String {
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return UNKNOWN_CLIENT.to_string();
        }
        if Self::looks_like_uuid(trimmed) {
            debug!("Rejecting UUID-shaped client name: {trimmed}");
            return UNKNOWN_CLIENT.to_string();
        }
        if Self::looks_like_hex_garbage(trimmed) {
            debug!("Rejecting hex-corrupted client name: {trimmed}");
            return UNKNOWN_CLIENT.to_string();
        }

        let snapshot = self.snapshot();
        match snapshot.get(&trimmed.to_lowercase()) {
            Some(canonical) => canonical.clone(),
            None => trimmed.to_string(),
        }
    }

    /// Registers a mapping and refreshes the cache so this process and any
    /// concurrent readers observe it without restart.
    pub async fn add_mapping(
        &self,
        db: &DatabaseConnection,
        variant_name: &str,
        canonical_name: &str,
        notes: Option<String>,
    ) -> Result<(), Error> {
        client_mapping::upsert(db, variant_name, canonical_name, notes).await?;
        self.load(db).await;
        Ok(())
    }

    /// Removes a mapping and refreshes the cache. Returns how many rows the
    /// store removed (0 when the variant was unknown).
    pub async fn delete_mapping(
        &self,
        db: &DatabaseConnection,
        variant_name: &str,
    ) -> Result<u64, Error> {
        let removed = client_mapping::delete_by_variant(db, variant_name).await?;
        self.load(db).await;
        Ok(removed)
    }

    fn snapshot(&self) -> Arc<HashMap<String, String>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn install(&self, map: HashMap<String, String>) {
        let mut guard = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(map);
    }

    fn looks_like_uuid(name: &str) -> bool {
        Uuid::parse_str(name).is_ok()
    }

    /// Flags names where most characters are hex digits. Only names carrying
    /// at least one numeric digit can be leaked identifiers; all-letter names
    /// that happen to use a-f stay untouched.
    fn looks_like_hex_garbage(name: &str) -> bool {
        if !name.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }

        let mut total = 0usize;
        let mut hex = 0usize;
        for c in name.chars().filter(|c| !c.is_whitespace()) {
            total += 1;
            if c.is_ascii_hexdigit() {
                hex += 1;
            }
        }

        total > 0 && (hex as f64 / total as f64) > HEX_CORRUPTION_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer_with(mappings: &[(&str, &str)]) -> ClientNameNormalizer {
        let normalizer = ClientNameNormalizer::new();
        normalizer.install(
            mappings
                .iter()
                .map(|(variant, canonical)| (variant.to_lowercase(), canonical.to_string()))
                .collect(),
        );
        normalizer
    }

    #[test]
    fn mapped_variant_resolves_to_canonical_name() {
        let normalizer = normalizer_with(&[("Omnicom / DDB", "Omnicom")]);
        assert_eq!(normalizer.normalize("Omnicom / DDB"), "Omnicom");
    }

    #[test]
    fn mapping_lookup_ignores_case_and_padding() {
        let normalizer = normalizer_with(&[("omnicom / ddb", "Omnicom")]);
        assert_eq!(normalizer.normalize("  OMNICOM / DDB  "), "Omnicom");
    }

    #[test]
    fn unmapped_name_passes_through() {
        let normalizer = ClientNameNormalizer::new();
        assert_eq!(normalizer.normalize("Some New Company"), "Some New Company");
    }

    #[test]
    fn hex_corrupted_name_resolves_to_unknown() {
        let normalizer = ClientNameNormalizer::new();
        assert_eq!(normalizer.normalize("Bcb88E78 88E8"), UNKNOWN_CLIENT);
    }

    #[test]
    fn uuid_shaped_name_resolves_to_unknown() {
        let normalizer = ClientNameNormalizer::new();
        assert_eq!(
            normalizer.normalize("a98c3295-0933-44cb-89db-7db0f7250fb1"),
            UNKNOWN_CLIENT
        );
    }

    #[test]
    fn all_letter_names_survive_the_hex_check() {
        let normalizer = ClientNameNormalizer::new();
        assert_eq!(normalizer.normalize("Deca Fab Ad Co"), "Deca Fab Ad Co");
    }

    #[test]
    fn empty_name_resolves_to_unknown() {
        let normalizer = ClientNameNormalizer::new();
        assert_eq!(normalizer.normalize("   "), UNKNOWN_CLIENT);
    }

    #[test]
    fn corruption_checks_run_before_mapping_lookup() {
        // Even an explicit mapping cannot launder a UUID-shaped name
        let normalizer =
            normalizer_with(&[("a98c3295-0933-44cb-89db-7db0f7250fb1", "Acme")]);
        assert_eq!(
            normalizer.normalize("a98c3295-0933-44cb-89db-7db0f7250fb1"),
            UNKNOWN_CLIENT
        );
    }
}
