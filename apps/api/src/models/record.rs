use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw record as returned by the search provider. No guaranteed keys.
pub type SearchResult = Map<String, Value>;

/// Canonical search record. Every field is always present; unknown values
/// are empty rather than missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedRecord {
    pub title: String,
    pub company_or_name: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub description: String,
    pub url: String,
}

impl EnhancedRecord {
    /// Composite identity used for deduplication.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.title.trim().to_lowercase(),
            self.company_or_name.trim().to_lowercase(),
            self.location.trim().to_lowercase(),
        )
    }
}
