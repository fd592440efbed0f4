//! Result Enhancer: canonicalizes raw search records and drops duplicates.
//!
//! Pure: no network, no model calls. Running it on its own output is a no-op.

use std::collections::HashSet;

use serde_json::Value;

use crate::models::{EnhancedRecord, SearchResult};

const TITLE_KEYS: &[&str] = &["title", "job_title", "headline"];
const COMPANY_KEYS: &[&str] = &["company_or_name", "company", "company_name", "name"];
const LOCATION_KEYS: &[&str] = &["location"];
const SKILL_KEYS: &[&str] = &["skills", "required_skills"];
const EXPERIENCE_KEYS: &[&str] = &["experience", "experience_required", "experience_years"];
const DESCRIPTION_KEYS: &[&str] = &["description", "content", "snippet"];
const URL_KEYS: &[&str] = &["url", "link"];

/// Normalizes each record, then deduplicates by (title, company/name, location),
/// case-insensitively. First occurrence wins; provider order is preserved.
pub fn enhance_results(results: Vec<SearchResult>) -> Vec<EnhancedRecord> {
    dedup_records(results.iter().map(normalize_record).collect())
}

/// Drops later records whose composite key was already seen.
pub fn dedup_records(records: Vec<EnhancedRecord>) -> Vec<EnhancedRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect()
}

/// Maps one raw record onto the canonical shape.
pub fn normalize_record(raw: &SearchResult) -> EnhancedRecord {
    EnhancedRecord {
        title: text_field(raw, TITLE_KEYS),
        company_or_name: text_field(raw, COMPANY_KEYS),
        location: text_field(raw, LOCATION_KEYS),
        skills: skills_field(raw),
        experience: text_field(raw, EXPERIENCE_KEYS),
        description: text_field(raw, DESCRIPTION_KEYS),
        url: text_field(raw, URL_KEYS),
    }
}

/// First non-empty scalar under any of `keys`, trimmed. Numbers and booleans
/// are rendered as text; anything else counts as missing.
fn text_field(raw: &SearchResult, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Skills as an array of strings or a comma-separated string. Blank entries
/// are dropped, repeats removed case-insensitively (first spelling kept).
fn skills_field(raw: &SearchResult) -> Vec<String> {
    let candidates: Vec<String> = SKILL_KEYS
        .iter()
        .filter_map(|k| raw.get(*k))
        .map(|v| match v {
            Value::Array(items) => items
                .iter()
                .filter_map(|i| i.as_str())
                .map(str::to_string)
                .collect(),
            Value::String(s) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        })
        .find(|list: &Vec<String>| list.iter().any(|s| !s.trim().is_empty()))
        .unwrap_or_default();

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}
