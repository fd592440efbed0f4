//! Provider query construction. Pure and deterministic for a given profile.

use crate::models::Profile;

/// Number of leading skills that go into the query.
pub const MAX_QUERY_SKILLS: usize = 5;
const DEFAULT_LOCATION: &str = "remote";

/// Builds the provider query string for a profile.
///
/// Shape: `(skill1 OR skill2 ...) "location" "experience" site:...`
pub fn build_query(profile: &Profile) -> String {
    let skills: Vec<&str> = profile
        .skills()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_QUERY_SKILLS)
        .collect();

    let location = profile
        .location()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LOCATION);

    let mut parts = Vec::with_capacity(4);
    if !skills.is_empty() {
        parts.push(format!("({})", skills.join(" OR ")));
    }
    parts.push(format!("\"{location}\""));

    let experience = experience_qualifier(profile);
    if !experience.is_empty() {
        parts.push(format!("\"{experience}\""));
    }

    parts.push(site_filter(profile).to_string());
    parts.join(" ")
}

fn experience_qualifier(profile: &Profile) -> String {
    match profile {
        Profile::Seeker(s) => format!("{}+ years experience", s.experience_years),
        Profile::Posting(p) => {
            let text = p.experience_required.trim();
            if text.is_empty() {
                String::new()
            } else {
                format!("{text} experience")
            }
        }
    }
}

/// Seekers search postings; postings search candidate profiles.
fn site_filter(profile: &Profile) -> &'static str {
    match profile {
        Profile::Seeker(_) => "site:linkedin.com/jobs",
        Profile::Posting(_) => "site:linkedin.com/in",
    }
}
