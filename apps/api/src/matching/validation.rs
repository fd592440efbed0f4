//! Profile Validator: turns an untyped payload into a typed `Profile`.
//!
//! Pure. The first violation is reported; nothing is partially accepted.

use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::models::{JobPosting, Profile, ProfileKind, SeekerProfile};

const DEFAULT_JOB_TYPE: &str = "Full-time";

type Payload = Map<String, Value>;

/// Parses the `seeker` | `posting` discriminator.
pub fn parse_kind(raw: &str) -> Result<ProfileKind, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "seeker" => Ok(ProfileKind::Seeker),
        "posting" => Ok(ProfileKind::Posting),
        other => Err(ValidationError::new(
            "kind",
            format!("expected 'seeker' or 'posting', got '{other}'"),
        )),
    }
}

/// Validates `data` as the given kind of profile.
pub fn validate_profile(data: &Payload, kind: ProfileKind) -> Result<Profile, ValidationError> {
    match kind {
        ProfileKind::Seeker => validate_seeker(data).map(Profile::Seeker),
        ProfileKind::Posting => validate_posting(data).map(Profile::Posting),
    }
}

fn validate_seeker(data: &Payload) -> Result<SeekerProfile, ValidationError> {
    let skills = required_skills(data, &["skills"])?;

    let experience_years = match lookup(data, &["experience_years"]) {
        Some((key, value)) => non_negative_int(key, value)?,
        None => return Err(missing("experience_years")),
    };

    let preferred_job_types = match lookup(data, &["preferred_job_types"]) {
        Some((key, value)) => string_list(key, value)?,
        None => Vec::new(),
    };
    let preferred_job_types = if preferred_job_types.is_empty() {
        vec![DEFAULT_JOB_TYPE.to_string()]
    } else {
        preferred_job_types
    };

    Ok(SeekerProfile {
        skills,
        experience_years,
        education_level: optional_string(data, &["education_level"])?,
        location: optional_string(data, &["location", "preferred_location"])?,
        salary_range: optional_string(data, &["salary_range", "preferred_salary_range"])?,
        preferred_job_types,
        career_goals: optional_string(data, &["career_goals"])?,
    })
}

fn validate_posting(data: &Payload) -> Result<JobPosting, ValidationError> {
    let title = required_string(data, &["title"])?;
    let company = required_string(data, &["company"])?;
    let skills = required_skills(data, &["skills", "required_skills"])?;

    // Free text ("2-4 years"); a bare integer is accepted and rendered as a minimum.
    let experience_required = match lookup(data, &["experience_required"]) {
        Some((key, value @ Value::Number(_))) => {
            format!("{}+ years", non_negative_int(key, value)?)
        }
        Some(_) => required_string(data, &["experience_required"])?,
        None => return Err(missing("experience_required")),
    };

    Ok(JobPosting {
        title,
        company,
        skills,
        experience_required,
        education_level: optional_string(data, &["education_level", "education_required"])?,
        location: optional_string(data, &["location"])?,
        salary_range: optional_string(data, &["salary_range"])?,
        job_type: optional_string(data, &["job_type"])?,
        description: optional_string(data, &["description"])?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

/// First non-null value under any of `keys`, with the key it was found under.
fn lookup<'a>(data: &'a Payload, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|&k| data.get(k).filter(|v| !v.is_null()).map(|v| (k, v)))
}

fn missing(field: &str) -> ValidationError {
    ValidationError::new(field, "is required")
}

fn required_string(data: &Payload, keys: &[&'static str]) -> Result<String, ValidationError> {
    let (key, value) = lookup(data, keys).ok_or_else(|| missing(keys[0]))?;
    let text = value
        .as_str()
        .ok_or_else(|| ValidationError::new(key, "must be a string"))?
        .trim();
    if text.is_empty() {
        return Err(ValidationError::new(key, "must not be empty"));
    }
    Ok(text.to_string())
}

fn optional_string(
    data: &Payload,
    keys: &[&'static str],
) -> Result<Option<String>, ValidationError> {
    match lookup(data, keys) {
        None => Ok(None),
        Some((key, value)) => {
            let text = value
                .as_str()
                .ok_or_else(|| ValidationError::new(key, "must be a string"))?
                .trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
    }
}

fn required_skills(data: &Payload, keys: &[&'static str]) -> Result<Vec<String>, ValidationError> {
    let (key, value) = lookup(data, keys).ok_or_else(|| missing(keys[0]))?;
    let skills = string_list(key, value)?;
    if skills.is_empty() {
        return Err(ValidationError::new(key, "must contain at least one skill"));
    }
    Ok(skills)
}

fn string_list(key: &str, value: &Value) -> Result<Vec<String>, ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| ValidationError::new(key, "must be a list of strings"))?;

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let text = item
            .as_str()
            .ok_or_else(|| ValidationError::new(key, format!("item {i} is not a string")))?
            .trim();
        if text.is_empty() {
            return Err(ValidationError::new(key, format!("item {i} is blank")));
        }
        out.push(text.to_string());
    }
    Ok(out)
}

fn non_negative_int(key: &str, value: &Value) -> Result<u32, ValidationError> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| ValidationError::new(key, "is out of range"));
    }
    match value {
        Value::Number(n) if n.as_i64().is_some_and(|v| v < 0) => {
            Err(ValidationError::new(key, "must not be negative"))
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) if f < 0.0 => Err(ValidationError::new(key, "must not be negative")),
            Some(f) if f.fract() == 0.0 && f <= f64::from(u32::MAX) => Ok(f as u32),
            Some(f) if f.fract() == 0.0 => Err(ValidationError::new(key, "is out of range")),
            _ => Err(ValidationError::new(key, "must be a whole number")),
        },
        _ => Err(ValidationError::new(key, "must be a non-negative integer")),
    }
}
