use serde::{Deserialize, Serialize};

/// Which side of the market a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Seeker,
    Posting,
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileKind::Seeker => f.write_str("seeker"),
            ProfileKind::Posting => f.write_str("posting"),
        }
    }
}

/// A job seeker looking for postings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekerProfile {
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub education_level: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub preferred_job_types: Vec<String>,
    pub career_goals: Option<String>,
}

/// A job posting looking for candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub skills: Vec<String>,
    /// Free-text range such as "2-4 years".
    pub experience_required: String,
    pub education_level: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<String>,
    pub description: Option<String>,
}

/// Validated matching input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Seeker(SeekerProfile),
    Posting(JobPosting),
}

impl Profile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            Profile::Seeker(_) => ProfileKind::Seeker,
            Profile::Posting(_) => ProfileKind::Posting,
        }
    }

    pub fn skills(&self) -> &[String] {
        match self {
            Profile::Seeker(s) => &s.skills,
            Profile::Posting(p) => &p.skills,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Profile::Seeker(s) => s.location.as_deref(),
            Profile::Posting(p) => p.location.as_deref(),
        }
    }

    /// Human-readable experience line, e.g. "3 years" or "2-4 years".
    pub fn experience_summary(&self) -> String {
        match self {
            Profile::Seeker(s) if s.experience_years == 1 => "1 year".to_string(),
            Profile::Seeker(s) => format!("{} years", s.experience_years),
            Profile::Posting(p) => p.experience_required.clone(),
        }
    }
}
