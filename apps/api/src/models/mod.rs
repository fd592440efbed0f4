pub mod match_result;
pub mod profile;
pub mod record;

pub use match_result::{MatchOutcome, MatchResult, RankedMatch, ScoreSource};
pub use profile::{JobPosting, Profile, ProfileKind, SeekerProfile};
pub use record::{EnhancedRecord, SearchResult};
