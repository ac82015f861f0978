pub mod config;
pub mod engine;
pub mod ratings;
pub mod validation;

pub use config::*;
pub use engine::{
    compare_scores, compute_contributions, rank_breakdown, recommend, total_score, Comparison,
    ComparisonOutcome, FactorContribution, Recommendation, ScoreResult, ScoringEngine,
};
pub use ratings::{is_valid_rating, RatingVector, MAX_RATING, MIN_RATING};
pub use validation::validate_scoring;

/// Precondition violations when building ratings or scoring them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("no rating given for '{0}'")]
    MissingRating(String),

    #[error("'{0}' is not an attribute of this weight table")]
    UnknownAttribute(String),

    #[error("rating for '{key}' must be between 1 and 5, got {value}")]
    RatingOutOfRange { key: String, value: i64 },
}
