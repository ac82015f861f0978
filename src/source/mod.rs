pub mod external;
pub mod manual;

pub use external::ExternalScorer;
pub use manual::ManualSource;

use async_trait::async_trait;

use crate::scoring::{RatingVector, WeightTable};

/// What to rate: one item for a decision, two for a comparison.
#[derive(Debug, Clone)]
pub struct RatingRequest<'a> {
    pub items: Vec<String>,
    /// Context such as goal or main concern, as (label, value) pairs
    pub hints: Vec<(String, String)>,
    pub weights: &'a WeightTable,
}

impl<'a> RatingRequest<'a> {
    pub fn new(weights: &'a WeightTable, items: Vec<String>) -> Self {
        Self {
            items,
            hints: Vec::new(),
            weights,
        }
    }

    /// Add a hint, skipping blank values.
    pub fn hint(mut self, label: &str, value: &str) -> Self {
        if !value.trim().is_empty() {
            self.hints.push((label.to_string(), value.trim().to_string()));
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no API key found (set {0})")]
    MissingCredential(String),

    #[error("scoring service request failed: {0}")]
    Http(String),

    #[error("scoring service timed out")]
    Timeout,

    #[error("scoring service sent an unusable reply: {0}")]
    MalformedResponse(String),

    #[error("could not read ratings: {0}")]
    Input(#[from] std::io::Error),
}

impl SourceError {
    /// True when the caller should fall back to manual ratings.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, SourceError::Input(_))
    }
}

/// Anything that can produce 1-5 ratings for the requested items.
///
/// Returns one vector per requested item, in order. A source that cannot
/// rate must fail instead of guessing.
#[async_trait(?Send)]
pub trait RatingSource {
    fn name(&self) -> &str;

    async fn rate(&mut self, request: &RatingRequest<'_>) -> Result<Vec<RatingVector>, SourceError>;
}
