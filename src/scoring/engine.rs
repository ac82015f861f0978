use std::fmt;

use super::config::WeightTable;
use super::ratings::RatingVector;
use super::ScoringError;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Lower edge (inclusive) of the positive band
pub const POSITIVE_THRESHOLD: u8 = 65;
/// Lower edge (inclusive) of the hedge band
pub const HEDGE_THRESHOLD: u8 = 45;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorContribution {
    pub key: String,
    pub label: String, // e.g. "Impact", "Long-term value"
    pub rating: u8,
    pub value: i64, // weight * rating * scale
    pub note: Option<String>,
}

impl FactorContribution {
    pub fn sign(&self) -> char {
        if self.value < 0 {
            '-'
        } else {
            '+'
        }
    }

    pub fn magnitude(&self) -> i64 {
        self.value.saturating_abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    DoIt,
    Borderline,
    Delay,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::DoIt => "Do it",
            Recommendation::Borderline => "Borderline - try a small test first",
            Recommendation::Delay => "Delay or rethink",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub score: u8,
    /// Sum before clamping; only used for diagnostics
    pub raw: i64,
    /// Contributions in weight-table order
    pub contributions: Vec<FactorContribution>,
    /// Contributions ranked by magnitude
    pub breakdown: Vec<FactorContribution>,
    pub recommendation: Recommendation,
}

impl ScoreResult {
    pub fn biggest_factor(&self) -> Option<&FactorContribution> {
        self.breakdown.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOutcome {
    First,
    Second,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub first: ScoreResult,
    pub second: ScoreResult,
    pub outcome: ComparisonOutcome,
}

impl Comparison {
    /// Recommendation text naming the winner. A tie names neither side.
    pub fn describe(&self, first_name: &str, second_name: &str) -> String {
        match self.outcome {
            ComparisonOutcome::First => format!("Lean toward {}", first_name),
            ComparisonOutcome::Second => format!("Lean toward {}", second_name),
            ComparisonOutcome::Tie => format!(
                "Tie at {}/100 - both options are equally strong, pick either",
                self.first.score
            ),
        }
    }
}

/// Scores rating vectors against one injected weight table.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: WeightTable,
}

impl ScoringEngine {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn score(&self, ratings: &RatingVector) -> Result<ScoreResult, ScoringError> {
        let contributions = compute_contributions(&self.weights, ratings)?;
        let raw = raw_sum(&contributions);
        let score = total_score(&contributions);
        if raw != score as i64 {
            tracing::debug!(raw, score, "score clamped");
        }
        let breakdown = rank_breakdown(&contributions);

        Ok(ScoreResult {
            score,
            raw,
            contributions,
            breakdown,
            recommendation: recommend(score),
        })
    }

    /// Score two items under the same weights and pick the stronger one.
    pub fn compare(
        &self,
        first: &RatingVector,
        second: &RatingVector,
    ) -> Result<Comparison, ScoringError> {
        let first = self.score(first)?;
        let second = self.score(second)?;
        let outcome = compare_scores(first.score, second.score);

        Ok(Comparison {
            first,
            second,
            outcome,
        })
    }
}

/// Weight times rating (times scale) for every attribute, in table order.
///
/// The rating keys must match the table keys exactly.
pub fn compute_contributions(
    weights: &WeightTable,
    ratings: &RatingVector,
) -> Result<Vec<FactorContribution>, ScoringError> {
    if let Some(extra) = ratings.keys().find(|k| weights.get(k).is_none()) {
        return Err(ScoringError::UnknownAttribute(extra.to_string()));
    }

    weights
        .attributes
        .iter()
        .map(|attr| {
            let rating = ratings
                .get(&attr.key)
                .ok_or_else(|| ScoringError::MissingRating(attr.key.clone()))?;
            Ok(FactorContribution {
                key: attr.key.clone(),
                label: attr.label.clone(),
                rating,
                value: attr
                    .weight
                    .saturating_mul(rating as i64)
                    .saturating_mul(weights.scale),
                note: ratings.note(&attr.key).map(str::to_string),
            })
        })
        .collect()
}

fn raw_sum(contributions: &[FactorContribution]) -> i64 {
    // Saturate so oversized config weights still clamp the right way
    contributions
        .iter()
        .fold(0i64, |sum, c| sum.saturating_add(c.value))
}

/// Sum of contributions clamped to 0..=100.
pub fn total_score(contributions: &[FactorContribution]) -> u8 {
    raw_sum(contributions).clamp(MIN_SCORE, MAX_SCORE) as u8
}

/// Contributions sorted by absolute value, largest first.
///
/// The sort is stable, so equal magnitudes keep their table order.
pub fn rank_breakdown(contributions: &[FactorContribution]) -> Vec<FactorContribution> {
    let mut ranked = contributions.to_vec();
    ranked.sort_by(|a, b| b.magnitude().cmp(&a.magnitude()));
    ranked
}

pub fn recommend(score: u8) -> Recommendation {
    if score >= POSITIVE_THRESHOLD {
        Recommendation::DoIt
    } else if score >= HEDGE_THRESHOLD {
        Recommendation::Borderline
    } else {
        Recommendation::Delay
    }
}

pub fn compare_scores(first: u8, second: u8) -> ComparisonOutcome {
    match first.cmp(&second) {
        std::cmp::Ordering::Greater => ComparisonOutcome::First,
        std::cmp::Ordering::Less => ComparisonOutcome::Second,
        std::cmp::Ordering::Equal => ComparisonOutcome::Tie,
    }
}
