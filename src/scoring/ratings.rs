use std::collections::BTreeMap;

use super::ScoringError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Named 1-5 ratings for one decision or task.
///
/// Built once from user input or an external scorer and never changed after.
/// Notes hold the optional per-attribute justification an external scorer gives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RatingVector {
    ratings: BTreeMap<String, u8>,
    notes: BTreeMap<String, String>,
}

impl RatingVector {
    /// Build a vector, rejecting any rating outside 1..=5.
    pub fn new<I, K>(pairs: I) -> Result<Self, ScoringError>
    where
        I: IntoIterator<Item = (K, u8)>,
        K: Into<String>,
    {
        let mut ratings = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if !is_valid_rating(value as i64) {
                return Err(ScoringError::RatingOutOfRange { key, value: value as i64 });
            }
            ratings.insert(key, value);
        }
        Ok(Self {
            ratings,
            notes: BTreeMap::new(),
        })
    }

    /// Attach a justification to an attribute. Blank notes are ignored.
    pub fn with_note(mut self, key: impl Into<String>, note: impl Into<String>) -> Self {
        let note = note.into();
        if !note.trim().is_empty() {
            self.notes.insert(key.into(), note.trim().to_string());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<u8> {
        self.ratings.get(key).copied()
    }

    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ratings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

pub fn is_valid_rating(value: i64) -> bool {
    (MIN_RATING as i64..=MAX_RATING as i64).contains(&value)
}
