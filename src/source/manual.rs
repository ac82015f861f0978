use async_trait::async_trait;
use std::io::{BufRead, Write};

use super::{RatingRequest, RatingSource, SourceError};
use crate::prompt::Prompter;
use crate::scoring::RatingVector;

/// Rates by asking the user every question in the weight table.
pub struct ManualSource<'p, R, W> {
    prompter: &'p mut Prompter<R, W>,
}

impl<'p, R: BufRead, W: Write> ManualSource<'p, R, W> {
    pub fn new(prompter: &'p mut Prompter<R, W>) -> Self {
        Self { prompter }
    }
}

#[async_trait(?Send)]
impl<'p, R: BufRead, W: Write> RatingSource for ManualSource<'p, R, W> {
    fn name(&self) -> &str {
        "manual"
    }

    async fn rate(&mut self, request: &RatingRequest<'_>) -> Result<Vec<RatingVector>, SourceError> {
        let mut vectors = Vec::with_capacity(request.items.len());

        for item in &request.items {
            if request.items.len() > 1 {
                self.prompter.say("")?;
                self.prompter.say(format!("Rating: {}", item))?;
            }

            let mut pairs = Vec::with_capacity(request.weights.attributes.len());
            for attr in &request.weights.attributes {
                let rating = self.prompter.ask_rating(&attr.question())?;
                pairs.push((attr.key.clone(), rating));
            }

            // ask_rating only returns values in range
            let vector = RatingVector::new(pairs)
                .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;
            vectors.push(vector);
        }

        Ok(vectors)
    }
}
