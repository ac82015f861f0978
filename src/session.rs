use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::journal::{list_recent, summarize, DecisionRecord, EntryKind, Journal};
use crate::output::{format_comparison, format_score_result};
use crate::prompt::Prompter;
use crate::scoring::{RatingVector, ScoringConfig, ScoringEngine};
use crate::source::{ManualSource, RatingRequest, RatingSource};

/// How many past decisions the reflect flow offers to pick from
const REFLECT_CHOICES: usize = 5;

/// Interactive flows that collect input, score it and write to the journal.
pub struct Session<'a, R, W> {
    prompter: &'a mut Prompter<R, W>,
    journal: &'a Journal,
    decision_engine: ScoringEngine,
    comparison_engine: ScoringEngine,
    external: Option<Box<dyn RatingSource + 'a>>,
    use_colors: bool,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(
        prompter: &'a mut Prompter<R, W>,
        journal: &'a Journal,
        scoring: &ScoringConfig,
    ) -> Self {
        Self {
            prompter,
            journal,
            decision_engine: ScoringEngine::new(scoring.decision.clone()),
            comparison_engine: ScoringEngine::new(scoring.comparison.clone()),
            external: None,
            use_colors: false,
        }
    }

    /// Try this source before asking the user.
    pub fn with_external(mut self, source: Box<dyn RatingSource + 'a>) -> Self {
        self.external = Some(source);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn prompter(&mut self) -> &mut Prompter<R, W> {
        self.prompter
    }

    /// Ratings from the external source if it works, otherwise from the user.
    /// Returns the vectors and the name of the source that produced them.
    async fn collect_ratings(
        &mut self,
        request: &RatingRequest<'_>,
    ) -> Result<(Vec<RatingVector>, String)> {
        if let Some(source) = self.external.as_mut() {
            self.prompter
                .say(format!("Asking {} for ratings...", source.name()))?;
            match source.rate(request).await {
                Ok(vectors) => return Ok((vectors, source.name().to_string())),
                Err(e) if e.is_unavailable() => {
                    tracing::warn!(source = source.name(), error = %e, "rating source unavailable");
                    self.prompter.say(format!(
                        "AI scoring unavailable ({}). Rate it yourself instead.",
                        e
                    ))?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut manual = ManualSource::new(&mut *self.prompter);
        let vectors = manual.rate(request).await?;
        Ok((vectors, manual.name().to_string()))
    }

    /// Record a single decision.
    pub async fn decide(&mut self) -> Result<DecisionRecord> {
        self.prompter.say("")?;
        self.prompter.say("New decision")?;
        let decision = self.prompter.ask_required("Decision: ")?;
        let options = self.prompter.ask("Options (optional): ")?;
        let goal = self.prompter.ask("Goal (optional): ")?;
        let concern = self.prompter.ask("Main concern (optional): ")?;

        let weights = self.decision_engine.weights().clone();
        let request = RatingRequest::new(&weights, vec![decision.clone()])
            .hint("Options", &options)
            .hint("Goal", &goal)
            .hint("Main concern", &concern);
        let (vectors, rated_by) = self.collect_ratings(&request).await?;
        let ratings = vectors
            .first()
            .context("rating source returned no ratings")?;

        let result = self.decision_engine.score(ratings)?;
        self.prompter.say("")?;
        self.prompter
            .say(format_score_result(&result, self.use_colors))?;

        let record = DecisionRecord::now(EntryKind::NewDecision)
            .field("Decision", &decision)
            .optional_field("Options", &options)
            .optional_field("Goal", &goal)
            .optional_field("Concern", &concern)
            .field("Rated by", &rated_by)
            .scored(&result);
        self.save(&record)?;
        Ok(record)
    }

    /// Record a comparison of two tasks scored under the same weights.
    pub async fn compare(&mut self) -> Result<DecisionRecord> {
        self.prompter.say("")?;
        self.prompter.say("Compare two tasks")?;
        let first = self.prompter.ask_required("First task: ")?;
        let second = self.prompter.ask_required("Second task: ")?;
        let context = self.prompter.ask("Context (optional): ")?;

        let weights = self.comparison_engine.weights().clone();
        let request = RatingRequest::new(&weights, vec![first.clone(), second.clone()])
            .hint("Context", &context);
        let (vectors, rated_by) = self.collect_ratings(&request).await?;
        if vectors.len() != 2 {
            anyhow::bail!("rating source returned {} rating sets, expected 2", vectors.len());
        }

        let comparison = self.comparison_engine.compare(&vectors[0], &vectors[1])?;
        self.prompter.say("")?;
        self.prompter.say(format_comparison(
            &comparison,
            &first,
            &second,
            self.use_colors,
        ))?;

        let record = DecisionRecord::now(EntryKind::NewDecision)
            .field("Decision", format!("{} vs {}", first, second))
            .field("Mode", "task comparison")
            .optional_field("Context", &context)
            .field("Rated by", &rated_by)
            .field("Option A", &first)
            .scored_option(&comparison.first)
            .field("Option B", &second)
            .scored_option(&comparison.second)
            .field("Recommendation", comparison.describe(&first, &second));
        self.save(&record)?;
        Ok(record)
    }

    /// Look back at an earlier decision.
    pub async fn reflect(&mut self) -> Result<DecisionRecord> {
        let entries = self.journal.load_entries()?;
        let titles: Vec<String> = list_recent(&entries, entries.len())
            .into_iter()
            .map(|entry| summarize(entry))
            .filter(|summary| summary.label == "DECISION")
            .filter_map(|summary| summary.title)
            .take(REFLECT_CHOICES)
            .collect();

        self.prompter.say("")?;
        self.prompter.say("Reflect on a past decision")?;
        let past = if titles.is_empty() {
            self.prompter.ask_required("Past decision: ")?
        } else {
            for (i, title) in titles.iter().enumerate() {
                self.prompter.say(format!("  {}. {}", i + 1, title))?;
            }
            let input = self
                .prompter
                .ask_required("Pick a number, or describe the decision: ")?;
            match input.parse::<usize>() {
                Ok(n) if (1..=titles.len()).contains(&n) => titles[n - 1].clone(),
                _ => input,
            }
        };

        let outcome = self.prompter.ask_required("How did it turn out? ")?;
        let regret = self.prompter.ask_yes_no("Do you regret it?")?;
        let helpful = self
            .prompter
            .ask_yes_no("Was the recommendation helpful?")?;

        let record = DecisionRecord::now(EntryKind::Reflection)
            .field("Past decision", &past)
            .field("Outcome", &outcome)
            .yes_no("Regret", regret)
            .yes_no("Recommendation helpful", helpful);
        self.save(&record)?;
        Ok(record)
    }

    fn save(&mut self, record: &DecisionRecord) -> Result<()> {
        self.journal.append_record(record)?;
        self.prompter.say(format!(
            "Saved to {}",
            self.journal.path().display()
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::search;
    use crate::prompt::tests::scripted;
    use crate::source::SourceError;
    use async_trait::async_trait;

    struct StubSource {
        reply: Option<Vec<RatingVector>>,
    }

    #[async_trait(?Send)]
    impl RatingSource for StubSource {
        fn name(&self) -> &str {
            "stub-model"
        }

        async fn rate(
            &mut self,
            _request: &RatingRequest<'_>,
        ) -> std::result::Result<Vec<RatingVector>, SourceError> {
            self.reply.take().ok_or(SourceError::Timeout)
        }
    }

    fn temp_journal() -> (tempfile::TempDir, Journal) {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("journal.txt"));
        (dir, journal)
    }

    #[tokio::test]
    async fn test_decide_manual_writes_record() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("Take the job\nstay or go\nmore growth\n\n5\n1\n1\n5\n");
        let scoring = ScoringConfig::default();

        let record = Session::new(&mut prompter, &journal, &scoring)
            .decide()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], record.render().trim());
        assert!(entries[0].contains("\nDecision: Take the job\n"));
        assert!(entries[0].contains("\nGoal: more growth\n"));
        assert!(!entries[0].contains("Concern:"));
        assert!(entries[0].contains("\nRated by: manual\n"));
        assert!(entries[0].contains("\nScore: 100/100\nRecommendation: Do it\n"));
        assert_eq!(summarize(&entries[0]).title.as_deref(), Some("Take the job"));
    }

    #[tokio::test]
    async fn test_decide_uses_external_ratings() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("Adopt a cat\n\n\n\n");
        let scoring = ScoringConfig::default();
        let ratings = RatingVector::new([("impact", 3), ("cost", 2), ("risk", 2), ("reversible", 2)])
            .unwrap()
            .with_note("impact", "companionship");
        let stub = StubSource {
            reply: Some(vec![ratings]),
        };

        Session::new(&mut prompter, &journal, &scoring)
            .with_external(Box::new(stub))
            .decide()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        assert!(entries[0].contains("Rated by: stub-model"));
        assert!(entries[0].contains("- + Impact (3/5) : 60 pts\n  why: companionship"));
        assert!(entries[0].contains("Score: 20/100\nRecommendation: Delay or rethink"));
    }

    #[tokio::test]
    async fn test_unavailable_external_falls_back_to_manual() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("Move abroad\n\n\n\n3\n3\n3\n3\n");
        let scoring = ScoringConfig::default();

        Session::new(&mut prompter, &journal, &scoring)
            .with_external(Box::new(StubSource { reply: None }))
            .decide()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        // 60 - 45 - 45 + 30 = 0
        assert!(entries[0].contains("Rated by: manual"));
        assert!(entries[0].contains("Score: 0/100"));

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(output.contains("AI scoring unavailable (scoring service timed out)"));
    }

    #[tokio::test]
    async fn test_compare_writes_both_options() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("Write report\nFix bike\nfree saturday\n5\n5\n5\n1\n1\n1\n1\n5\n");
        let scoring = ScoringConfig::default();

        Session::new(&mut prompter, &journal, &scoring)
            .compare()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert!(entry.contains("\nDecision: Write report vs Fix bike\n"));
        assert!(entry.contains("\nOption A: Write report\nScore: 72/100\n"));
        assert!(entry.contains("\nOption B: Fix bike\nScore: 0/100\n"));
        assert!(entry.ends_with("Recommendation: Lean toward Write report"));
        assert_eq!(entry.matches("Recommendation:").count(), 1);
    }

    #[tokio::test]
    async fn test_compare_tie() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("A\nB\n\n3\n3\n3\n3\n3\n3\n3\n3\n");
        let scoring = ScoringConfig::default();

        Session::new(&mut prompter, &journal, &scoring)
            .compare()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        assert!(entries[0].ends_with("Recommendation: Tie at 36/100 - both options are equally strong, pick either"));
    }

    #[tokio::test]
    async fn test_reflect_picks_recent_decision_by_number() {
        let (_dir, journal) = temp_journal();
        journal
            .append("[2024-01-01 09:00:00] NEW DECISION\nDecision: Learn Rust\n")
            .unwrap();
        journal
            .append("[2024-01-02 09:00:00] REFLECTION\nPast decision: Learn Rust\n")
            .unwrap();
        journal
            .append("[2024-01-03 09:00:00] NEW DECISION\nDecision: Buy a bike\n")
            .unwrap();
        let mut prompter = scripted("2\nLoving it\nno\nyes\n");
        let scoring = ScoringConfig::default();

        Session::new(&mut prompter, &journal, &scoring)
            .reflect()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        assert_eq!(entries.len(), 4);
        let reflection = &entries[3];
        assert!(reflection.contains("] REFLECTION\nPast decision: Learn Rust\nOutcome: Loving it\nRegret: no\nRecommendation helpful: yes"));
        assert_eq!(search(&entries, "loving").len(), 1);
    }

    #[tokio::test]
    async fn test_reflect_free_text_when_journal_empty() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("Quit coffee\nHeadaches\nyes\nno\n");
        let scoring = ScoringConfig::default();

        Session::new(&mut prompter, &journal, &scoring)
            .reflect()
            .await
            .unwrap();

        let entries = journal.load_entries().unwrap();
        assert_eq!(summarize(&entries[0]).title.as_deref(), Some("Quit coffee"));
        assert!(entries[0].contains("Regret: yes"));
    }

    #[tokio::test]
    async fn test_closed_input_propagates() {
        let (_dir, journal) = temp_journal();
        let mut prompter = scripted("Half finished\n\n\n\n4\n");
        let scoring = ScoringConfig::default();

        let result = Session::new(&mut prompter, &journal, &scoring).decide().await;
        assert!(result.is_err());
        assert!(journal.load_entries().unwrap().is_empty());
    }
}
