use chrono::{Local, NaiveDateTime};

use crate::scoring::ScoreResult;

/// strftime format of the record header timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    NewDecision,
    Reflection,
}

impl EntryKind {
    /// Marker written after the timestamp in the header line
    pub fn marker(&self) -> &'static str {
        match self {
            EntryKind::NewDecision => "NEW DECISION",
            EntryKind::Reflection => "REFLECTION",
        }
    }
}

/// One journal entry, built line by line and rendered as a text block.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    timestamp: NaiveDateTime,
    kind: EntryKind,
    lines: Vec<String>,
}

impl DecisionRecord {
    pub fn new(kind: EntryKind, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            kind,
            lines: Vec::new(),
        }
    }

    /// Start a record stamped with the current local time
    pub fn now(kind: EntryKind) -> Self {
        Self::new(kind, Local::now().naive_local())
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn header(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.kind.marker()
        )
    }

    /// Add a `Label: value` line.
    pub fn field(mut self, label: &str, value: impl AsRef<str>) -> Self {
        self.lines.push(format!("{}: {}", label, value.as_ref().trim()));
        self
    }

    /// Add a field only when the value is non-blank.
    pub fn optional_field(self, label: &str, value: impl AsRef<str>) -> Self {
        if value.as_ref().trim().is_empty() {
            self
        } else {
            self.field(label, value)
        }
    }

    pub fn yes_no(self, label: &str, value: bool) -> Self {
        self.field(label, if value { "yes" } else { "no" })
    }

    /// Score, banded recommendation, breakdown and biggest factor.
    pub fn scored(mut self, result: &ScoreResult) -> Self {
        self.lines.push(format!("Score: {}/100", result.score));
        self.lines
            .push(format!("Recommendation: {}", result.recommendation));
        self.push_breakdown(result);
        self
    }

    /// Score section for one side of a comparison; the band is left out
    /// because the comparison itself decides.
    pub fn scored_option(mut self, result: &ScoreResult) -> Self {
        self.lines.push(format!("Score: {}/100", result.score));
        self.push_breakdown(result);
        self
    }

    fn push_breakdown(&mut self, result: &ScoreResult) {
        self.lines.push("Breakdown:".to_string());
        for factor in &result.breakdown {
            self.lines.push(format!(
                "- {} {} ({}/5) : {} pts",
                factor.sign(),
                factor.label,
                factor.rating,
                factor.magnitude()
            ));
            if let Some(note) = &factor.note {
                self.lines.push(format!("  why: {}", note));
            }
        }
        if let Some(top) = result.biggest_factor() {
            self.lines.push(format!(
                "Biggest factor: {} ({} pts)",
                top.label,
                top.magnitude()
            ));
        }
    }

    pub fn render(&self) -> String {
        let mut text = self.header();
        for line in &self.lines {
            text.push('\n');
            text.push_str(line);
        }
        text.push('\n');
        text
    }
}
