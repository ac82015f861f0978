use std::fmt;

/// Label used when an entry matches no known kind
pub const FALLBACK_LABEL: &str = "LOG";

/// How to pull a title out of one kind of entry.
struct TitleRule {
    marker: &'static str,
    prefix: &'static str,
    label: &'static str,
}

const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        marker: "NEW DECISION",
        prefix: "Decision:",
        label: "DECISION",
    },
    TitleRule {
        marker: "REFLECTION",
        prefix: "Past decision:",
        label: "REFLECTION",
    },
];

/// One-line description of a journal entry for history lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub header: String,
    pub label: &'static str,
    pub title: Option<String>,
}

impl fmt::Display for EntrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} | {}", self.header, title),
            None => write!(f, "{} | {}", self.header, self.label),
        }
    }
}

/// Best-effort summary of an entry. Missing fields fall back to the header
/// and the `LOG` label instead of failing.
pub fn summarize(entry: &str) -> EntrySummary {
    let header = entry.lines().next().unwrap_or_default().trim().to_string();

    let found = TITLE_RULES
        .iter()
        .find(|rule| entry.contains(rule.marker))
        .and_then(|rule| {
            entry
                .lines()
                .find_map(|line| line.trim().strip_prefix(rule.prefix))
                .map(|rest| (rule.label, rest.trim().to_string()))
        });

    match found {
        Some((label, title)) => EntrySummary {
            header,
            label,
            title: Some(title),
        },
        None => EntrySummary {
            header,
            label: FALLBACK_LABEL,
            title: None,
        },
    }
}
