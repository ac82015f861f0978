use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::record::DecisionRecord;

/// Start of every record header, as seen at the beginning of a line
const RECORD_DELIMITER: &str = "\n[";

/// Get the default journal file path (~/.config/decision-journal/journal.txt)
pub fn get_journal_path() -> PathBuf {
    crate::config::get_config_dir().join("journal.txt")
}

/// Append-only text journal backed by a single file.
///
/// Every append and load is a full open/close cycle. Nothing coordinates
/// writers across processes.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single write.
    ///
    /// Records are separated by exactly one blank line.
    pub fn append(&self, record: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create journal directory {}", parent.display())
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open journal at {}", self.path.display()))?;

        let existing = file
            .metadata()
            .with_context(|| format!("Failed to stat journal at {}", self.path.display()))?
            .len();

        let mut blob = String::with_capacity(record.len() + 2);
        if existing > 0 {
            blob.push('\n');
        }
        blob.push_str(record.trim());
        blob.push('\n');

        file.write_all(blob.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_data())
            .with_context(|| format!("Failed to write journal at {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), bytes = blob.len(), "appended record");
        Ok(())
    }

    pub fn append_record(&self, record: &DecisionRecord) -> Result<()> {
        self.append(&record.render())
    }

    /// All entries, oldest first. A missing journal is an empty one.
    pub fn load_entries(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read journal at {}", self.path.display())
                })
            }
        };

        let entries = split_entries(&content);
        tracing::debug!(path = %self.path.display(), count = entries.len(), "loaded entries");
        Ok(entries)
    }
}

/// Split raw journal text into entries.
///
/// A new entry starts wherever a line begins with `[`. The `[` consumed by the
/// split is put back on every fragment after the first. Free text containing
/// a newline followed by `[` will be split too.
pub fn split_entries(content: &str) -> Vec<String> {
    content
        .split(RECORD_DELIMITER)
        .enumerate()
        .map(|(i, fragment)| {
            if i == 0 {
                fragment.trim().to_string()
            } else {
                format!("[{}", fragment).trim().to_string()
            }
        })
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::record::EntryKind;

    fn temp_journal() -> (tempfile::TempDir, Journal) {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("journal.txt"));
        (dir, journal)
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let (_dir, journal) = temp_journal();
        assert!(journal.load_entries().unwrap().is_empty());
    }

    #[test]
    fn test_load_empty_file_returns_empty() {
        let (_dir, journal) = temp_journal();
        fs::write(journal.path(), "  \n\n").unwrap();
        assert!(journal.load_entries().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load_returns_every_record() {
        let (_dir, journal) = temp_journal();
        let records = vec![
            "[2024-01-01 09:00:00] NEW DECISION\nDecision: Learn Rust\nScore: 80/100\n".to_string(),
            "[2024-01-02 10:30:00] REFLECTION\nPast decision: Learn Rust\nOutcome: fun".to_string(),
            "[2024-01-03 11:45:00] NEW DECISION\nDecision: Adopt a cat\n".to_string(),
        ];

        for record in &records {
            journal.append(record).unwrap();
        }

        let entries = journal.load_entries().unwrap();
        assert_eq!(entries.len(), records.len());
        for (entry, record) in entries.iter().zip(&records) {
            assert_eq!(entry, record.trim());
        }
    }

    #[test]
    fn test_exactly_one_blank_line_between_records() {
        let (_dir, journal) = temp_journal();
        journal.append("[2024-01-01 09:00:00] NEW DECISION\nDecision: A\n").unwrap();
        journal.append("[2024-01-02 09:00:00] NEW DECISION\nDecision: B\n").unwrap();

        let raw = fs::read_to_string(journal.path()).unwrap();
        assert_eq!(
            raw,
            "[2024-01-01 09:00:00] NEW DECISION\nDecision: A\n\n[2024-01-02 09:00:00] NEW DECISION\nDecision: B\n"
        );
    }

    #[test]
    fn test_append_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("nested").join("deeper").join("log.txt"));
        let record = DecisionRecord::now(EntryKind::Reflection).field("Past decision", "x");

        journal.append_record(&record).unwrap();
        assert_eq!(journal.load_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_load_legacy_single_line_entries() {
        let (_dir, journal) = temp_journal();
        fs::write(
            journal.path(),
            "[2024-01-01 09:00:00] buy a bike\n[2024-01-01 09:05:00] sell the car\n",
        )
        .unwrap();

        let entries = journal.load_entries().unwrap();
        assert_eq!(
            entries,
            vec!["[2024-01-01 09:00:00] buy a bike", "[2024-01-01 09:05:00] sell the car"]
        );
    }

    #[test]
    fn test_split_keeps_text_before_first_header() {
        let entries = split_entries("stray note\n[2024-01-01 09:00:00] NEW DECISION");
        assert_eq!(entries, vec!["stray note", "[2024-01-01 09:00:00] NEW DECISION"]);
    }

    #[test]
    fn test_split_on_bracket_inside_free_text() {
        // Known limitation: a bracket at line start always starts a new entry
        let entries =
            split_entries("[2024-01-01 09:00:00] NEW DECISION\nDecision: x\n[draft] notes");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], "[draft] notes");
    }

    #[test]
    fn test_split_handles_crlf() {
        let entries = split_entries("[a] ONE\r\nx: 1\r\n\r\n[b] TWO\r\n");
        assert_eq!(entries, vec!["[a] ONE\r\nx: 1", "[b] TWO"]);
    }
}
