pub mod filter;
pub mod record;
pub mod storage;
pub mod summary;

pub use filter::{list_recent, matches, search};
pub use record::{DecisionRecord, EntryKind, TIMESTAMP_FORMAT};
pub use storage::{get_journal_path, split_entries, Journal};
pub use summary::{summarize, EntrySummary};
