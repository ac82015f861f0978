pub mod formatter;

pub use formatter::{
    format_comparison, format_full_entries, format_score_result, format_summary_list,
    should_use_colors, truncate_title,
};
