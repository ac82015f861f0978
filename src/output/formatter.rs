use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::journal::summarize;
use crate::scoring::{Comparison, FactorContribution, Recommendation, ScoreResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn format_factor(factor: &FactorContribution, use_colors: bool) -> String {
    let sign = factor.sign().to_string();
    let line = format!(
        "{} ({}/5) : {} pts",
        factor.label,
        factor.rating,
        factor.magnitude()
    );
    let mut text = if use_colors {
        if factor.value < 0 {
            format!("  {} {}", sign.red().bold(), line)
        } else {
            format!("  {} {}", sign.green().bold(), line)
        }
    } else {
        format!("  {} {}", sign, line)
    };
    if let Some(note) = &factor.note {
        if use_colors {
            text.push_str(&format!("\n      {}", note.dimmed()));
        } else {
            text.push_str(&format!("\n      {}", note));
        }
    }
    text
}

fn format_breakdown(result: &ScoreResult, use_colors: bool) -> Vec<String> {
    let mut lines = vec!["Breakdown:".to_string()];
    lines.extend(result.breakdown.iter().map(|f| format_factor(f, use_colors)));
    if let Some(top) = result.biggest_factor() {
        let text = format!("{} ({} pts)", top.label, top.magnitude());
        if use_colors {
            lines.push(format!("Biggest factor: {}", text.bold()));
        } else {
            lines.push(format!("Biggest factor: {}", text));
        }
    }
    lines
}

fn format_score_line(score: u8, use_colors: bool) -> String {
    let text = format!("{}/100", score);
    if use_colors {
        format!("Score: {}", text.bold())
    } else {
        format!("Score: {}", text)
    }
}

fn format_recommendation(recommendation: Recommendation, use_colors: bool) -> String {
    if !use_colors {
        return format!("Recommendation: {}", recommendation);
    }
    let label = recommendation.label();
    let colored = match recommendation {
        Recommendation::DoIt => label.green().bold().to_string(),
        Recommendation::Borderline => label.yellow().bold().to_string(),
        Recommendation::Delay => label.red().bold().to_string(),
    };
    format!("Recommendation: {}", colored)
}

/// Multi-line result of scoring a single decision
pub fn format_score_result(result: &ScoreResult, use_colors: bool) -> String {
    let mut lines = vec![
        format_score_line(result.score, use_colors),
        format_recommendation(result.recommendation, use_colors),
    ];
    lines.extend(format_breakdown(result, use_colors));
    lines.join("\n")
}

/// Both score sections of a comparison followed by the verdict
pub fn format_comparison(
    comparison: &Comparison,
    first_name: &str,
    second_name: &str,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();
    for (name, result) in [(first_name, &comparison.first), (second_name, &comparison.second)] {
        if use_colors {
            lines.push(format!("{}", name.cyan().bold()));
        } else {
            lines.push(name.to_string());
        }
        lines.push(format_score_line(result.score, use_colors));
        lines.extend(format_breakdown(result, use_colors));
        lines.push(String::new());
    }

    let verdict = comparison.describe(first_name, second_name);
    if use_colors {
        lines.push(format!("Recommendation: {}", verdict.bold()));
    } else {
        lines.push(format!("Recommendation: {}", verdict));
    }
    lines.join("\n")
}

/// Numbered one-line summaries, truncated to the terminal width
pub fn format_summary_list(entries: &[&String], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No journal entries found.".to_string();
    }

    let term_width = get_terminal_width();

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index_str = format!("{:>3}.", idx + 1);
            let summary = summarize(entry).to_string();
            let summary = match term_width {
                Some(width) if width > index_str.len() + 11 => {
                    truncate_title(&summary, width - index_str.len() - 1)
                }
                Some(_) => truncate_title(&summary, 20),
                None => summary,
            };

            if use_colors {
                format!("{} {}", index_str.dimmed(), summary)
            } else {
                format!("{} {}", index_str, summary)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full entry text separated by rules, newest first as given
pub fn format_full_entries(entries: &[&String], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No journal entries found.".to_string();
    }

    let rule = "-".repeat(40);
    entries
        .iter()
        .map(|entry| {
            if use_colors {
                let mut lines = entry.lines();
                let header = lines.next().unwrap_or_default();
                let rest: Vec<&str> = lines.collect();
                if rest.is_empty() {
                    header.bold().to_string()
                } else {
                    format!("{}\n{}", header.bold(), rest.join("\n"))
                }
            } else {
                entry.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&format!("\n{}\n", rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{RatingVector, ScoringEngine, WeightTable};

    fn example_result() -> ScoreResult {
        let engine = ScoringEngine::new(WeightTable::decision());
        let ratings = RatingVector::new([
            ("impact", 3),
            ("cost", 2),
            ("risk", 2),
            ("reversible", 2),
        ])
        .unwrap();
        engine.score(&ratings).unwrap()
    }

    #[test]
    fn test_format_score_result_plain() {
        // 60 - 30 - 30 + 20 = 20
        let output = format_score_result(&example_result(), false);
        assert_eq!(
            output,
            "Score: 20/100\n\
             Recommendation: Delay or rethink\n\
             Breakdown:\n  \
             + Impact (3/5) : 60 pts\n  \
             - Cost (2/5) : 30 pts\n  \
             - Risk (2/5) : 30 pts\n  \
             + Reversibility (2/5) : 20 pts\n\
             Biggest factor: Impact (60 pts)"
        );
    }

    #[test]
    fn test_format_comparison_tie_plain() {
        let engine = ScoringEngine::new(WeightTable::comparison());
        let ratings = RatingVector::new([
            ("urgency", 3),
            ("importance", 3),
            ("long_term_value", 3),
            ("effort", 3),
        ])
        .unwrap();
        let comparison = engine.compare(&ratings, &ratings).unwrap();

        let output = format_comparison(&comparison, "Task A", "Task B", false);
        assert!(output.starts_with("Task A\nScore: 36/100\n"));
        assert!(output.contains("\n\nTask B\nScore: 36/100\n"));
        assert!(output.ends_with("Recommendation: Tie at 36/100 - both options are equally strong, pick either"));
    }

    #[test]
    fn test_format_summary_list_empty() {
        assert_eq!(format_summary_list(&[], false), "No journal entries found.");
    }

    #[test]
    fn test_format_summary_list_numbers_entries() {
        let a = "[2024-01-02 09:00:00] NEW DECISION\nDecision: B".to_string();
        let b = "[2024-01-01 09:00:00] REFLECTION\nPast decision: A".to_string();
        let output = format_summary_list(&[&a, &b], false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1. [2024-01-02 09:00:00] NEW DECISION"));
        assert!(lines[1].starts_with("  2. [2024-01-01 09:00:00] REFLECTION"));
    }

    #[test]
    fn test_format_full_entries_plain() {
        let a = "[a] ONE\nx: 1".to_string();
        let b = "[b] TWO".to_string();
        let output = format_full_entries(&[&a, &b], false);
        assert_eq!(output, format!("[a] ONE\nx: 1\n{}\n[b] TWO", "-".repeat(40)));
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short", 10), "short");
        assert_eq!(truncate_title("a long decision title", 10), "a long ...");
        assert_eq!(truncate_title("abcdef", 3), "abc");
    }
}
