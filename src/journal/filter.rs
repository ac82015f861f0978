/// Entries whose full text contains `keyword`, ignoring case, in journal order.
///
/// An empty keyword matches nothing; callers treat "no keyword" as "skip search".
///
/// The keyword is matched as typed, surrounding spaces included.
pub fn search<'a>(entries: &'a [String], keyword: &str) -> Vec<&'a String> {
    if keyword.trim().is_empty() {
        return Vec::new();
    }
    let needle = keyword.to_lowercase();

    entries
        .iter()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .collect()
}

/// Same rule as `search`, for a single entry.
pub fn matches(entry: &str, keyword: &str) -> bool {
    !keyword.trim().is_empty() && entry.to_lowercase().contains(&keyword.to_lowercase())
}

/// The last `n` entries, newest first. The slice itself is left as stored.
pub fn list_recent<'a, T>(entries: &'a [T], n: usize) -> Vec<&'a T> {
    let start = entries.len().saturating_sub(n);
    entries[start..].iter().rev().collect()
}
