/// Fallback variable checked when the configured one is unset
pub const FALLBACK_KEY_VAR: &str = "OPENAI_API_KEY";

/// Look up the scorer API key in `primary_var`, then in `OPENAI_API_KEY`.
/// Returns None if neither is set to a non-empty value.
pub fn get_api_key_from_env(primary_var: &str) -> Option<String> {
    lookup_api_key(primary_var, |name| std::env::var(name).ok())
}

fn lookup_api_key<F>(primary_var: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    [primary_var, FALLBACK_KEY_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}
