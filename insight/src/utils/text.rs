use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("Invalid token regex"));

/// Lower-cases `value`, spells out `%` as "percent" and splits it into
/// maximal alphanumeric runs.
pub fn tokenize(value: &str) -> HashSet<String> {
    let normalized = value.replace('%', "percent").to_lowercase();
    TOKEN_REGEX
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// |a ∩ b| / |a ∪ b|, or 0.0 when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let overlap = a.intersection(b).count();
    let union = a.union(b).count();
    overlap as f64 / union as f64
}

/// Joins labels as "A, B & C", skipping empty parts.
pub fn human_join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<S> = parts
        .into_iter()
        .filter(|part| !part.as_ref().is_empty())
        .collect();
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.as_ref().to_string(),
        Some((last, rest)) => {
            let head: Vec<&str> = rest.iter().map(|part| part.as_ref()).collect();
            format!("{} & {}", head.join(", "), last.as_ref())
        }
    }
}
