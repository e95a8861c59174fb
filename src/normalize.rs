use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Shorter strings only match an option exactly; longer ones may match by containment.
pub const SUBSTRING_MATCH_MIN_CHARS: usize = 10;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

/// Canonical form of question text used as the deduplication key.
///
/// `\w` is Unicode-aware, so diacritics (ą, ę, ł, ...) survive; only
/// punctuation and symbols are removed.
pub fn normalize_key(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    collapse_whitespace(&stripped)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Drops empty entries and later duplicates (compared after trimming), keeping first-seen order.
pub fn dedupe_preserving_order<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::<String>::new();
    let mut unique = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() || seen.contains(trimmed) {
            continue;
        }
        seen.insert(trimmed.to_string());
        unique.push(trimmed.to_string());
    }
    unique
}

/// Loose equality between a stated correct answer and an offered option.
pub fn answers_match(stated: &str, option: &str) -> bool {
    let stated = stated.trim().to_lowercase();
    let option = option.trim().to_lowercase();
    if stated.is_empty() || option.is_empty() {
        return false;
    }
    if stated == option {
        return true;
    }

    (stated.chars().count() > SUBSTRING_MATCH_MIN_CHARS && option.contains(&stated))
        || (option.chars().count() > SUBSTRING_MATCH_MIN_CHARS && stated.contains(&option))
}
