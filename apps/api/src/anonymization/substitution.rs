//! Whole-word, single-pass term substitution.
//!
//! All terms go into one alternation so every character of the input is
//! rewritten at most once: text inserted for one term is never re-scanned for
//! another. The regex engine is leftmost-first, so callers order terms
//! longest-first to make a longer overlapping term win at the same position.

use regex::{Captures, Regex, RegexBuilder};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escapes `term` and anchors it on word boundaries. A boundary is only
/// emitted on a side whose edge character is itself a word character, so
/// terms like `at&t` or `inc.` still match.
pub fn bounded(term: &str) -> String {
    let mut pattern = String::new();
    if term.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(term));
    if term.chars().last().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Builds one matcher over `terms`, keeping the caller's order.
/// Returns `None` when there is nothing to match.
pub fn alternation<'a, I>(terms: I, case_insensitive: bool) -> Result<Option<Regex>, regex::Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let alternatives: Vec<String> = terms
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(|t| format!("(?:{})", bounded(t)))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(case_insensitive)
        .build()
        .map(Some)
}

/// Replaces every match with `lookup(matched)`; unmatched lookups keep the
/// original text.
pub fn replace_terms<'a, F>(text: &str, matcher: &Regex, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    matcher
        .replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            lookup(matched).unwrap_or(matched).to_string()
        })
        .into_owned()
}

/// Orders terms longest-first (by characters), stable on ties.
pub fn longest_first(terms: &mut [&str]) {
    terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
}
