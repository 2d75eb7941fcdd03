//! Keyword classifier for free-text replies.

/// Coarse reading of a reply to a yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Affirmative,
    Negative,
    /// Neither keyword family matched.
    Unclear,
}

const AFFIRMATIVE: &[&str] = &["yes", "ready", "sure"];
const NEGATIVE: &[&str] = &["no", "not"];

/// Case-insensitive substring match. Affirmative keywords win over negative
/// ones when both occur.
pub fn classify(input: &str) -> Intent {
    let lower = input.to_lowercase();
    if AFFIRMATIVE.iter().any(|k| lower.contains(k)) {
        Intent::Affirmative
    } else if NEGATIVE.iter().any(|k| lower.contains(k)) {
        Intent::Negative
    } else {
        Intent::Unclear
    }
}
