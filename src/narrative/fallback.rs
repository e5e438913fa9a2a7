//! Deterministic substitutes used when generation fails.

use regex::RegexBuilder;

use super::Statement;
use crate::game::GameMode;

/// Placeholder that replaces a redacted name.
pub const REDACTED: &str = "[REDACTED]";

pub(crate) const HINT: &str = "DEXTER: Signal interference. No lore data available.";
pub(crate) const QUESTION: &str = "Is it a legendary?";
pub(crate) const COMPARISON: &str = "Incorrect analysis. Target signature differs from your guess.";

pub(crate) fn briefing(mode: GameMode) -> String {
    format!("New {} signal detected. Commencing analysis.", mode.title())
}

pub(crate) fn true_false_set() -> Vec<Statement> {
    vec![
        Statement::new("This creature has at least one type.", false),
        Statement::new("This creature can breathe in outer space.", true),
        Statement::new("This creature appears in the regional catalog.", false),
    ]
}

/// Taunt used once a player keeps guessing wrong.
pub fn taunt(guess: &str) -> String {
    format!("MWAHAHA! WRONG! IT'S NOT {}!", guess.trim().to_uppercase())
}

/// Blanks every case-insensitive occurrence of `name` in `text`.
pub fn redact(text: &str, name: &str) -> String {
    if name.trim().is_empty() {
        return text.to_string();
    }
    match RegexBuilder::new(&regex::escape(name))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(text, REDACTED).into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Returns true if the set has exactly three statements, exactly one a lie.
pub fn is_valid_true_false_set(set: &[Statement]) -> bool {
    set.len() == 3
        && set.iter().filter(|s| s.is_lie).count() == 1
        && set.iter().all(|s| !s.statement.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_is_case_insensitive() {
        assert_eq!(
            redact("PIKACHU stores electricity. Pikachu is cute.", "Pikachu"),
            "[REDACTED] stores electricity. [REDACTED] is cute."
        );
    }

    #[test]
    fn redact_escapes_regex_metacharacters() {
        assert_eq!(redact("Mr. Mime mimes.", "Mr. Mime"), "[REDACTED] mimes.");
        assert_eq!(redact("Mr Mime", "Mr. Mime"), "Mr Mime");
    }

    #[test]
    fn canned_set_is_valid() {
        assert!(is_valid_true_false_set(&true_false_set()));
    }

    #[test]
    fn two_lies_is_invalid() {
        let set = vec![
            Statement::new("a", true),
            Statement::new("b", true),
            Statement::new("c", false),
        ];
        assert!(!is_valid_true_false_set(&set));
    }
}
