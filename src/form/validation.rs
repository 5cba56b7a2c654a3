use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use gpui::SharedString;
use regex::Regex;

use super::errors::ErrorEntry;

pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One rule attached to a field: a stable type tag, a message for display and
/// a pure predicate over the normalized value.
#[derive(Clone)]
pub struct Validator {
    kind: SharedString,
    message: SharedString,
    predicate: Predicate,
}

impl Validator {
    pub fn new(
        kind: impl Into<SharedString>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: SharedString::default(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn with_message(mut self, message: impl Into<SharedString>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> &SharedString {
        &self.kind
    }

    pub fn message(&self) -> &SharedString {
        &self.message
    }

    pub fn check(&self, value: &str) -> bool {
        (self.predicate)(value)
    }

    pub fn to_error(&self) -> ErrorEntry {
        ErrorEntry {
            kind: self.kind.clone(),
            message: self.message.clone(),
        }
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Runs every validator against `value`, in order, without stopping at the
/// first failure.
///
/// The result lists each failure in evaluation order. Callers that keep a
/// single error slot per field write these in sequence, so the last element
/// is the failure that ends up reported.
pub fn evaluate(value: &str, validators: &[Validator]) -> Vec<ErrorEntry> {
    validators
        .iter()
        .filter(|validator| !validator.check(value))
        .map(Validator::to_error)
        .collect()
}

pub fn required() -> Validator {
    Validator::new("required", |value| !value.is_empty())
}

pub fn email() -> Validator {
    Validator::new("email", |value| value.is_empty() || email_re().is_match(value))
}

/// Four-digit years from 1860 through 2023.
pub fn year() -> Validator {
    Validator::new("year", |value| value.is_empty() || year_re().is_match(value))
}

/// Two-digit months, `01` through `12`.
pub fn month() -> Validator {
    Validator::new("month", |value| value.is_empty() || month_re().is_match(value))
}

/// Two-digit days, `01` through `31`.
pub fn day() -> Validator {
    Validator::new("day", |value| value.is_empty() || day_re().is_match(value))
}

/// Passes when the value is strictly longer than `length` characters.
pub fn min_length(length: usize) -> Validator {
    Validator::new("minLength", move |value| value.chars().count() > length)
}

/// Passes when the value is strictly shorter than `length` characters.
pub fn max_length(length: usize) -> Validator {
    Validator::new("maxLength", move |value| value.chars().count() < length)
}

/// At least eight ASCII letters or digits, with one of each.
pub fn password_rule() -> Validator {
    Validator::new("passwordRule", |value| {
        value.len() >= 8
            && value.chars().all(|c| c.is_ascii_alphanumeric())
            && value.chars().any(|c| c.is_ascii_alphabetic())
            && value.chars().any(|c| c.is_ascii_digit())
    })
}

/// Equality against a value read at validation time, typically another
/// field of the same form (see `Form::value_source`).
pub fn password_match<F>(other: F) -> Validator
where
    F: Fn() -> SharedString + Send + Sync + 'static,
{
    Validator::new("passwordMatch", move |value| other().as_ref() == value)
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("email regex must compile")
    })
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(18[6-9][0-9]|19[0-9]{2}|20[01][0-9]|202[0-3])$")
            .expect("year regex must compile")
    })
}

fn month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0[1-9]|1[0-2])$").expect("month regex must compile"))
}

fn day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0[1-9]|[12][0-9]|3[01])$").expect("day regex must compile"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_reports_every_failure_in_order() {
        let validators = vec![
            Validator::new("a", |_| false).with_message("first"),
            Validator::new("b", |_| true),
            Validator::new("c", |_| false).with_message("third"),
        ];

        let failures = evaluate("anything", &validators);
        assert_eq!(
            failures,
            vec![ErrorEntry::new("a", "first"), ErrorEntry::new("c", "third")]
        );
    }

    #[test]
    fn format_rules_accept_empty_values() {
        for validator in [email(), year(), month(), day()] {
            assert!(validator.check(""), "{} should accept empty", validator.kind());
        }
        assert!(!required().check(""));
    }

    #[test]
    fn email_pattern() {
        let validator = email();
        assert!(validator.check("seyeon4199@gmail.com"));
        assert!(validator.check("First.Last+tag@Example.ORG"));
        assert!(!validator.check("invalid.com"));
        assert!(!validator.check("name@host"));
        assert!(!validator.check("name@host.c"));
        // Letters that only case-fold to ASCII.
        assert!(!validator.check("\u{17F}@example.com"));
        assert!(!validator.check("a@example.\u{212A}om"));
    }

    #[test]
    fn year_bounds_follow_pattern() {
        let validator = year();
        for accepted in ["1860", "1899", "1900", "1999", "2000", "2019", "2020", "2023"] {
            assert!(validator.check(accepted), "{accepted} should pass");
        }
        for rejected in ["1859", "2024", "2099", "999", "19999", "abcd", "１９９０"] {
            assert!(!validator.check(rejected), "{rejected} should fail");
        }
    }

    #[test]
    fn month_and_day_are_two_digit() {
        assert!(month().check("01"));
        assert!(month().check("12"));
        assert!(!month().check("1"));
        assert!(!month().check("13"));
        assert!(!month().check("00"));

        assert!(day().check("01"));
        assert!(day().check("29"));
        assert!(day().check("31"));
        assert!(!day().check("32"));
        assert!(!day().check("00"));
        assert!(!day().check("7"));
    }

    #[test]
    fn length_bounds_are_exclusive() {
        assert!(!min_length(3).check("abc"));
        assert!(min_length(3).check("abcd"));
        assert!(max_length(3).check("ab"));
        assert!(!max_length(3).check("abc"));
        assert!(max_length(3).check("한글"));
    }

    #[test]
    fn password_rule_requires_letters_and_digits() {
        let validator = password_rule();
        assert!(validator.check("Password123"));
        assert!(validator.check("abcdefg1"));
        assert!(!validator.check("abc123"));
        assert!(!validator.check("abcdefgh"));
        assert!(!validator.check("12345678"));
        assert!(!validator.check("Password 123"));
    }

    #[test]
    fn password_match_reads_the_other_value_lazily() {
        let validator = password_match(|| "Password123".into());
        assert!(validator.check("Password123"));
        assert!(!validator.check("password124"));
        assert_eq!(validator.kind().as_ref(), "passwordMatch");
    }
}
