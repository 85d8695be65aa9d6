//! Client-side form validation.
//!
//! Validation runs before any request is built. A rejected form yields
//! [`FieldErrors`] keyed by field name so views can render inline messages.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{ClaimFeedbackPayload, FeedbackDecision, LoginPayload};

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Message for one field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

fn ratio_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(0(\.\d+)?|1(\.0+)?)$").expect("ratio pattern is a valid regex")
    })
}

/// Minimum password length accepted by the login form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Raw login form input.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validate the form and build the login payload.
    pub fn validate(&self) -> Result<LoginPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self.email.trim();

        if email.is_empty() {
            errors.add("email", "Email is required");
        } else if !email_pattern().is_match(email) {
            errors.add("email", "Please enter a valid email address");
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "Password must be at least 6 characters");
        }

        errors.into_result(|| LoginPayload {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Raw auditor feedback form input.
#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    /// One of `approved`, `partial`, `rejected`; empty when nothing was picked.
    pub decision: String,
    /// Ratio in `[0, 1]` as typed, or empty.
    pub correction_ratio: String,
    pub notes: String,
}

impl FeedbackForm {
    pub fn new(decision: impl Into<String>) -> Self {
        Self {
            decision: decision.into(),
            ..Self::default()
        }
    }

    pub fn with_correction_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.correction_ratio = ratio.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Validate the form and build the feedback payload.
    pub fn validate(&self) -> Result<ClaimFeedbackPayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let decision = self.decision.trim().parse::<FeedbackDecision>().ok();
        if decision.is_none() {
            errors.add("decision", "Silakan pilih keputusan");
        }

        let ratio_raw = self.correction_ratio.trim();
        let mut correction_ratio = None;
        if !ratio_raw.is_empty() {
            if ratio_pattern().is_match(ratio_raw) {
                correction_ratio = ratio_raw.parse::<f64>().ok();
            } else {
                errors.add("correction_ratio", "Correction ratio harus antara 0 dan 1");
            }
        }

        let notes = Some(self.notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        match decision {
            Some(decision) if errors.is_empty() => Ok(ClaimFeedbackPayload {
                decision,
                correction_ratio,
                notes,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_valid_email() {
        let errors = LoginForm::new("not-an-email", "secret123")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.get("email"),
            Some("Please enter a valid email address")
        );
        assert!(errors.get("password").is_none());
    }

    #[test]
    fn test_login_short_password() {
        let errors = LoginForm::new("auditor@casemind.ai", "12345")
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_login_trims_email() {
        let payload = LoginForm::new("  auditor@casemind.ai ", "secret1")
            .validate()
            .unwrap();
        assert_eq!(payload.email, "auditor@casemind.ai");
    }

    #[test]
    fn test_feedback_requires_decision() {
        let errors = FeedbackForm::default().validate().unwrap_err();
        assert_eq!(errors.get("decision"), Some("Silakan pilih keputusan"));
    }

    #[test]
    fn test_feedback_ratio_bounds() {
        for ok in ["0", "0.35", "1", "1.0", "1.000"] {
            let payload = FeedbackForm::new("partial")
                .with_correction_ratio(ok)
                .validate()
                .unwrap();
            assert!(payload.correction_ratio.is_some(), "{ok} should be accepted");
        }
        for bad in ["1.5", "-0.1", "abc", ".5", "2"] {
            let errors = FeedbackForm::new("partial")
                .with_correction_ratio(bad)
                .validate()
                .unwrap_err();
            assert!(errors.get("correction_ratio").is_some(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_feedback_blank_fields_are_omitted() {
        let payload = FeedbackForm::new("approved")
            .with_notes("   ")
            .validate()
            .unwrap();
        assert_eq!(payload.decision, FeedbackDecision::Approved);
        assert!(payload.correction_ratio.is_none());
        assert!(payload.notes.is_none());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("b", "second");
        errors.add("a", "first");
        errors.add("a", "ignored");
        assert_eq!(errors.to_string(), "a: first; b: second");
    }
}
