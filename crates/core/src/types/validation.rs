//! Per-field validation reports.
//!
//! Request bodies are checked field by field and every problem is collected
//! before anything is rejected, so a client sending `{}` to create a user
//! learns about `name`, `address` and `email` in a single response.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Message used when a required field is absent or `null`.
pub const MISSING_FIELD: &str = "Missing data for required field.";

/// Validation failures keyed by field name.
///
/// Serializes as `{"field": ["reason", ...]}` with fields in alphabetical
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with `field`.
    pub fn add(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.entry(field).or_default().push(reason.into());
    }

    /// Record that a required field was not supplied.
    pub fn missing(&mut self, field: &'static str) {
        self.add(field, MISSING_FIELD);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reasons recorded against `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Names of every field with at least one problem.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// Check a required, length-limited text field.
    ///
    /// Returns the trimmed value when it is present, non-blank and at most
    /// `max` characters; otherwise records the problem and returns `None`.
    pub fn require_text(
        &mut self,
        field: &'static str,
        value: Option<String>,
        max: usize,
    ) -> Option<String> {
        let Some(value) = value else {
            self.missing(field);
            return None;
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, "Field cannot be blank.");
            return None;
        }
        if trimmed.chars().count() > max {
            self.add(field, format!("Longer than maximum length {max}."));
            return None;
        }
        Some(trimmed.to_owned())
    }

    /// Turn a finished value into `Ok` unless problems were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed validation.
    pub fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid fields: ")?;
        let mut first = true;
        for (field, reasons) in &self.0 {
            for reason in reasons {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {reason}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_field() {
        let mut errors = FieldErrors::new();
        errors.missing("name");
        errors.add("email", "bad");
        errors.add("email", "worse");

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "name"]);
        assert_eq!(errors.get("email").unwrap().len(), 2);
        assert_eq!(errors.get("name").unwrap(), [MISSING_FIELD]);
    }

    #[test]
    fn test_require_text() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            errors.require_text("name", Some("  Ann ".into()), 50),
            Some("Ann".to_owned())
        );
        assert!(errors.is_empty());

        assert_eq!(errors.require_text("name", None, 50), None);
        assert_eq!(errors.require_text("address", Some("   ".into()), 50), None);
        assert_eq!(errors.require_text("email", Some("abcdef".into()), 5), None);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["address", "email", "name"]
        );
    }

    #[test]
    fn test_serializes_as_map() {
        let mut errors = FieldErrors::new();
        errors.missing("price");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "price": [MISSING_FIELD] }));
    }

    #[test]
    fn test_finish() {
        let ok: Result<u8, _> = FieldErrors::new().finish(|| Some(1));
        assert_eq!(ok.unwrap(), 1);

        let mut errors = FieldErrors::new();
        errors.missing("user_id");
        let err = errors.finish(|| Some(1)).unwrap_err();
        assert_eq!(err.to_string(), format!("invalid fields: user_id: {MISSING_FIELD}"));
    }
}
