//! Structured validation errors (one message per field).

use std::collections::BTreeMap;

use serde::Serialize;

/// Field → message map produced by explicit `validate()` functions.
///
/// Only the first failure per field is kept, mirroring how input forms report
/// a single problem per field at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, msg);
        errors
    }

    /// Record a failure for `field` unless one is already recorded.
    pub fn add(&mut self, field: impl Into<String>, msg: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| msg.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, msg) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

/// Check that a required text field is present and at least `min_len` characters.
pub fn check_name(errors: &mut ValidationErrors, field: &str, label: &str, value: &str, min_len: usize) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} field is blank."));
    } else if value.trim().chars().count() < min_len {
        errors.add(field, format!("{label} is too short."));
    }
}

/// Check that a required text field is present.
pub fn check_present(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} field is blank."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Email field is blank.");
        errors.add("email", "Invalid email address.");
        assert_eq!(errors.get("email"), Some("Email field is blank."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn name_checks_blank_then_length() {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "firstname", "Firstname", "  ", 3);
        check_name(&mut errors, "lastname", "Lastname", "Al", 3);
        assert_eq!(errors.get("firstname"), Some("Firstname field is blank."));
        assert_eq!(errors.get("lastname"), Some("Lastname is too short."));
    }

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
