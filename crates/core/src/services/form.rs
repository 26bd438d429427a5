//! Form field coercion and contact normalization.
//!
//! Registration forms arrive as flat string maps. Optional fields are never an
//! error: numbers fall back to 0, flags to false, JSON to an empty value.

use std::collections::HashMap;

use marketplace_common::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use validator::ValidateEmail;

static BARE_MOBILE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"^[0-9]{10}$"));

/// Text fields of a submitted form. The last value wins for repeated names.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    fields: HashMap<String, String>,
}

impl FormFields {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Trimmed value, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Untrimmed value, empty when absent. For secrets.
    #[must_use]
    pub fn raw(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Trimmed value, `None` when absent or blank.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    /// First non-blank value among `names`.
    #[must_use]
    pub fn first_of(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.optional(name))
    }

    /// Value with a default for absent or blank fields.
    #[must_use]
    pub fn text_or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    /// Integer value, 0 when absent or unparseable.
    #[must_use]
    pub fn number(&self, name: &str) -> i32 {
        self.text(name).parse().unwrap_or(0)
    }

    /// Only the literal `"true"` is true.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.text(name) == "true"
    }

    /// JSON-encoded array, empty when absent, malformed, or not an array.
    #[must_use]
    pub fn json_list(&self, name: &str) -> Vec<Value> {
        match serde_json::from_str(&self.text(name)) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }

    /// JSON-encoded array of strings. Non-string entries are dropped.
    #[must_use]
    pub fn string_list(&self, name: &str) -> Vec<String> {
        self.json_list(name)
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// Trim and lowercase an email, rejecting blank or malformed input.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !email.validate_email() {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}

/// Normalize an Indian mobile number.
///
/// A leading 0 is dropped and a bare 10-digit number gets the `+91` prefix.
/// Anything else is returned trimmed.
#[must_use]
pub fn normalize_mobile(mobile: &str) -> String {
    let trimmed = mobile.trim();
    let national = trimmed.strip_prefix('0').unwrap_or(trimmed);
    let is_bare = BARE_MOBILE
        .as_ref()
        .is_ok_and(|re| re.is_match(national));
    if is_bare {
        format!("+91{national}")
    } else {
        trimmed.to_string()
    }
}

/// Split a full name into first word and remainder.
#[must_use]
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormFields {
        [
            ("businessName", "  Rao Traders "),
            ("numberOfPartners", "3"),
            ("numberOfDirectors", "three"),
            ("termsAccepted", "true"),
            ("isAgreementUploaded", "TRUE"),
            ("partners", r#"[{"name":"A"},{"name":"B"}]"#),
            ("directors", "[not json"),
            ("storeCategories", r#"["Decor", 4, " ", "Lamps"]"#),
            ("blank", "   "),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let form = form();
        assert_eq!(form.text("businessName"), "Rao Traders");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.optional("blank"), None);
        assert_eq!(form.text_or("listedStatus", "NO"), "NO");
    }

    #[test]
    fn test_first_of_skips_blank() {
        let form = form();
        assert_eq!(
            form.first_of(&["blank", "businessName"]).as_deref(),
            Some("Rao Traders")
        );
        assert_eq!(form.first_of(&["blank", "missing"]), None);
    }

    #[test]
    fn test_number_falls_back_to_zero() {
        let form = form();
        assert_eq!(form.number("numberOfPartners"), 3);
        assert_eq!(form.number("numberOfDirectors"), 0);
        assert_eq!(form.number("missing"), 0);
    }

    #[test]
    fn test_flag_is_literal_true() {
        let form = form();
        assert!(form.flag("termsAccepted"));
        assert!(!form.flag("isAgreementUploaded"));
        assert!(!form.flag("missing"));
    }

    #[test]
    fn test_json_lists_never_fail() {
        let form = form();
        assert_eq!(form.json_list("partners").len(), 2);
        assert!(form.json_list("directors").is_empty());
        assert!(form.json_list("businessName").is_empty());
        assert_eq!(form.string_list("storeCategories"), vec!["Decor", "Lamps"]);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Asha@Example.COM ").ok().as_deref(),
            Some("asha@example.com")
        );
        assert!(matches!(normalize_email(" "), Err(AppError::Validation(_))));
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_mobile() {
        assert_eq!(normalize_mobile("9876543210"), "+919876543210");
        assert_eq!(normalize_mobile("09876543210"), "+919876543210");
        assert_eq!(normalize_mobile("+919876543210"), "+919876543210");
        assert_eq!(normalize_mobile(" 12345 "), "12345");
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("Asha  Devi Rao"),
            ("Asha".to_string(), "Devi Rao".to_string())
        );
        assert_eq!(split_full_name("Asha"), ("Asha".to_string(), String::new()));
    }
}
