//! Проверки полей форм входа и регистрации до отправки на бэкенд.

use regex::Regex;

use crate::errors::AppError;

lazy_static::lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    /// Телефон после очистки: только цифры и `+`
    static ref CLEAN_PHONE_PATTERN: Regex = Regex::new(r"^[0-9+]{6,20}$").unwrap();
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Убирает пробелы, скобки и дефисы; `None`, если номер не похож на телефон
pub fn sanitize_phone(phone: &str) -> Option<String> {
    let cleaned = phone
        .chars()
        .filter(|c| matches!(c, '0'..='9' | '+'))
        .collect::<String>();
    CLEAN_PHONE_PATTERN.is_match(&cleaned).then_some(cleaned)
}

pub fn ensure_max_len(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// Обязательное непустое строковое поле
pub fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(validate_email("dispatch@productly.io"));
        assert!(validate_email("first.last+crew@field-ops.co.uk"));
        assert!(!validate_email("no-at-sign.io"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email(""));
    }

    #[test]
    fn phone_is_sanitized() {
        assert_eq!(sanitize_phone("+1 (555) 010-2030"), Some("+15550102030".to_string()));
        assert_eq!(sanitize_phone("12-34"), None);
    }

    #[test]
    fn required_fields() {
        assert_eq!(require_field(Some("  Ana "), "name").unwrap(), "Ana");
        let err = require_field(Some("   "), "name").unwrap_err();
        assert_eq!(err.to_string(), "name is required");
        assert!(require_field(None, "email").is_err());
    }

    #[test]
    fn max_len_counts_chars() {
        assert!(ensure_max_len("Zoë", 3));
        assert!(!ensure_max_len("abcd", 3));
    }
}
