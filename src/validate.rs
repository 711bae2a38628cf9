//! Form validation helpers.

use thiserror::Error;

/// A validation failure, surfaced inline on the owning form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("invalid phone number")]
    InvalidPhone,
}

/// Check a Pakistani phone number.
///
/// Accepts mobile numbers (`03XX-XXXXXXX`, dash optional) and landlines
/// (`0XX-XXXXXXX` or `0XXX-XXXXXX`, dash optional).
pub fn is_valid_phone(phone: &str) -> bool {
    is_mobile(phone) || is_landline(phone)
}

fn is_mobile(phone: &str) -> bool {
    if !phone.is_ascii() {
        return false;
    }
    let digits = match split_dash(phone) {
        Some((prefix, rest)) => {
            if prefix.len() != 4 {
                return false;
            }
            (prefix, rest)
        }
        None => {
            if phone.len() != 11 {
                return false;
            }
            (&phone[..4], &phone[4..])
        }
    };
    let (prefix, rest) = digits;
    prefix.starts_with("03")
        && prefix.chars().all(|c| c.is_ascii_digit())
        && rest.len() == 7
        && rest.chars().all(|c| c.is_ascii_digit())
}

fn is_landline(phone: &str) -> bool {
    match split_dash(phone) {
        Some((prefix, rest)) => {
            prefix.starts_with('0')
                && (3..=4).contains(&prefix.len())
                && prefix.chars().all(|c| c.is_ascii_digit())
                && (6..=7).contains(&rest.len())
                && rest.chars().all(|c| c.is_ascii_digit())
        }
        None => {
            // Area code 2-3 digits after the leading zero, then 6-7 digits
            phone.starts_with('0')
                && (9..=11).contains(&phone.len())
                && phone.chars().all(|c| c.is_ascii_digit())
        }
    }
}

fn split_dash(phone: &str) -> Option<(&str, &str)> {
    let idx = phone.find('-')?;
    let (prefix, rest) = phone.split_at(idx);
    // Only one dash allowed
    let rest = &rest[1..];
    if rest.contains('-') {
        return None;
    }
    Some((prefix, rest))
}

/// Validate a customer form; returns the first error per field.
pub fn validate_customer(name: &str, phone: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(ValidationError::Required("name"));
    }
    if phone.trim().is_empty() {
        errors.push(ValidationError::Required("phone"));
    } else if !is_valid_phone(phone.trim()) {
        errors.push(ValidationError::InvalidPhone);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mobile_numbers() {
        assert!(is_valid_phone("0313-9003733"));
        assert!(is_valid_phone("03139003733"));
        assert!(is_valid_phone("0345-1234567"));
    }

    #[test]
    fn test_valid_landline_numbers() {
        assert!(is_valid_phone("051-1234567"));
        assert!(is_valid_phone("0423-123456"));
        assert!(is_valid_phone("0511234567"));
        // A 4-digit area code plus 6 digits is a landline shape even when
        // the code starts with 03
        assert!(is_valid_phone("0313-900373"));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("313-9003733"));
        assert!(!is_valid_phone("0313-90037"));
        assert!(!is_valid_phone("0313-90037333"));
        assert!(!is_valid_phone("0313-90037ab"));
        assert!(!is_valid_phone("1234567890"));
        assert!(!is_valid_phone("03-13-9003733"));
        assert!(!is_valid_phone("۰۳۱۳۹۰۰۳۷۳۳"));
    }

    #[test]
    fn test_validate_customer() {
        assert!(validate_customer("Ahmed", "0313-9003733").is_empty());
        assert_eq!(
            validate_customer("", "0313-9003733"),
            vec![ValidationError::Required("name")]
        );
        assert_eq!(
            validate_customer("Ahmed", "not-a-phone"),
            vec![ValidationError::InvalidPhone]
        );
        assert_eq!(
            validate_customer("Ahmed", "  "),
            vec![ValidationError::Required("phone")]
        );
    }
}
