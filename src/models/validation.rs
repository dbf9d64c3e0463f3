//! Shared field rules for form payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

/// CPF (11 digits) or CNPJ (14 digits), punctuation optional.
pub static TAX_DOCUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{3}\.?\d{3}\.?\d{3}-?\d{2}|\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})$")
        .expect("tax document regex is valid")
});

/// CNPJ only (14 digits), punctuation optional.
pub static CNPJ: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}$").expect("CNPJ regex is valid")
});

/// NF-e access key: 44 digits.
pub static NFE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{44}$").expect("NF-e key regex is valid"));

pub static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()-]{8,20}$").expect("phone regex is valid"));

/// Internal codes: letters, digits, dashes.
pub static CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]{1,32}$").expect("code regex is valid"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(error("positive_amount", "Value must be greater than zero"))
    }
}

pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(error("non_negative_amount", "Value cannot be negative"))
    } else {
        Ok(())
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("not_blank", "This field is required"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn documents() {
        assert!(TAX_DOCUMENT.is_match("123.456.789-09"));
        assert!(TAX_DOCUMENT.is_match("12345678909"));
        assert!(TAX_DOCUMENT.is_match("12.345.678/0001-95"));
        assert!(!TAX_DOCUMENT.is_match("1234"));
        assert!(CNPJ.is_match("12345678000195"));
        assert!(!CNPJ.is_match("123.456.789-09"));
    }

    #[test]
    fn nfe_key_is_44_digits() {
        assert!(NFE_KEY.is_match(&"3".repeat(44)));
        assert!(!NFE_KEY.is_match(&"3".repeat(43)));
        assert!(!NFE_KEY.is_match("NF-123"));
    }

    #[test]
    fn amounts() {
        assert!(positive_amount(&dec!(0.01)).is_ok());
        assert!(positive_amount(&dec!(0)).is_err());
        assert!(positive_amount(&dec!(-1)).is_err());
        assert!(non_negative_amount(&dec!(0)).is_ok());
        assert!(non_negative_amount(&dec!(-0.5)).is_err());
    }

    #[test]
    fn blank_strings() {
        assert!(not_blank("  ").is_err());
        assert!(not_blank("Acme").is_ok());
    }
}
