//! Contact-number normalization and validation.
//!
//! The backend matches agents by the exact stored contact number, so every
//! number has to be canonicalized to `+94XXXXXXXXX` form before it goes
//! over the wire.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    /// A fully-normalized Sri Lankan mobile number: +94 then nine digits.
    static ref CONTACT_NO_REGEX: Regex = Regex::new(r"^\+94\d{9}$").unwrap();
}

/// Canonicalize a raw mobile-number entry to `+94XXXXXXXXX` form.
///
/// Everything except digits is stripped, keeping at most a single leading
/// `+`. A leading `0` is the domestic trunk prefix and is replaced by
/// `+94`; input already carrying the `+94` prefix passes through
/// unchanged; anything else gets `+94` prepended to its digits.
pub fn normalize_contact_no(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && cleaned.is_empty()) {
            cleaned.push(c);
        }
    }

    if cleaned.starts_with("+94") {
        return cleaned;
    }
    if let Some(rest) = cleaned.strip_prefix('0') {
        return format!("+94{rest}");
    }
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    format!("+94{digits}")
}

/// Reject inputs that cannot be a Sri Lankan mobile number, before any
/// network call is made.
pub fn validate_contact_no(normalized: &str) -> Result<()> {
    if CONTACT_NO_REGEX.is_match(normalized) {
        Ok(())
    } else {
        Err(Error::validation(
            "Mobile number must be nine digits after the +94 country code",
        ))
    }
}
