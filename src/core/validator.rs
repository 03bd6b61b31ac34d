use crate::domain::model::Msisdn;
use regex::Regex;
use std::sync::LazyLock;

/// Accepted national format: exactly 11 digits, `947` prefix, operator digit
/// from the allowed set, no separators or letters.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^947[01245678]\d{7}$").expect("phone pattern is valid"));

pub const INVALID_FORMAT_REASON: &str = "invalid phone number format";

/// Validates one raw phone-number string.
///
/// Pure and deterministic. Normalization is limited to trimming surrounding
/// whitespace, so the function is idempotent on its own output.
pub fn validate(raw: &str) -> Result<Msisdn, &'static str> {
    let trimmed = raw.trim();
    if PHONE_PATTERN.is_match(trimmed) {
        Ok(Msisdn::new_unchecked(trimmed.to_string()))
    } else {
        Err(INVALID_FORMAT_REASON)
    }
}
