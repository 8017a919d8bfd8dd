//! Shared helpers: identifiers, time formatting, list expansion and validators

use crate::error::{ProviderError, Result};
use crate::schema::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-wide counter behind [`unique_resource_id`]
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of the form `<prefix><YYYYMMDDhhmmssNNNNNN><counter:05>`
pub fn unique_resource_id(prefix: &str) -> String {
    let counter = ID_COUNTER.fetch_add(1, Ordering::SeqCst) + 1;
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%6f");
    format!("{prefix}{timestamp}{counter:05}")
}

/// RFC 3339 with nanoseconds; trailing zero fractions are dropped
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let formatted = ts.to_rfc3339_opts(SecondsFormat::Nanos, true);
    match formatted.split_once('.') {
        Some((seconds, fraction)) => {
            let digits = fraction.trim_end_matches('Z').trim_end_matches('0');
            if digits.is_empty() {
                format!("{seconds}Z")
            } else {
                format!("{seconds}.{digits}Z")
            }
        }
        None => formatted,
    }
}

/// Optional timestamp as an attribute value; unset timestamps become ""
pub fn timestamp_value(ts: Option<&DateTime<Utc>>) -> AttributeValue {
    AttributeValue::String(ts.map(format_timestamp).unwrap_or_default())
}

/// Collect the strings of an untyped sequence, skipping non-strings
pub fn expand_string_list(items: &[AttributeValue]) -> Vec<String> {
    items
        .iter()
        .filter_map(AttributeValue::as_str)
        .map(str::to_string)
        .collect()
}

/// Like [`expand_string_list`] but drops empty strings
pub fn expand_non_empty_string_list(items: &[AttributeValue]) -> Vec<String> {
    expand_string_list(items)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
}

/// CIDR list expansion; an empty entry is *Malformed*
pub fn expand_cidr_list(attribute: &str, items: &[AttributeValue]) -> Result<Vec<String>> {
    let ranges = expand_string_list(items);
    if ranges.iter().any(String::is_empty) {
        return Err(ProviderError::malformed(attribute, "cidr range cannot be empty"));
    }
    Ok(ranges)
}

/// Retention period in hours as a duration; negative hours count as none
pub fn retention_period(attribute: &str, hours: i64) -> Result<Duration> {
    hours
        .max(0)
        .unsigned_abs()
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| ProviderError::malformed(attribute, format!("{hours} hours is out of range")))
}

/// Narrow a configured integer to the 32-bit field the service expects
pub fn expand_int32(attribute: &str, value: i64) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| ProviderError::malformed(attribute, format!("{value} does not fit in 32 bits")))
}

/// Stable identifier of a list-returning lookup: SHA-256 over the concatenated item ids
pub fn hash_ids<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Day count used for backup auto-deletion
pub fn validate_day_range(days: i64) -> std::result::Result<(), String> {
    if (1..=31).contains(&days) {
        Ok(())
    } else {
        Err(format!("auto_deleted_at must be within range 1-31, got {days}"))
    }
}

pub fn validate_cidr(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("cidr range cannot be empty".to_string());
    }
    let Some((addr, prefix)) = value.split_once('/') else {
        return Err(format!("{value:?} is not a valid CIDR range"));
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return Err(format!("{value:?} is not a valid CIDR range"));
    };
    let max_prefix = if addr.is_ipv4() { 32 } else { 128 };
    match prefix.parse::<u8>() {
        Ok(p) if p <= max_prefix => Ok(()),
        _ => Err(format!("{value:?} has an invalid prefix length")),
    }
}

pub fn validate_email(value: &str) -> std::result::Result<(), String> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("{value:?} is not a valid email address"))
    }
}

// =============================================================================
// Schema validators
// =============================================================================

fn each_string(value: &AttributeValue, check: fn(&str) -> std::result::Result<(), String>) -> Vec<String> {
    match value {
        AttributeValue::String(s) => check(s).err().into_iter().collect(),
        AttributeValue::List(items) => items
            .iter()
            .filter_map(AttributeValue::as_str)
            .filter_map(|s| check(s).err())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn cidr_validator(value: &AttributeValue) -> Vec<String> {
    each_string(value, validate_cidr)
}

pub fn email_validator(value: &AttributeValue) -> Vec<String> {
    each_string(value, validate_email)
}

/// Zero disables auto-deletion and is accepted here
pub fn optional_day_range_validator(value: &AttributeValue) -> Vec<String> {
    match value.as_int() {
        Some(0) | None => Vec::new(),
        Some(days) => validate_day_range(days).err().into_iter().collect(),
    }
}

/// Validator accepting only the listed string values
#[macro_export]
macro_rules! one_of {
    ($($allowed:expr),+ $(,)?) => {{
        fn check(value: &$crate::schema::AttributeValue) -> Vec<String> {
            const ALLOWED: &[&str] = &[$($allowed),+];
            match value.as_str() {
                Some(s) if ALLOWED.contains(&s) => Vec::new(),
                Some(s) => vec![format!("expected one of {:?}, got {:?}", ALLOWED, s)],
                None => Vec::new(),
            }
        }
        check as $crate::schema::ValidateFn
    }};
}

/// Validator accepting integers within an inclusive range
#[macro_export]
macro_rules! in_range {
    ($min:expr, $max:expr) => {{
        fn check(value: &$crate::schema::AttributeValue) -> Vec<String> {
            match value.as_int() {
                Some(n) if !($min..=$max).contains(&n) => {
                    vec![format!("expected a value within {}-{}, got {}", $min, $max, n)]
                }
                _ => Vec::new(),
            }
        }
        check as $crate::schema::ValidateFn
    }};
}
