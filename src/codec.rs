//! Account/Transfer Codec
//!
//! Conversion between ledger-native values and the string forms used on every
//! external surface. All conversions MUST go through this module.
//!
//! ## Wire Representation
//! - Identifiers and amounts are `u128`, encoded as lowercase hexadecimal
//!   without a prefix (`"1"`, `"64"`, `"18c6f1a2..."`). An optional `0x`
//!   prefix is accepted on input.
//! - Timestamps are `u64` nanoseconds since the Unix epoch, encoded as
//!   RFC 3339 UTC strings with nanosecond precision
//!   (`"2024-05-01T12:00:00.000000001Z"`).
//!
//! ## Usage
//! ```rust
//! use float_ledger::codec::{format_u128, parse_u128};
//!
//! let amount = parse_u128("amount", "64").unwrap();
//! assert_eq!(amount, 100);
//! assert_eq!(format_u128(amount), "64");
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Maximum number of hex digits in a 128-bit value
const MAX_HEX_DIGITS: usize = 32;

// ============================================================================
// Error Types
// ============================================================================

/// Codec errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is not a valid 128-bit hex value: '{value}'")]
    InvalidHex { field: &'static str, value: String },

    #[error("{field} must not be zero")]
    Zero { field: &'static str },

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("Timestamp before Unix epoch: '{0}'")]
    TimestampOutOfRange(String),
}

// ============================================================================
// 128-bit Values
// ============================================================================

/// Parse a hex string into a `u128`
///
/// `field` names the value in the error message.
pub fn parse_u128(field: &'static str, value: &str) -> Result<u128, CodecError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(CodecError::Empty { field });
    }

    let invalid = || CodecError::InvalidHex {
        field,
        value: value.to_string(),
    };

    // from_str_radix accepts a leading '+', the wire format does not
    if digits.len() > MAX_HEX_DIGITS || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    u128::from_str_radix(digits, 16).map_err(|_| invalid())
}

/// Parse a hex string into a non-zero `u128`
///
/// Ledger identifiers and transfer amounts are never zero.
pub fn parse_nonzero_u128(field: &'static str, value: &str) -> Result<u128, CodecError> {
    match parse_u128(field, value)? {
        0 => Err(CodecError::Zero { field }),
        v => Ok(v),
    }
}

/// Format a `u128` as canonical lowercase hex
#[inline]
pub fn format_u128(value: u128) -> String {
    format!("{:x}", value)
}

/// Re-encode a hex string in canonical form (`"0x0A"` → `"a"`)
pub fn canonical_u128(field: &'static str, value: &str) -> Result<String, CodecError> {
    parse_nonzero_u128(field, value).map(format_u128)
}

// ============================================================================
// Timestamps
// ============================================================================

/// Format ledger nanoseconds as an RFC 3339 string with nanosecond precision
pub fn format_timestamp(nanos: u64) -> String {
    let nanos = i64::try_from(nanos).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp_nanos(nanos).to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an RFC 3339 string into ledger nanoseconds
pub fn parse_timestamp(value: &str) -> Result<u64, CodecError> {
    let parsed = DateTime::parse_from_rfc3339(value.trim())
        .map_err(|_| CodecError::InvalidTimestamp(value.to_string()))?;

    let nanos = parsed
        .timestamp_nanos_opt()
        .ok_or_else(|| CodecError::TimestampOutOfRange(value.to_string()))?;

    u64::try_from(nanos).map_err(|_| CodecError::TimestampOutOfRange(value.to_string()))
}

/// Current wall-clock time in ledger nanoseconds
pub fn now_nanos() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// `#[serde(with = "hex_u128")]` for `u128` fields on the wire
pub mod hex_u128 {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_u128(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_u128("value", &s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u128_plain_and_prefixed() {
        assert_eq!(parse_u128("id", "1").unwrap(), 1);
        assert_eq!(parse_u128("id", "ff").unwrap(), 255);
        assert_eq!(parse_u128("id", "0xFF").unwrap(), 255);
        assert_eq!(parse_u128("id", " 64 ").unwrap(), 100);
    }

    #[test]
    fn test_parse_u128_max_width() {
        let max = "f".repeat(32);
        assert_eq!(parse_u128("id", &max).unwrap(), u128::MAX);

        let too_wide = "1".repeat(33);
        assert!(matches!(
            parse_u128("id", &too_wide),
            Err(CodecError::InvalidHex { field: "id", .. })
        ));
    }

    #[test]
    fn test_parse_u128_rejects_garbage() {
        assert_eq!(parse_u128("amount", ""), Err(CodecError::Empty { field: "amount" }));
        assert_eq!(parse_u128("amount", "0x"), Err(CodecError::Empty { field: "amount" }));
        assert!(parse_u128("amount", "+1").is_err());
        assert!(parse_u128("amount", "-1").is_err());
        assert!(parse_u128("amount", "12g4").is_err());
        assert!(parse_u128("amount", "1.5").is_err());
    }

    #[test]
    fn test_parse_nonzero() {
        assert_eq!(
            parse_nonzero_u128("amount", "0"),
            Err(CodecError::Zero { field: "amount" })
        );
        assert_eq!(parse_nonzero_u128("amount", "32").unwrap(), 50);
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonical_u128("user_id", "0x0A").unwrap(), "a");
        assert_eq!(canonical_u128("user_id", "000001").unwrap(), "1");
    }

    #[test]
    fn test_timestamp_nanosecond_precision() {
        let ts = 1_714_564_800_000_000_001u64;
        let s = format_timestamp(ts);
        assert_eq!(s, "2024-05-01T12:00:00.000000001Z");
        assert_eq!(parse_timestamp(&s).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_epoch_and_offsets() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000000000Z");
        assert_eq!(
            parse_timestamp("1970-01-01T01:00:00+01:00").unwrap(),
            0,
            "offsets are normalised to UTC"
        );
        assert!(matches!(
            parse_timestamp("1969-12-31T23:59:59Z"),
            Err(CodecError::TimestampOutOfRange(_))
        ));
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(CodecError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_hex_serde_helper() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(with = "hex_u128")]
            id: u128,
        }

        let json = serde_json::to_string(&Wrapper { id: 255 }).unwrap();
        assert_eq!(json, r#"{"id":"ff"}"#);
        let back: Wrapper = serde_json::from_str(r#"{"id":"0x10"}"#).unwrap();
        assert_eq!(back, Wrapper { id: 16 });
        assert!(serde_json::from_str::<Wrapper>(r#"{"id":"zz"}"#).is_err());
    }
}
