//! Parse the `ranged_request_bytes` directive.

use super::ByteRange;
use crate::locator::query_value;
use std::fmt;
use url::Url;

/// Query parameter carrying the caller's byte range directive.
pub const RANGE_DIRECTIVE_PARAM: &str = "ranged_request_bytes";

/// Why a range directive was rejected. Never fatal: the caller downloads the
/// whole file instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
    pub directive: String,
    pub kind: RangeErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeErrorKind {
    /// Splitting on `-` did not give exactly two parts.
    WrongPartCount(usize),
    /// Start part is not a base-10 integer.
    BadStart,
    /// End part is non-empty and not a base-10 integer.
    BadEnd,
    /// End is not strictly greater than start.
    EndNotAfterStart,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid byte range {:?} provided; ", self.directive)?;
        match self.kind {
            RangeErrorKind::WrongPartCount(n) => {
                write!(f, "expected start-end, got {} part(s)", n)
            }
            RangeErrorKind::BadStart => write!(f, "could not convert start byte to an integer"),
            RangeErrorKind::BadEnd => write!(f, "could not convert finish byte to an integer"),
            RangeErrorKind::EndNotAfterStart => {
                write!(f, "finish byte must be bigger than start byte")
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// Reads the range directive from `url`.
///
/// - `Ok(None)`: no directive (parameter absent or empty)
/// - `Ok(Some(range))`: valid directive
/// - `Err(_)`: directive present but invalid
pub fn range_from_url(url: &Url) -> Result<Option<ByteRange>, RangeError> {
    match query_value(url, RANGE_DIRECTIVE_PARAM) {
        Some(v) if !v.is_empty() => parse_directive(&v).map(Some),
        _ => Ok(None),
    }
}

/// Parses `start-end` or `start-`.
pub fn parse_directive(directive: &str) -> Result<ByteRange, RangeError> {
    let err = |kind| RangeError {
        directive: directive.to_string(),
        kind,
    };

    let parts: Vec<&str> = directive.split('-').collect();
    let [start, end] = parts.as_slice() else {
        return Err(err(RangeErrorKind::WrongPartCount(parts.len())));
    };

    let start: u64 = parse_int(start).ok_or_else(|| err(RangeErrorKind::BadStart))?;
    let end = if end.is_empty() {
        None
    } else {
        let end: u64 = parse_int(end).ok_or_else(|| err(RangeErrorKind::BadEnd))?;
        if end <= start {
            return Err(err(RangeErrorKind::EndNotAfterStart));
        }
        Some(end)
    };

    Ok(ByteRange { start, end })
}

/// Base-10 integer with an optional leading `+`.
fn parse_int(s: &str) -> Option<u64> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn start_and_end() {
        assert_eq!(
            parse_directive("5555-66666"),
            Ok(ByteRange {
                start: 5555,
                end: Some(66666)
            })
        );
    }

    #[test]
    fn open_end() {
        assert_eq!(
            parse_directive("5555-"),
            Ok(ByteRange {
                start: 5555,
                end: None
            })
        );
    }

    #[test]
    fn non_numeric_start() {
        assert_eq!(parse_directive("abc-10").unwrap_err().kind, RangeErrorKind::BadStart);
        assert_eq!(parse_directive("-10").unwrap_err().kind, RangeErrorKind::BadStart);
        assert_eq!(parse_directive("+-10").unwrap_err().kind, RangeErrorKind::BadStart);
        assert_eq!(parse_directive("++5-10").unwrap_err().kind, RangeErrorKind::BadStart);
    }

    #[test]
    fn explicit_plus_sign() {
        assert_eq!(
            parse_directive("+5-+10"),
            Ok(ByteRange {
                start: 5,
                end: Some(10)
            })
        );
        assert_eq!(
            parse_directive("+5-"),
            Ok(ByteRange {
                start: 5,
                end: None
            })
        );
    }

    #[test]
    fn non_numeric_end() {
        assert_eq!(parse_directive("10-xyz").unwrap_err().kind, RangeErrorKind::BadEnd);
    }

    #[test]
    fn end_not_after_start() {
        assert_eq!(
            parse_directive("10-5").unwrap_err().kind,
            RangeErrorKind::EndNotAfterStart
        );
        assert_eq!(
            parse_directive("10-10").unwrap_err().kind,
            RangeErrorKind::EndNotAfterStart
        );
    }

    #[test]
    fn wrong_part_count() {
        assert_eq!(
            parse_directive("100").unwrap_err().kind,
            RangeErrorKind::WrongPartCount(1)
        );
        assert_eq!(
            parse_directive("1-2-3").unwrap_err().kind,
            RangeErrorKind::WrongPartCount(3)
        );
    }

    #[test]
    fn from_url() {
        assert_eq!(
            range_from_url(&url("http://my/file.iso?ranged_request_bytes=5555-66666")),
            Ok(Some(ByteRange {
                start: 5555,
                end: Some(66666)
            }))
        );
        assert_eq!(range_from_url(&url("http://my/file.iso")), Ok(None));
        assert_eq!(
            range_from_url(&url("http://my/file.iso?ranged_request_bytes=")),
            Ok(None)
        );
        assert!(range_from_url(&url("http://my/file.iso?ranged_request_bytes=abc-10")).is_err());
    }

    #[test]
    fn error_message_names_directive() {
        let msg = parse_directive("10-5").unwrap_err().to_string();
        assert!(msg.contains("\"10-5\""));
        assert!(msg.contains("bigger than start"));
    }
}
