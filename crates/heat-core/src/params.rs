//! Query parameter parsing and clamping.

use std::collections::HashMap;

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// Parse a raw query string (without the leading `?`) into parameters.
///
/// Later occurrences of a key overwrite earlier ones.
pub fn parse_query(qs: &str) -> QueryParams {
    let mut query = QueryParams::new();

    for pair in qs.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        query.insert(percent_decode(key), percent_decode(value));
    }

    query
}

/// Decode a `application/x-www-form-urlencoded` component.
///
/// Invalid escapes are kept verbatim; invalid UTF-8 is replaced.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Parse the leading integer of a string.
///
/// Leading whitespace is skipped, one optional sign is accepted, and the
/// longest run of decimal digits is taken; anything after it is ignored
/// (`"12abc"` parses as 12). Returns `None` when no digit is present.
/// Values beyond the `i64` range saturate.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;

    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        let digit = i64::from(b - b'0');
        value = value
            .saturating_mul(10)
            .saturating_add(if negative { -digit } else { digit });
    }

    seen.then_some(value)
}

/// Read an integer parameter, falling back to `default` when the key is
/// missing, empty, or not numeric.
pub fn int_param(query: &QueryParams, key: &str, default: i64) -> i64 {
    query
        .get(key)
        .and_then(|v| parse_int(v))
        .unwrap_or(default)
}

/// Read a string parameter, falling back to `default` when the key is
/// missing or empty.
pub fn str_param(query: &QueryParams, key: &str, default: &str) -> String {
    query
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Inclusive `[min, max]` range a parameter is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
}

impl Bounds {
    /// Create bounds. `min` must not exceed `max`.
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Bounds with only a lower limit.
    pub const fn at_least(min: i64) -> Self {
        Self { min, max: i64::MAX }
    }

    /// Constrain a value to these bounds.
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === parse_query Tests ===

    #[test]
    fn test_parse_query_pairs() {
        let query = parse_query("iter=1000&par=4&digest=sha256");

        assert_eq!(query.get("iter").map(String::as_str), Some("1000"));
        assert_eq!(query.get("par").map(String::as_str), Some("4"));
        assert_eq!(query.get("digest").map(String::as_str), Some("sha256"));
    }

    #[test]
    fn test_parse_query_empty() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("&&").is_empty());
    }

    #[test]
    fn test_parse_query_key_without_value() {
        let query = parse_query("n&limit=");

        assert_eq!(query.get("n").map(String::as_str), Some(""));
        assert_eq!(query.get("limit").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_query_last_value_wins() {
        let query = parse_query("n=100&n=200");

        assert_eq!(query.get("n").map(String::as_str), Some("200"));
    }

    // === percent_decode Tests ===

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("sha3%2D256"), "sha3-256");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("%E2%9C%93"), "\u{2713}");
    }

    #[test]
    fn test_percent_decode_invalid_escape_kept() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%4"), "%4");
    }

    // === parse_int Tests ===

    #[test]
    fn test_parse_int_plain() {
        assert_eq!(parse_int("300000"), Some(300_000));
        assert_eq!(parse_int("-5"), Some(-5));
        assert_eq!(parse_int("+7"), Some(7));
    }

    #[test]
    fn test_parse_int_leading_digits() {
        assert_eq!(parse_int("12abc"), Some(12));
        assert_eq!(parse_int("  42"), Some(42));
        assert_eq!(parse_int("1e5"), Some(1));
        assert_eq!(parse_int("3.9"), Some(3));
    }

    #[test]
    fn test_parse_int_rejects_non_numeric() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("--1"), None);
    }

    #[test]
    fn test_parse_int_saturates() {
        assert_eq!(parse_int("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int("-99999999999999999999999"), Some(i64::MIN));
    }

    // === int_param / str_param Tests ===

    #[test]
    fn test_int_param_defaults() {
        let query = parse_query("a=abc&b=&c=15");

        assert_eq!(int_param(&query, "a", 1), 1);
        assert_eq!(int_param(&query, "b", 2), 2);
        assert_eq!(int_param(&query, "c", 3), 15);
        assert_eq!(int_param(&query, "missing", 4), 4);
    }

    #[test]
    fn test_str_param_defaults() {
        let query = parse_query("digest=&other=sha1");

        assert_eq!(str_param(&query, "digest", "sha512"), "sha512");
        assert_eq!(str_param(&query, "other", "sha512"), "sha1");
        assert_eq!(str_param(&query, "missing", "sha512"), "sha512");
    }

    // === Bounds Tests ===

    #[test]
    fn test_bounds_clamp() {
        let bounds = Bounds::new(1, 16);

        assert_eq!(bounds.clamp(0), 1);
        assert_eq!(bounds.clamp(8), 8);
        assert_eq!(bounds.clamp(999), 16);
        assert_eq!(bounds.clamp(i64::MIN), 1);
    }

    #[test]
    fn test_bounds_at_least() {
        let bounds = Bounds::at_least(1);

        assert_eq!(bounds.clamp(-10), 1);
        assert_eq!(bounds.clamp(1), 1);
        assert_eq!(bounds.clamp(i64::MAX), i64::MAX);
    }
}
