//! Strict query-string parsing.
//!
//! `form_urlencoded` decodes leniently; the overlay step must instead know
//! when a query string is malformed so it can skip the overlay entirely.
//! Segments are therefore checked before decoding.

use crate::error::QueryError;
use crate::values::FormValues;

/// Parse an `application/x-www-form-urlencoded` query string (without the
/// leading `?`).
///
/// Empty segments are ignored. A `;` anywhere in a segment, or a `%` not
/// followed by two hex digits, fails the whole parse.
pub fn parse_query(raw: &str) -> Result<FormValues, QueryError> {
    let mut values = FormValues::new();
    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            return Err(QueryError::Semicolon);
        }
        check_escapes(segment)?;
        for (key, value) in form_urlencoded::parse(segment.as_bytes()) {
            values.add(key.into_owned(), value.into_owned());
        }
    }
    Ok(values)
}

fn check_escapes(segment: &str) -> Result<(), QueryError> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(QueryError::InvalidEscape(segment.to_string()));
        }
        i += 3;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_keep_order() {
        let values = parse_query("a=1&b=2&a=3").unwrap();
        assert_eq!(
            values.get_all("a"),
            Some(&["1".to_string(), "3".to_string()][..])
        );
        assert_eq!(values.get("b"), Some("2"));
    }

    #[test]
    fn decodes_plus_and_percent() {
        let values = parse_query("q=hello+world&e=caf%C3%A9").unwrap();
        assert_eq!(values.get("q"), Some("hello world"));
        assert_eq!(values.get("e"), Some("café"));
    }

    #[test]
    fn key_without_value_is_empty_string() {
        let values = parse_query("flag").unwrap();
        assert_eq!(values.get("flag"), Some(""));
    }

    #[test]
    fn empty_segments_are_ignored() {
        let values = parse_query("&&a=1&").unwrap();
        assert_eq!(values.len(), 1);
        assert!(parse_query("").unwrap().is_empty());
    }

    #[test]
    fn bad_escape_fails() {
        assert_eq!(
            parse_query("a=%zz"),
            Err(QueryError::InvalidEscape("a=%zz".to_string()))
        );
        assert!(parse_query("a=%4").is_err());
    }

    #[test]
    fn semicolon_fails() {
        assert_eq!(parse_query("a=1;b=2"), Err(QueryError::Semicolon));
    }
}
