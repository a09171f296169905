//! Context-aware percent-encoding for request URIs.
//!
//! Two profiles exist: the *path* profile used for resource path segments,
//! and the *query value* profile used for the right-hand side of
//! `name=value` query pairs. The same character can be
//! structural in one and literal in the other (`$count` stays bare as a path
//! segment but becomes `%24count` inside `$filter`).
//!
//! Each profile is exposed both as a per-character predicate and as a string
//! encoder backed by an [`AsciiSet`]. Non-ASCII characters are always escaped
//! as their UTF-8 bytes.

use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped inside a path segment.
///
/// Everything outside RFC 3986 `pchar`, plus `%` itself: sub-delims, `:` and
/// `@` pass through, so `$count`, `(`, `)`, `'`, `,` and `=` stay bare.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped inside a query option value: all but `unreserved`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Returns true if `c` must be percent-encoded inside a path segment.
#[must_use]
pub const fn escapes_in_path(c: char) -> bool {
    if !c.is_ascii() || c.is_ascii_control() {
        return true;
    }
    matches!(
        c,
        ' ' | '"' | '#' | '%' | '/' | '<' | '>' | '?' | '[' | '\\' | ']' | '^' | '`' | '{' | '|' | '}'
    )
}

/// Returns true if `c` must be percent-encoded inside a query option value.
#[must_use]
pub const fn escapes_in_query_value(c: char) -> bool {
    !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}

/// Percent-encodes a decoded path segment.
///
/// # Examples
///
/// ```
/// use odata_uri::escape_path_segment;
///
/// assert_eq!(escape_path_segment("$count"), "$count");
/// assert_eq!(escape_path_segment("People('a b')"), "People('a%20b')");
/// ```
#[must_use]
pub fn escape_path_segment(segment: &str) -> Cow<'_, str> {
    utf8_percent_encode(segment, PATH_SEGMENT).into()
}

/// Percent-encodes a decoded query option value.
///
/// # Examples
///
/// ```
/// use odata_uri::escape_query_value;
///
/// assert_eq!(escape_query_value("MyPaintings/$count gt 1"), "MyPaintings%2F%24count%20gt%201");
/// ```
#[must_use]
pub fn escape_query_value(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, QUERY_VALUE).into()
}

/// Decodes percent-escapes in either profile.
///
/// A `%` that does not start a valid two-digit escape is kept literally, so
/// re-encoding it yields `%25`.
///
/// # Errors
///
/// Returns [`Utf8Error`] if the decoded bytes are not valid UTF-8.
pub fn unescape(encoded: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(encoded).decode_utf8()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii() -> impl Iterator<Item = char> {
        (0u8..=0x7f).map(char::from)
    }

    #[test]
    fn path_predicate_matches_encoder() {
        for c in ascii() {
            let s = c.to_string();
            let escaped = escape_path_segment(&s) != s.as_str();
            assert_eq!(escaped, escapes_in_path(c), "disagreement on {c:?}");
        }
    }

    #[test]
    fn query_predicate_matches_encoder() {
        for c in ascii() {
            let s = c.to_string();
            let escaped = escape_query_value(&s) != s.as_str();
            assert_eq!(escaped, escapes_in_query_value(c), "disagreement on {c:?}");
        }
    }

    #[test]
    fn path_keeps_control_segments_bare() {
        for seg in ["$count", "$ref", "$value", "People(1)", "Orders(ID=1,Name='x')"] {
            assert_eq!(escape_path_segment(seg), seg);
        }
    }

    #[test]
    fn path_escapes_space_and_percent() {
        assert_eq!(escape_path_segment("a b%c"), "a%20b%25c");
        assert_eq!(escape_path_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn query_escapes_structural_characters() {
        assert_eq!(escape_query_value(" "), "%20");
        assert_eq!(escape_query_value("/"), "%2F");
        assert_eq!(escape_query_value("$"), "%24");
        assert_eq!(escape_query_value("("), "%28");
        assert_eq!(escape_query_value(")"), "%29");
        assert_eq!(escape_query_value("="), "%3D");
        assert_eq!(escape_query_value("&"), "%26");
        assert_eq!(escape_query_value("'"), "%27");
    }

    #[test]
    fn query_keeps_unreserved() {
        assert_eq!(escape_query_value("Az09-._~"), "Az09-._~");
    }

    #[test]
    fn non_ascii_is_utf8_encoded() {
        assert_eq!(escape_query_value("é"), "%C3%A9");
        assert_eq!(escape_path_segment("é"), "%C3%A9");
    }

    #[test]
    fn unescape_inverts_both_profiles() {
        let raw = "Name eq 'O''Neil/ü' and $it/X gt 1";
        assert_eq!(unescape(&escape_query_value(raw)).unwrap(), raw);
        assert_eq!(unescape(&escape_path_segment(raw)).unwrap(), raw);
    }

    #[test]
    fn unescape_keeps_stray_percent() {
        assert_eq!(unescape("100%").unwrap(), "100%");
        assert_eq!(escape_path_segment(&unescape("100%").unwrap()), "100%25");
    }

    #[test]
    fn unescape_rejects_invalid_utf8() {
        assert!(unescape("%FF%FE").is_err());
    }
}
