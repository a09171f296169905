//! Scalar literal classification and normalization.

use std::fmt;

use crate::error::InvalidLiteralError;

/// A scalar literal from a key predicate or an expression.
///
/// Numeric literals other than plain integers keep their lexical form so that
/// canonicalization never changes precision or notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// `null`
    Null,
    /// `true` or `false`
    Boolean(bool),
    /// An integer that fits in 64 bits
    Integer(i64),
    /// A decimal or floating-point number, or an integer too large for `i64`
    Decimal(String),
    /// A single-quoted string, stored unquoted with `''` collapsed
    String(String),
    /// A GUID in 8-4-4-4-12 hex form
    Guid(String),
    /// An enumeration member such as `NS.Color'Red'`
    Enum {
        /// Namespace-qualified enumeration type name
        type_name: String,
        /// Member name or flags list, unquoted
        value: String,
    },
}

impl Literal {
    /// Classifies a literal by its lexical form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLiteralError`] if the text is not one of the accepted
    /// literal forms.
    ///
    /// # Examples
    ///
    /// ```
    /// use odata_uri::Literal;
    ///
    /// assert_eq!(Literal::parse("123").unwrap(), Literal::Integer(123));
    /// assert_eq!(Literal::parse("'O''Neil'").unwrap(), Literal::String("O'Neil".into()));
    /// assert!(Literal::parse("maybe").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, InvalidLiteralError> {
        let invalid = || InvalidLiteralError {
            literal: text.to_string(),
            expected: "an integer, decimal, quoted string, GUID, boolean or null literal",
        };

        match text {
            "null" => return Ok(Self::Null),
            "true" => return Ok(Self::Boolean(true)),
            "false" => return Ok(Self::Boolean(false)),
            _ => {}
        }

        if let Some(inner) = text.strip_prefix('\'') {
            let inner = inner.strip_suffix('\'').ok_or_else(invalid)?;
            return unquote(inner).map(Self::String).ok_or_else(invalid);
        }

        if is_guid(text) {
            return Ok(Self::Guid(text.to_ascii_lowercase()));
        }

        if let Some((type_name, quoted)) = text.split_once('\'') {
            let qualified = type_name.contains('.')
                && type_name.split('.').all(crate::path_segment::is_identifier);
            let value = quoted
                .strip_suffix('\'')
                .filter(|_| qualified)
                .and_then(unquote)
                .ok_or_else(invalid)?;
            return Ok(Self::Enum {
                type_name: type_name.to_string(),
                value,
            });
        }

        if is_integer(text) {
            return Ok(text
                .parse::<i64>()
                .map_or_else(|_| Self::Decimal(text.to_string()), Self::Integer));
        }

        if is_decimal(text) {
            return Ok(Self::Decimal(text.to_string()));
        }

        Err(invalid())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) | Self::Guid(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Enum { type_name, value } => {
                write!(f, "{type_name}'{}'", value.replace('\'', "''"))
            }
        }
    }
}

/// Normalizes the raw value of a `$count` option.
///
/// Leading and trailing whitespace is trimmed; the remainder must be exactly
/// `true` or `false`.
///
/// # Errors
///
/// Returns [`InvalidLiteralError`] for any other value.
///
/// # Examples
///
/// ```
/// use odata_uri::normalize_count;
///
/// assert_eq!(normalize_count("   true  ").unwrap(), true);
/// assert!(normalize_count("True").is_err());
/// ```
pub fn normalize_count(raw: &str) -> Result<bool, InvalidLiteralError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(InvalidLiteralError {
            literal: other.to_string(),
            expected: "'true' or 'false'",
        }),
    }
}

/// Normalizes the raw value of `$top` or `$skip`.
///
/// # Errors
///
/// Returns [`InvalidLiteralError`] unless the trimmed value is a
/// non-negative decimal integer.
pub fn normalize_non_negative(raw: &str) -> Result<u64, InvalidLiteralError> {
    let trimmed = raw.trim();
    trimmed
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| trimmed.parse().ok())
        .flatten()
        .ok_or_else(|| InvalidLiteralError {
            literal: trimmed.to_string(),
            expected: "a non-negative integer",
        })
}

/// Collapses `''` to `'`; `None` if a lone quote remains.
fn unquote(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return None;
        }
        out.push(c);
    }
    Some(out)
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => exponent.is_some() && is_integer(mantissa) && !mantissa.starts_with('-'),
    };

    let exponent_ok = exponent.is_none_or(|e| {
        let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    });

    mantissa_ok && exponent_ok
}

/// Returns true if `text` is a GUID in 8-4-4-4-12 hex form.
#[must_use]
pub fn is_guid(text: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let mut parts = text.split('-');
    for len in GROUPS {
        match parts.next() {
            Some(p) if p.len() == len && p.bytes().all(|b| b.is_ascii_hexdigit()) => {}
            _ => return false,
        }
    }
    parts.next().is_none()
}
