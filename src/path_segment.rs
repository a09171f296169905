//! Classified resource path segments.

use std::fmt;

use crate::constants::{
    BATCH_SEGMENT, COUNT_SEGMENT, METADATA_SEGMENT, REF_SEGMENT, VALUE_SEGMENT,
};
use crate::error::PathSyntaxError;
use crate::literal::Literal;

/// One classified segment of a resource path.
///
/// # Examples
///
/// ```
/// use odata_uri::PathSegment;
///
/// assert_eq!(PathSegment::control("$count"), Some(PathSegment::Count));
/// assert_eq!(PathSegment::control("People"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathSegment {
    /// The first identifier of a path
    EntitySet(String),
    /// An entity key, attached to the preceding entity set or navigation
    Key(KeyPredicate),
    /// A non-first, unqualified identifier
    Navigation(String),
    /// `$count`
    Count,
    /// `$ref`
    Ref,
    /// `$value`
    Value,
    /// `$metadata`
    Metadata,
    /// `$batch`
    Batch,
    /// A namespace-qualified action or function name
    BoundOperation(String),
}

impl PathSegment {
    /// Classifies a control segment such as `$count`.
    #[must_use]
    pub fn control(token: &str) -> Option<Self> {
        match token {
            COUNT_SEGMENT => Some(Self::Count),
            REF_SEGMENT => Some(Self::Ref),
            VALUE_SEGMENT => Some(Self::Value),
            METADATA_SEGMENT => Some(Self::Metadata),
            BATCH_SEGMENT => Some(Self::Batch),
            _ => None,
        }
    }

    /// Returns the literal text of a control segment.
    #[must_use]
    pub const fn control_str(&self) -> Option<&'static str> {
        match self {
            Self::Count => Some(COUNT_SEGMENT),
            Self::Ref => Some(REF_SEGMENT),
            Self::Value => Some(VALUE_SEGMENT),
            Self::Metadata => Some(METADATA_SEGMENT),
            Self::Batch => Some(BATCH_SEGMENT),
            _ => None,
        }
    }

    /// Returns the identifier of a named segment.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::EntitySet(n) | Self::Navigation(n) | Self::BoundOperation(n) => Some(n),
            _ => None,
        }
    }

    /// Returns true if the segment may address a collection.
    #[must_use]
    pub const fn is_collection_like(&self) -> bool {
        matches!(
            self,
            Self::EntitySet(_) | Self::Navigation(_) | Self::BoundOperation(_)
        )
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntitySet(n) | Self::Navigation(n) | Self::BoundOperation(n) => {
                write!(f, "{n}")
            }
            Self::Key(key) => write!(f, "({key})"),
            control => write!(f, "{}", control.control_str().unwrap_or_default()),
        }
    }
}

/// The contents of an entity key predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyPredicate {
    /// `People(1)` or `People/1`
    Single(Literal),
    /// `Orders(OrderID=1,ProductID=2)`
    Named(Vec<(String, Literal)>),
}

impl KeyPredicate {
    /// Parses the text between the parentheses of a key predicate.
    ///
    /// `segment` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError::InvalidKeyPredicate`] if the predicate is
    /// empty, mixes named and unnamed values, or contains a value that is
    /// not a literal.
    pub fn parse(segment: &str, inner: &str) -> Result<Self, PathSyntaxError> {
        let invalid = |reason| PathSyntaxError::InvalidKeyPredicate {
            segment: segment.to_string(),
            reason,
        };

        if inner.trim().is_empty() {
            return Err(invalid("key predicate is empty"));
        }

        let parts = split_outside_quotes(inner, ',');
        let named = parts.iter().any(|p| name_value_split(p).is_some());

        if !named {
            if parts.len() != 1 {
                return Err(invalid("composite keys must name every key property"));
            }
            let literal = Literal::parse(parts[0].trim())
                .map_err(|_| invalid("key value is not a literal"))?;
            return Ok(Self::Single(literal));
        }

        let mut pairs = Vec::with_capacity(parts.len());
        for part in parts {
            let (name, value) = name_value_split(part)
                .ok_or_else(|| invalid("composite keys must name every key property"))?;
            let name = name.trim();
            if !is_identifier(name) {
                return Err(invalid("key property name is not an identifier"));
            }
            let literal = Literal::parse(value.trim())
                .map_err(|_| invalid("key value is not a literal"))?;
            pairs.push((name.to_string(), literal));
        }
        Ok(Self::Named(pairs))
    }

    /// Returns true for a single unnamed key value.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }
}

impl fmt::Display for KeyPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(literal) => write!(f, "{literal}"),
            Self::Named(pairs) => {
                for (i, (name, literal)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{name}={literal}")?;
                }
                Ok(())
            }
        }
    }
}

/// Returns true if `s` is a simple OData identifier.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    invalid_identifier_char(s).is_none() && !s.is_empty()
}

/// Returns the first character (and its position) that breaks a simple
/// identifier, if any.
pub(crate) fn invalid_identifier_char(s: &str) -> Option<(usize, char)> {
    s.chars().enumerate().find(|&(i, c)| {
        let allowed = if i == 0 {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || c == '_'
        };
        !allowed
    })
}

/// Splits `name=value` at the first `=` outside quotes.
fn name_value_split(part: &str) -> Option<(&str, &str)> {
    let mut in_quote = false;
    for (i, c) in part.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '=' if !in_quote => return Some((&part[..i], &part[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Splits on `sep` outside single-quoted strings.
fn split_outside_quotes(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
        } else if c == sep && !in_quote {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_vocabulary() {
        assert_eq!(PathSegment::control("$count"), Some(PathSegment::Count));
        assert_eq!(PathSegment::control("$ref"), Some(PathSegment::Ref));
        assert_eq!(PathSegment::control("$value"), Some(PathSegment::Value));
        assert_eq!(PathSegment::control("$metadata"), Some(PathSegment::Metadata));
        assert_eq!(PathSegment::control("$batch"), Some(PathSegment::Batch));
        assert_eq!(PathSegment::control("$Count"), None);
    }

    #[test]
    fn single_key() {
        let key = KeyPredicate::parse("People(1)", "1").unwrap();
        assert_eq!(key, KeyPredicate::Single(Literal::Integer(1)));
        assert_eq!(key.to_string(), "1");
    }

    #[test]
    fn single_string_key_with_comma() {
        let key = KeyPredicate::parse("People('a,b')", "'a,b'").unwrap();
        assert_eq!(key, KeyPredicate::Single(Literal::String("a,b".into())));
    }

    #[test]
    fn named_keys() {
        let key = KeyPredicate::parse("Orders(..)", "OrderID=1, Name='x=y'").unwrap();
        assert_eq!(key.to_string(), "OrderID=1,Name='x=y'");
        assert!(!key.is_single());
    }

    #[test]
    fn empty_key_fails() {
        let result = KeyPredicate::parse("People()", " ");
        assert!(matches!(result, Err(PathSyntaxError::InvalidKeyPredicate { .. })));
    }

    #[test]
    fn mixed_key_fails() {
        let result = KeyPredicate::parse("Orders(1,B=2)", "1,B=2");
        assert!(matches!(result, Err(PathSyntaxError::InvalidKeyPredicate { .. })));
    }

    #[test]
    fn non_literal_key_fails() {
        let result = KeyPredicate::parse("People(abc)", "abc");
        assert!(matches!(result, Err(PathSyntaxError::InvalidKeyPredicate { .. })));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("People"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
        assert_eq!(invalid_identifier_char("ab c"), Some((2, ' ')));
    }
}
