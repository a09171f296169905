//! Error types for OData request URI canonicalization.

use std::fmt;

/// Errors that can occur when building a canonical request URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    /// The raw request URI that failed to build
    pub input: String,
    /// The specific error that occurred
    pub kind: BuildErrorKind,
}

/// Specific build error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// Raw request exceeds the configured maximum length
    InputTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },
    /// Resource path is malformed
    PathSyntax(PathSyntaxError),
    /// A query option value is malformed
    QuerySyntax(QuerySyntaxError),
    /// A literal failed lexical validation
    InvalidLiteral(InvalidLiteralError),
    /// A query option nests deeper than allowed
    QueryTooComplex(QueryTooComplexError),
    /// The configured service root is unusable
    InvalidServiceRoot(InvalidServiceRootError),
    /// The injected model rejected a navigation
    Semantic(SemanticError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to build request URI '{}': ", self.input)?;
        match &self.kind {
            BuildErrorKind::InputTooLong { max, actual } => {
                write!(f, "request length {actual} exceeds maximum {max}")
            }
            BuildErrorKind::PathSyntax(e) => write!(f, "invalid resource path: {e}"),
            BuildErrorKind::QuerySyntax(e) => write!(f, "invalid query option: {e}"),
            BuildErrorKind::InvalidLiteral(e) => write!(f, "invalid literal: {e}"),
            BuildErrorKind::QueryTooComplex(e) => write!(f, "query too complex: {e}"),
            BuildErrorKind::InvalidServiceRoot(e) => write!(f, "invalid service root: {e}"),
            BuildErrorKind::Semantic(e) => write!(f, "model check failed: {e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            BuildErrorKind::InputTooLong { .. } => None,
            BuildErrorKind::PathSyntax(e) => Some(e),
            BuildErrorKind::QuerySyntax(e) => Some(e),
            BuildErrorKind::InvalidLiteral(e) => Some(e),
            BuildErrorKind::QueryTooComplex(e) => Some(e),
            BuildErrorKind::InvalidServiceRoot(e) => Some(e),
            BuildErrorKind::Semantic(e) => Some(e),
        }
    }
}

impl From<QueryError> for BuildErrorKind {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Syntax(e) => Self::QuerySyntax(e),
            QueryError::InvalidLiteral(e) => Self::InvalidLiteral(e),
            QueryError::TooComplex(e) => Self::QueryTooComplex(e),
        }
    }
}

/// Errors for resource path parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSyntaxError {
    /// Two slashes with nothing between them, or a trailing slash
    EmptySegment {
        /// Index of the empty segment
        index: usize,
    },
    /// A key predicate opened with `(` but never closed
    UnterminatedKeyPredicate {
        /// The offending segment
        segment: String,
    },
    /// A key predicate that is empty or not a literal list
    InvalidKeyPredicate {
        /// The offending segment
        segment: String,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// A segment appears where the path grammar does not allow it
    MisplacedSegment {
        /// The offending segment
        segment: String,
        /// Index of the segment
        index: usize,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// A character that cannot start or continue an identifier
    InvalidIdentifier {
        /// The offending segment
        segment: String,
        /// The invalid character
        char: char,
        /// Position within the segment
        position: usize,
    },
    /// Percent-encoding that does not decode to UTF-8
    InvalidPercentEncoding {
        /// The offending segment
        segment: String,
    },
}

impl fmt::Display for PathSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySegment { index } => write!(f, "segment {index} is empty"),
            Self::UnterminatedKeyPredicate { segment } => {
                write!(f, "key predicate in '{segment}' is missing its closing ')'")
            }
            Self::InvalidKeyPredicate { segment, reason } => {
                write!(f, "invalid key predicate in '{segment}': {reason}")
            }
            Self::MisplacedSegment {
                segment,
                index,
                reason,
            } => write!(f, "segment '{segment}' at index {index} is misplaced: {reason}"),
            Self::InvalidIdentifier {
                segment,
                char,
                position,
            } => write!(
                f,
                "invalid character '{char}' at position {position} in segment '{segment}'"
            ),
            Self::InvalidPercentEncoding { segment } => {
                write!(f, "segment '{segment}' does not decode to UTF-8")
            }
        }
    }
}

impl std::error::Error for PathSyntaxError {}

/// A malformed query option value.
///
/// `position` is a byte offset into the decoded option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySyntaxError {
    /// Name of the query option being parsed
    pub option: String,
    /// Byte offset of the offending token
    pub position: usize,
    /// What the parser expected at `position`
    pub expected: &'static str,
    /// What was actually found, `None` at end of input
    pub found: Option<String>,
}

impl fmt::Display for QuerySyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(
                f,
                "in '{}' at position {}: expected {}, found '{found}'",
                self.option, self.position, self.expected
            ),
            None => write!(
                f,
                "in '{}' at position {}: expected {}, found end of input",
                self.option, self.position, self.expected
            ),
        }
    }
}

impl std::error::Error for QuerySyntaxError {}

/// A literal that failed lexical validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLiteralError {
    /// The rejected literal text
    pub literal: String,
    /// Description of the accepted forms
    pub expected: &'static str,
}

impl fmt::Display for InvalidLiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not {}", self.literal, self.expected)
    }
}

impl std::error::Error for InvalidLiteralError {}

/// Nesting depth limit exceeded while parsing a query option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTooComplexError {
    /// The configured maximum depth
    pub max_depth: usize,
}

impl fmt::Display for QueryTooComplexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expression nests deeper than {}; raise max_nesting_depth or simplify the query",
            self.max_depth
        )
    }
}

impl std::error::Error for QueryTooComplexError {}

/// The configured service root cannot anchor request URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidServiceRootError {
    /// The rejected root
    pub root: String,
    /// Reason for invalidity
    pub reason: &'static str,
}

impl fmt::Display for InvalidServiceRootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.root, self.reason)
    }
}

impl std::error::Error for InvalidServiceRootError {}

/// Errors raised by the optional model lookup pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// The model has no navigation property or entity set with this name
    UnknownProperty {
        /// The unresolved name
        name: String,
        /// Type the name was resolved against, `None` for the entity container
        type_context: Option<String>,
    },
    /// `$count`, a lambda or a nested query applied to a single-valued target
    NotACollection {
        /// The navigation the operator was applied to
        name: String,
    },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty {
                name,
                type_context: Some(ty),
            } => write!(f, "type '{ty}' has no navigation property '{name}'"),
            Self::UnknownProperty {
                name,
                type_context: None,
            } => write!(f, "entity container has no entity set '{name}'"),
            Self::NotACollection { name } => {
                write!(f, "'{name}' is not a collection")
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// Failures from parsing a single query option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Token mismatch
    Syntax(QuerySyntaxError),
    /// Literal rejected by the literal normalizer
    InvalidLiteral(InvalidLiteralError),
    /// Nesting depth exceeded
    TooComplex(QueryTooComplexError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{e}"),
            Self::InvalidLiteral(e) => write!(f, "{e}"),
            Self::TooComplex(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QuerySyntaxError> for QueryError {
    fn from(e: QuerySyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl From<InvalidLiteralError> for QueryError {
    fn from(e: InvalidLiteralError) -> Self {
        Self::InvalidLiteral(e)
    }
}

impl From<QueryTooComplexError> for QueryError {
    fn from(e: QueryTooComplexError) -> Self {
        Self::TooComplex(e)
    }
}
