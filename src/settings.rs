//! Builder configuration: service root, key rendering and parse limits.

use std::fmt;

use url::Url;

use crate::constants::{DEFAULT_MAX_INPUT_LENGTH, DEFAULT_MAX_NESTING_DEPTH};
use crate::error::InvalidServiceRootError;

/// How entity-key predicates render in the resource path.
///
/// Does not affect query option escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KeyDelimiterStyle {
    /// `People(1)`
    #[default]
    Parentheses,
    /// `People/1`; composite keys keep parentheses
    Slash,
}

/// A validated absolute service root.
///
/// # Examples
///
/// ```
/// use odata_uri::ServiceRoot;
///
/// let root = ServiceRoot::parse("http://gobbledygook/").unwrap();
/// assert_eq!(root.as_str(), "http://gobbledygook");
///
/// assert!(ServiceRoot::parse("gobbledygook/odata").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceRoot(String);

impl ServiceRoot {
    /// Parses and validates a service root.
    ///
    /// The root is normalized by the WHATWG URL rules and stored without a
    /// trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidServiceRootError`] if the root is not an absolute
    /// hierarchical URI, or carries a query or fragment.
    pub fn parse(input: &str) -> Result<Self, InvalidServiceRootError> {
        let invalid = |reason| InvalidServiceRootError {
            root: input.to_string(),
            reason,
        };

        let url = Url::parse(input).map_err(|_| invalid("not an absolute URI"))?;
        if url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URI"));
        }
        if url.query().is_some() {
            return Err(invalid("service root must not carry a query"));
        }
        if url.fragment().is_some() {
            return Err(invalid("service root must not carry a fragment"));
        }

        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    /// Returns the root without its trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings for building canonical request URIs.
///
/// The service root is kept as configured and validated on every build, so a
/// misconfigured root surfaces as [`InvalidServiceRootError`] from the build
/// call rather than at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UriBuilderSettings {
    /// Absolute base URI every request is resolved against.
    pub service_root: String,

    /// Maximum nesting depth of a query option expression.
    ///
    /// Default: 32
    #[cfg_attr(feature = "serde", serde(default = "default_max_nesting_depth"))]
    pub max_nesting_depth: usize,

    /// Maximum length of the raw relative request, in bytes.
    ///
    /// Default: 8192
    #[cfg_attr(feature = "serde", serde(default = "default_max_input_length"))]
    pub max_input_length: usize,
}

impl UriBuilderSettings {
    /// Creates settings for the given service root with default limits.
    #[must_use]
    pub fn new(service_root: impl Into<String>) -> Self {
        Self {
            service_root: service_root.into(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
        }
    }

    /// Sets the maximum expression nesting depth.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Sets the maximum raw request length.
    #[must_use]
    pub const fn with_max_input_length(mut self, len: usize) -> Self {
        self.max_input_length = len;
        self
    }

    /// Validates and returns the configured service root.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidServiceRootError`] if the root is unusable.
    pub fn service_root(&self) -> Result<ServiceRoot, InvalidServiceRootError> {
        ServiceRoot::parse(&self.service_root)
    }
}

#[cfg(feature = "serde")]
const fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

#[cfg(feature = "serde")]
const fn default_max_input_length() -> usize {
    DEFAULT_MAX_INPUT_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = UriBuilderSettings::new("http://gobbledygook/");
        assert_eq!(settings.max_nesting_depth, 32);
        assert_eq!(settings.max_input_length, 8192);
    }

    #[test]
    fn builder_pattern() {
        let settings = UriBuilderSettings::new("http://gobbledygook/")
            .with_max_nesting_depth(4)
            .with_max_input_length(100);
        assert_eq!(settings.max_nesting_depth, 4);
        assert_eq!(settings.max_input_length, 100);
    }

    #[test]
    fn default_key_style_is_parentheses() {
        assert_eq!(KeyDelimiterStyle::default(), KeyDelimiterStyle::Parentheses);
    }

    #[test]
    fn root_trailing_slash_dropped() {
        let root = ServiceRoot::parse("https://example.com/odata/").unwrap();
        assert_eq!(root.as_str(), "https://example.com/odata");
    }

    #[test]
    fn root_without_path() {
        let root = ServiceRoot::parse("http://gobbledygook").unwrap();
        assert_eq!(root.as_str(), "http://gobbledygook");
    }

    #[test]
    fn relative_root_fails() {
        let err = ServiceRoot::parse("/odata").unwrap_err();
        assert_eq!(err.reason, "not an absolute URI");
    }

    #[test]
    fn root_with_query_fails() {
        assert!(ServiceRoot::parse("http://example.com/odata?x=1").is_err());
        assert!(ServiceRoot::parse("http://example.com/odata#top").is_err());
    }

    #[test]
    fn opaque_root_fails() {
        let err = ServiceRoot::parse("mailto:someone@example.com").unwrap_err();
        assert_eq!(err.reason, "not a hierarchical URI");
    }
}
