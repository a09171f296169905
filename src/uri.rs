//! The canonical request URI produced by the builder.

use std::cmp::Ordering;
use std::fmt;

use crate::constants::PARAMETER_ALIAS_PREFIX;
use crate::escape::escape_query_value;
use crate::option::ParsedOption;
use crate::resource_path::ResourcePath;
use crate::settings::{KeyDelimiterStyle, ServiceRoot};

/// One query option of a canonical request, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestOption {
    /// A parsed system query option
    System(ParsedOption),
    /// A custom option or parameter alias, carried through unparsed
    Custom {
        /// Decoded option name
        name: String,
        /// Decoded option value; empty when the pair had no `=`
        value: String,
    },
}

impl RequestOption {
    /// Returns the option as an escaped `name=value` query pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use odata_uri::RequestOption;
    ///
    /// let option = RequestOption::Custom {
    ///     name: "@p".to_string(),
    ///     value: "'a b'".to_string(),
    /// };
    /// assert_eq!(option.encoded(), "@p=%27a%20b%27");
    /// ```
    #[must_use]
    pub fn encoded(&self) -> String {
        match self {
            Self::System(option) => format!(
                "{}={}",
                option.name,
                escape_query_value(&option.value.to_string())
            ),
            Self::Custom { name, value } => {
                let name = match name.strip_prefix(PARAMETER_ALIAS_PREFIX) {
                    Some(alias) => format!("{PARAMETER_ALIAS_PREFIX}{}", escape_query_value(alias)),
                    None => escape_query_value(name).into_owned(),
                };
                if value.is_empty() {
                    name
                } else {
                    format!("{name}={}", escape_query_value(value))
                }
            }
        }
    }
}

/// A canonical, fully-qualified OData request URI.
///
/// Holds the final string along with the resolved path and parsed options it
/// was rendered from. Building [`relative`](Self::relative) again under the
/// same settings yields the same URI.
///
/// # Structure
///
/// ```text
/// <service-root>/<resource-path>[?<option>=<value>&...]
/// ```
///
/// # Examples
///
/// ```
/// use odata_uri::{KeyDelimiterStyle, UriBuilderSettings, build};
///
/// let settings = UriBuilderSettings::new("http://gobbledygook/");
/// let uri = build("People(1)/Friends?$top= 5", KeyDelimiterStyle::Parentheses, &settings).unwrap();
///
/// assert_eq!(uri.as_str(), "http://gobbledygook/People(1)/Friends?$top=5");
/// assert_eq!(uri.relative(), "People(1)/Friends?$top=5");
/// assert_eq!(uri.query(), Some("$top=5"));
/// assert_eq!(uri.options().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUri {
    service_root: ServiceRoot,
    path: ResourcePath,
    options: Vec<RequestOption>,
    /// Rendered URI
    rendered: String,
    /// Byte offset where the relative part starts
    relative_start: usize,
}

impl CanonicalUri {
    pub(crate) fn new(
        service_root: ServiceRoot,
        path: ResourcePath,
        options: Vec<RequestOption>,
        style: KeyDelimiterStyle,
    ) -> Self {
        let path_text = path.render(style);
        let query = options
            .iter()
            .map(RequestOption::encoded)
            .collect::<Vec<_>>()
            .join("&");

        let mut rendered =
            String::with_capacity(service_root.as_str().len() + path_text.len() + query.len() + 2);
        rendered.push_str(service_root.as_str());
        rendered.push('/');
        let relative_start = rendered.len();
        rendered.push_str(&path_text);
        if !query.is_empty() {
            rendered.push('?');
            rendered.push_str(&query);
        }

        Self {
            service_root,
            path,
            options,
            rendered,
            relative_start,
        }
    }

    /// Returns the service root the URI was built against.
    #[must_use]
    pub const fn service_root(&self) -> &ServiceRoot {
        &self.service_root
    }

    /// Returns the resolved resource path.
    #[must_use]
    pub const fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Returns the query options in input order.
    #[must_use]
    pub fn options(&self) -> &[RequestOption] {
        &self.options
    }

    /// Returns the parsed system options in input order.
    pub fn system_options(&self) -> impl Iterator<Item = &ParsedOption> {
        self.options.iter().filter_map(|option| match option {
            RequestOption::System(parsed) => Some(parsed),
            RequestOption::Custom { .. } => None,
        })
    }

    /// Returns the full URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Returns the part after the service root and its `/`.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.rendered[self.relative_start..]
    }

    /// Returns the escaped query string without its `?`, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.relative().split_once('?').map(|(_, query)| query)
    }
}

impl fmt::Display for CanonicalUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl AsRef<str> for CanonicalUri {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl PartialOrd for CanonicalUri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalUri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CanonicalUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionValue;
    use crate::query::SystemOption;

    fn root() -> ServiceRoot {
        ServiceRoot::parse("http://gobbledygook/").unwrap()
    }

    fn people() -> ResourcePath {
        ResourcePath::parse("People", KeyDelimiterStyle::Parentheses).unwrap()
    }

    #[test]
    fn renders_without_query() {
        let uri = CanonicalUri::new(root(), people(), Vec::new(), KeyDelimiterStyle::Parentheses);
        assert_eq!(uri.as_str(), "http://gobbledygook/People");
        assert_eq!(uri.relative(), "People");
        assert_eq!(uri.query(), None);
    }

    #[test]
    fn service_document() {
        let uri = CanonicalUri::new(
            root(),
            ResourcePath::default(),
            Vec::new(),
            KeyDelimiterStyle::Parentheses,
        );
        assert_eq!(uri.as_str(), "http://gobbledygook/");
        assert_eq!(uri.relative(), "");
    }

    #[test]
    fn system_option_value_is_escaped() {
        let options = vec![RequestOption::System(ParsedOption {
            name: SystemOption::Top,
            value: OptionValue::Top(3),
        })];
        let uri = CanonicalUri::new(root(), people(), options, KeyDelimiterStyle::Parentheses);
        assert_eq!(uri.query(), Some("$top=3"));
        assert_eq!(uri.system_options().count(), 1);
    }

    #[test]
    fn custom_options() {
        let bare = RequestOption::Custom {
            name: "debug".into(),
            value: String::new(),
        };
        assert_eq!(bare.encoded(), "debug");

        let spaced = RequestOption::Custom {
            name: "my option".into(),
            value: "a/b".into(),
        };
        assert_eq!(spaced.encoded(), "my%20option=a%2Fb");
    }

    #[test]
    fn ordering_follows_text() {
        let a = CanonicalUri::new(root(), people(), Vec::new(), KeyDelimiterStyle::Parentheses);
        let b = CanonicalUri::new(
            root(),
            ResourcePath::parse("Products", KeyDelimiterStyle::Parentheses).unwrap(),
            Vec::new(),
            KeyDelimiterStyle::Parentheses,
        );
        assert!(a < b);
    }
}
