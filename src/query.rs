//! Raw request splitting: path, ordered query pairs, option names.

use std::fmt;
use std::str::FromStr;

use crate::constants::{PARAMETER_ALIAS_PREFIX, SYSTEM_OPTION_PREFIX};
use crate::error::QuerySyntaxError;
use crate::escape::unescape;

/// A protocol-reserved query option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SystemOption {
    /// `$filter`
    Filter,
    /// `$expand`
    Expand,
    /// `$select`
    Select,
    /// `$orderby`
    OrderBy,
    /// `$top`
    Top,
    /// `$skip`
    Skip,
    /// `$count`
    Count,
    /// `$search`
    Search,
    /// `$apply`
    Apply,
    /// `$format`
    Format,
    /// `$levels`, only valid inside `$expand` options
    Levels,
}

impl SystemOption {
    /// Every system option, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Filter,
        Self::Expand,
        Self::Select,
        Self::OrderBy,
        Self::Top,
        Self::Skip,
        Self::Count,
        Self::Search,
        Self::Apply,
        Self::Format,
        Self::Levels,
    ];

    /// Looks up a system option by its `$`-prefixed name (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == name)
    }

    /// Returns true for options whose value is parsed by the expression
    /// grammar (`$filter`, `$expand`, `$select`, `$orderby`).
    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(self, Self::Filter | Self::Expand | Self::Select | Self::OrderBy)
    }

    /// Returns the `$`-prefixed option name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "$filter",
            Self::Expand => "$expand",
            Self::Select => "$select",
            Self::OrderBy => "$orderby",
            Self::Top => "$top",
            Self::Skip => "$skip",
            Self::Count => "$count",
            Self::Search => "$search",
            Self::Apply => "$apply",
            Self::Format => "$format",
            Self::Levels => "$levels",
        }
    }
}

impl fmt::Display for SystemOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The name half of a query pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryOptionName {
    /// A `$`-prefixed system option
    System(SystemOption),
    /// A custom option or `@`-prefixed parameter alias
    Custom(String),
}

impl QueryOptionName {
    /// Returns true for `@`-prefixed parameter aliases.
    #[must_use]
    pub fn is_parameter_alias(&self) -> bool {
        matches!(self, Self::Custom(name) if name.starts_with(PARAMETER_ALIAS_PREFIX))
    }
}

impl fmt::Display for QueryOptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System(option) => write!(f, "{option}"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A query pair with its value still in raw (decoded, unparsed) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOption {
    /// The option name
    pub name: QueryOptionName,
    /// The percent-decoded value text
    pub raw_value: String,
}

/// A relative request split into its path and ordered query pairs.
///
/// # Examples
///
/// ```
/// use odata_uri::{QueryOptionName, RawRequest, SystemOption};
///
/// let raw = RawRequest::parse("People?$filter=ID%20eq%201&$count=true").unwrap();
/// assert_eq!(raw.path, "People");
/// assert_eq!(raw.query[0].name, QueryOptionName::System(SystemOption::Filter));
/// assert_eq!(raw.query[0].raw_value, "ID eq 1");
/// assert_eq!(raw.query[1].raw_value, "true");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRequest {
    /// Raw (still percent-encoded) resource path
    pub path: String,
    /// Query pairs in input order
    pub query: Vec<QueryOption>,
}

impl RawRequest {
    /// Splits a relative request at the first `?`, dropping any fragment.
    ///
    /// Values of `$filter`, `$expand`, `$select` and `$orderby` end at the
    /// first `&` outside parentheses and single quotes, so nested option
    /// lists keep their `&` separators. All other values end at the next
    /// `&`. Empty pairs are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`QuerySyntaxError`] for an empty or unknown `$` option name,
    /// a duplicated system option, `$levels` outside `$expand`, or a pair
    /// whose percent-encoding does not decode to UTF-8.
    pub fn parse(input: &str) -> Result<Self, QuerySyntaxError> {
        let without_fragment = input.split_once('#').map_or(input, |(rest, _)| rest);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        let mut options: Vec<QueryOption> = Vec::new();
        let mut rest = query;

        while !rest.is_empty() {
            let name_end = rest.find(['=', '&']).unwrap_or(rest.len());
            let (raw_name, after_name) = rest.split_at(name_end);

            if raw_name.is_empty() && !after_name.starts_with('=') {
                rest = after_name.strip_prefix('&').unwrap_or(after_name);
                continue;
            }

            let name = Self::classify_name(&decode(raw_name, raw_name)?)?;

            let (raw_value, tail) = match after_name.strip_prefix('=') {
                Some(value) => value.split_at(value_end(&name, value)),
                None => ("", after_name),
            };
            rest = tail.strip_prefix('&').unwrap_or(tail);

            if let QueryOptionName::System(option) = name
                && options.iter().any(|o| o.name == name)
            {
                return Err(QuerySyntaxError {
                    option: option.as_str().to_string(),
                    position: 0,
                    expected: "each system query option at most once",
                    found: Some(option.as_str().to_string()),
                });
            }

            let raw_value = decode(raw_name, raw_value)?;
            options.push(QueryOption { name, raw_value });
        }

        Ok(Self {
            path: path.to_string(),
            query: options,
        })
    }

    fn classify_name(name: &str) -> Result<QueryOptionName, QuerySyntaxError> {
        let error = |expected| QuerySyntaxError {
            option: name.to_string(),
            position: 0,
            expected,
            found: Some(name.to_string()),
        };

        if name.is_empty() {
            return Err(error("a query option name"));
        }

        if !name.starts_with(SYSTEM_OPTION_PREFIX) {
            return Ok(QueryOptionName::Custom(name.to_string()));
        }

        match SystemOption::from_name(name) {
            Some(SystemOption::Levels) => Err(error("a system query option valid outside $expand")),
            Some(option) => Ok(QueryOptionName::System(option)),
            None => Err(error("a known system query option")),
        }
    }
}

impl FromStr for RawRequest {
    type Err = QuerySyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode(option: &str, raw: &str) -> Result<String, QuerySyntaxError> {
    unescape(raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| QuerySyntaxError {
            option: option.to_string(),
            position: e.valid_up_to(),
            expected: "percent-encoding that decodes to UTF-8",
            found: Some(raw.to_string()),
        })
}

/// Byte offset of the `&` ending a pair's raw value, or the value's length.
///
/// Expression-valued options may carry `&` inside quoted strings and nested
/// option lists, so their values end at the first `&` outside parentheses and
/// single quotes. Every other value ends at the next `&`.
fn value_end(name: &QueryOptionName, value: &str) -> usize {
    match name {
        QueryOptionName::System(option) if option.is_expression() => top_level_end(value, '&'),
        _ => value.find('&').unwrap_or(value.len()),
    }
}

/// Byte offset of the first `sep` outside parentheses and single quotes.
fn top_level_end(s: &str, sep: char) -> usize {
    let mut depth = 0usize;
    let mut in_quote = false;

    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            c if c == sep && !in_quote && depth == 0 => return i,
            _ => {}
        }
    }
    s.len()
}
