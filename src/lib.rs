//! Canonical builder for OData request URIs.
//!
//! This crate takes a relative resource request written in the OData query
//! dialect and produces one canonical, fully-qualified, correctly-escaped
//! absolute URI against a configured service root.
//!
//! # Overview
//!
//! ```text
//! <service-root>/<resource-path>[?<option>=<value>&...]
//! ```
//!
//! Building a request:
//!
//! 1. splits the raw request into its resource path and query pairs,
//! 2. resolves the path into classified segments,
//! 3. parses every system query option into a tree,
//! 4. re-serializes each tree in canonical form, qualifying bare paths
//!    inside nested `$count(...)` queries with `$it/`,
//! 5. escapes the path and the option values with separate profiles and
//!    joins the result to the service root.
//!
//! # Quick Start
//!
//! ```rust
//! use odata_uri::{KeyDelimiterStyle, UriBuilderSettings, build};
//!
//! let settings = UriBuilderSettings::new("http://gobbledygook/");
//!
//! let uri = build("People/$count", KeyDelimiterStyle::Parentheses, &settings).unwrap();
//! assert_eq!(uri.as_str(), "http://gobbledygook/People/$count");
//!
//! let uri = build(
//!     "People?$filter=MyPaintings/$count($filter=OpenProperty eq 1) gt 1",
//!     KeyDelimiterStyle::Parentheses,
//!     &settings,
//! )
//! .unwrap();
//! assert_eq!(
//!     uri.as_str(),
//!     "http://gobbledygook/People?$filter=MyPaintings%2F%24count%28%24filter%3D%24it%2FOpenProperty%20eq%201%29%20gt%201"
//! );
//! ```
//!
//! # Builder Pattern
//!
//! ```rust
//! use odata_uri::{KeyDelimiterStyle, UriBuilder, UriBuilderSettings};
//!
//! let builder = UriBuilder::new()
//!     .key_delimiter(KeyDelimiterStyle::Slash)
//!     .settings(UriBuilderSettings::new("https://example.com/odata"));
//!
//! let uri = builder.build("Products(7)?$count=true").unwrap();
//! assert_eq!(uri.as_str(), "https://example.com/odata/Products/7?$count=true");
//! ```
//!
//! # Escaping Profiles
//!
//! | Where | Kept as is | Example |
//! |-------|------------|---------|
//! | Path segments | unreserved, sub-delims, `:` `@` | `People/$count` |
//! | Query values | unreserved only | `MyPaintings%2F%24count` |
//!
//! # Limits
//!
//! | Setting | Default |
//! |---------|---------|
//! | `max_input_length` | 8192 bytes |
//! | `max_nesting_depth` | 32 |
//!
//! The accepted grammar is written out in `grammar.abnf` at the crate root.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod builder;
mod canonical;
mod constants;
mod error;
mod escape;
mod expression;
mod lexer;
mod literal;
mod model;
mod option;
mod parser;
mod path_segment;
pub mod prelude;
mod query;
mod resource_path;
mod settings;
mod uri;

pub use builder::{Configured, Unconfigured, UriBuilder, build};
pub use constants::{
    BATCH_SEGMENT, COUNT_SEGMENT, DEFAULT_MAX_INPUT_LENGTH, DEFAULT_MAX_NESTING_DEPTH,
    IMPLICIT_RANGE_VARIABLE, METADATA_SEGMENT, PARAMETER_ALIAS_PREFIX, REF_SEGMENT,
    SYSTEM_OPTION_PREFIX, VALUE_SEGMENT,
};
pub use error::{
    BuildError, BuildErrorKind, InvalidLiteralError, InvalidServiceRootError, PathSyntaxError,
    QueryError, QuerySyntaxError, QueryTooComplexError, SemanticError,
};
pub use escape::{
    escape_path_segment, escape_query_value, escapes_in_path, escapes_in_query_value, unescape,
};
pub use expression::{BinaryOperator, Expression, LambdaKind, PropertyAccess, UnaryOperator};
pub use literal::{Literal, is_guid, normalize_count, normalize_non_negative};
pub use model::{ElementType, NavigationResolver};
pub use option::{
    ExpandItem, ExpandTarget, Levels, OptionValue, OrderByItem, ParsedOption, SelectItem,
    SortDirection,
};
pub use parser::{parse_expression, parse_option_value};
pub use path_segment::{KeyPredicate, PathSegment, is_identifier};
pub use query::{QueryOption, QueryOptionName, RawRequest, SystemOption};
pub use resource_path::ResourcePath;
pub use settings::{KeyDelimiterStyle, ServiceRoot, UriBuilderSettings};
pub use uri::{CanonicalUri, RequestOption};
