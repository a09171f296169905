//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use odata_uri::prelude::*;
//!
//! let settings = UriBuilderSettings::new("http://gobbledygook/");
//! let uri = build("People?$count=true", KeyDelimiterStyle::Parentheses, &settings).unwrap();
//! assert_eq!(uri.query(), Some("$count=true"));
//! ```
//!
//! Builder state markers (`Unconfigured`, `Configured`) and the tree node
//! types are left out; import them from the crate root when needed.

pub use crate::{
    // Building
    CanonicalUri, KeyDelimiterStyle, RequestOption, UriBuilder, UriBuilderSettings, build,
    // Parsed request
    Expression, OptionValue, ParsedOption, PathSegment, ResourcePath, SystemOption,
    // Model
    ElementType, NavigationResolver,
    // Errors
    BuildError, BuildErrorKind, InvalidLiteralError, InvalidServiceRootError, PathSyntaxError,
    QuerySyntaxError, QueryTooComplexError, SemanticError,
    // Escaping
    escape_path_segment, escape_query_value,
};
