//! Builds canonical request URIs from raw relative requests.
//!
//! [`build`] is the plain entry point. [`UriBuilder`] wraps it in a typestate
//! builder so settings are supplied exactly once and an optional
//! [`NavigationResolver`] can be attached.

use std::fmt;
use std::sync::Arc;

use crate::error::{BuildError, BuildErrorKind};
use crate::model::{self, NavigationResolver};
use crate::option::ParsedOption;
use crate::parser::parse_option_value;
use crate::query::{QueryOption, QueryOptionName, RawRequest};
use crate::resource_path::ResourcePath;
use crate::settings::{KeyDelimiterStyle, ServiceRoot, UriBuilderSettings};
use crate::uri::{CanonicalUri, RequestOption};

/// Builds the canonical absolute URI for a relative request.
///
/// `raw` may also be an absolute URI under the configured service root; the
/// root is stripped before parsing. A single leading `/` is ignored.
///
/// # Errors
///
/// Returns [`BuildError`] if:
/// - `raw` is longer than `settings.max_input_length`
/// - The service root is not an absolute hierarchical URI
/// - The resource path or any query option is malformed
/// - An expression nests deeper than `settings.max_nesting_depth`
///
/// # Examples
///
/// ```
/// use odata_uri::{KeyDelimiterStyle, UriBuilderSettings, build};
///
/// let settings = UriBuilderSettings::new("http://gobbledygook/");
/// let uri = build(
///     "People?$filter=MyPaintings/$count gt 1",
///     KeyDelimiterStyle::Parentheses,
///     &settings,
/// )
/// .unwrap();
///
/// assert_eq!(
///     uri.as_str(),
///     "http://gobbledygook/People?$filter=MyPaintings%2F%24count%20gt%201"
/// );
/// ```
pub fn build(
    raw: &str,
    style: KeyDelimiterStyle,
    settings: &UriBuilderSettings,
) -> Result<CanonicalUri, BuildError> {
    build_with(raw, style, settings, None)
}

fn build_with(
    raw: &str,
    style: KeyDelimiterStyle,
    settings: &UriBuilderSettings,
    resolver: Option<&dyn NavigationResolver>,
) -> Result<CanonicalUri, BuildError> {
    build_inner(raw, style, settings, resolver).map_err(|kind| BuildError {
        input: raw.to_string(),
        kind,
    })
}

fn build_inner(
    raw: &str,
    style: KeyDelimiterStyle,
    settings: &UriBuilderSettings,
    resolver: Option<&dyn NavigationResolver>,
) -> Result<CanonicalUri, BuildErrorKind> {
    if raw.len() > settings.max_input_length {
        return Err(BuildErrorKind::InputTooLong {
            max: settings.max_input_length,
            actual: raw.len(),
        });
    }

    let root = settings
        .service_root()
        .map_err(BuildErrorKind::InvalidServiceRoot)?;

    let request = RawRequest::parse(relative_part(raw, &root)).map_err(BuildErrorKind::QuerySyntax)?;
    let path = ResourcePath::parse(&request.path, style).map_err(BuildErrorKind::PathSyntax)?;

    let mut options = Vec::with_capacity(request.query.len());
    for QueryOption { name, raw_value } in request.query {
        let option = match name {
            QueryOptionName::System(name) => {
                let value = parse_option_value(name, &raw_value, settings.max_nesting_depth)?;
                tracing::trace!(option = %name, value = %value, "canonicalized query option");
                RequestOption::System(ParsedOption { name, value })
            }
            QueryOptionName::Custom(name) => RequestOption::Custom {
                name,
                value: raw_value,
            },
        };
        options.push(option);
    }

    if let Some(resolver) = resolver {
        let system = options.iter().filter_map(|option| match option {
            RequestOption::System(parsed) => Some(parsed),
            RequestOption::Custom { .. } => None,
        });
        model::check(resolver, &path, system).map_err(BuildErrorKind::Semantic)?;
    }

    let uri = CanonicalUri::new(root, path, options, style);
    tracing::debug!(uri = %uri, "built canonical request URI");
    Ok(uri)
}

/// Strips the service root (when `raw` is absolute under it) and one
/// leading `/`.
fn relative_part<'a>(raw: &'a str, root: &ServiceRoot) -> &'a str {
    let relative = raw
        .strip_prefix(root.as_str())
        .filter(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
        .unwrap_or(raw);
    relative.strip_prefix('/').unwrap_or(relative)
}

/// Marker: no settings supplied yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

/// Marker: settings supplied, ready to build.
#[derive(Debug, Clone)]
pub struct Configured(UriBuilderSettings);

/// A typestate builder for canonical request URIs.
///
/// # Type State
///
/// - [`Unconfigured`]: initial state; only options can be set
/// - [`Configured`]: settings supplied; [`build`](UriBuilder::build) is
///   available and can be called any number of times
///
/// A configured builder is `Send + Sync` and can be shared across threads.
///
/// # Examples
///
/// ```
/// use odata_uri::{KeyDelimiterStyle, UriBuilder, UriBuilderSettings};
///
/// let builder = UriBuilder::new()
///     .key_delimiter(KeyDelimiterStyle::Slash)
///     .settings(UriBuilderSettings::new("https://example.com/odata"));
///
/// let uri = builder.build("People(1)?$select=Name").unwrap();
/// assert_eq!(uri.as_str(), "https://example.com/odata/People/1?$select=Name");
/// ```
///
/// # Compile-Time Safety
///
/// ```compile_fail
/// use odata_uri::UriBuilder;
///
/// // Error: build() needs settings
/// let uri = UriBuilder::new().build("People");
/// ```
#[derive(Clone)]
pub struct UriBuilder<State = Unconfigured> {
    key_delimiter: KeyDelimiterStyle,
    resolver: Option<Arc<dyn NavigationResolver>>,
    state: State,
}

impl UriBuilder<Unconfigured> {
    /// Creates a builder with parenthesized keys and no model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            key_delimiter: KeyDelimiterStyle::default(),
            resolver: None,
            state: Unconfigured,
        }
    }

    /// Supplies settings and advances to the [`Configured`] state.
    #[must_use]
    pub fn settings(self, settings: UriBuilderSettings) -> UriBuilder<Configured> {
        UriBuilder {
            key_delimiter: self.key_delimiter,
            resolver: self.resolver,
            state: Configured(settings),
        }
    }
}

impl Default for UriBuilder<Unconfigured> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> UriBuilder<State> {
    /// Sets how key predicates render in the path.
    #[must_use]
    pub fn key_delimiter(mut self, style: KeyDelimiterStyle) -> Self {
        self.key_delimiter = style;
        self
    }

    /// Attaches a model; every build then also runs navigation lookups.
    #[must_use]
    pub fn model(mut self, resolver: Arc<dyn NavigationResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

impl UriBuilder<Configured> {
    /// Returns the settings this builder was configured with.
    #[must_use]
    pub const fn configured_settings(&self) -> &UriBuilderSettings {
        &self.state.0
    }

    /// Builds the canonical URI for `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] for the same reasons as [`build`], plus
    /// [`BuildErrorKind::Semantic`] when an attached model rejects a
    /// navigation.
    pub fn build(&self, raw: &str) -> Result<CanonicalUri, BuildError> {
        build_with(raw, self.key_delimiter, &self.state.0, self.resolver.as_deref())
    }
}

impl<State: fmt::Debug> fmt::Debug for UriBuilder<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriBuilder")
            .field("key_delimiter", &self.key_delimiter)
            .field("has_model", &self.resolver.is_some())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PathSyntaxError, SemanticError};
    use crate::model::ElementType;

    const ROOT: &str = "http://gobbledygook/";

    fn canonical(raw: &str) -> String {
        build(raw, KeyDelimiterStyle::Parentheses, &UriBuilderSettings::new(ROOT))
            .unwrap()
            .to_string()
    }

    fn kind(raw: &str, settings: &UriBuilderSettings) -> BuildErrorKind {
        build(raw, KeyDelimiterStyle::Parentheses, settings)
            .unwrap_err()
            .kind
    }

    #[test]
    fn path_only() {
        assert_eq!(canonical("People"), "http://gobbledygook/People");
        assert_eq!(canonical(""), "http://gobbledygook/");
    }

    #[test]
    fn leading_slash_and_absolute_input() {
        assert_eq!(canonical("/People"), "http://gobbledygook/People");
        assert_eq!(
            canonical("http://gobbledygook/People?$top=1"),
            "http://gobbledygook/People?$top=1"
        );
    }

    #[test]
    fn fragment_dropped() {
        assert_eq!(canonical("People?$top=1#frag"), "http://gobbledygook/People?$top=1");
    }

    #[test]
    fn options_keep_input_order() {
        assert_eq!(
            canonical("People?$top=1&x=y&$skip=2"),
            "http://gobbledygook/People?$top=1&x=y&$skip=2"
        );
    }

    #[test]
    fn custom_options_reescaped() {
        assert_eq!(
            canonical("People?my%20opt=a%2Fb&flag"),
            "http://gobbledygook/People?my%20opt=a%2Fb&flag"
        );
    }

    #[test]
    fn input_too_long() {
        let settings = UriBuilderSettings::new(ROOT).with_max_input_length(4);
        assert_eq!(
            kind("People", &settings),
            BuildErrorKind::InputTooLong { max: 4, actual: 6 }
        );
    }

    #[test]
    fn invalid_service_root() {
        let settings = UriBuilderSettings::new("not a root");
        assert!(matches!(
            kind("People", &settings),
            BuildErrorKind::InvalidServiceRoot(_)
        ));
    }

    #[test]
    fn path_error_carries_input() {
        let err = build("People//Friends", KeyDelimiterStyle::Parentheses, &UriBuilderSettings::new(ROOT))
            .unwrap_err();
        assert_eq!(err.input, "People//Friends");
        assert_eq!(
            err.kind,
            BuildErrorKind::PathSyntax(PathSyntaxError::EmptySegment { index: 1 })
        );
    }

    #[test]
    fn query_errors_map_to_kinds() {
        let settings = UriBuilderSettings::new(ROOT);
        assert!(matches!(
            kind("People?$count=yes", &settings),
            BuildErrorKind::InvalidLiteral(_)
        ));
        assert!(matches!(
            kind("People?$filter=A eq", &settings),
            BuildErrorKind::QuerySyntax(_)
        ));
        assert!(matches!(
            kind("People?$top=1&$top=2", &settings),
            BuildErrorKind::QuerySyntax(_)
        ));
        let shallow = UriBuilderSettings::new(ROOT).with_max_nesting_depth(2);
        assert!(matches!(
            kind("People?$filter=((((A))))", &shallow),
            BuildErrorKind::QueryTooComplex(_)
        ));
    }

    #[test]
    fn builder_uses_key_style() {
        let builder = UriBuilder::new()
            .key_delimiter(KeyDelimiterStyle::Slash)
            .settings(UriBuilderSettings::new(ROOT));
        assert_eq!(
            builder.build("People(1)").unwrap().as_str(),
            "http://gobbledygook/People/1"
        );
        assert_eq!(builder.configured_settings().max_nesting_depth, 32);
    }

    struct OnlyPeople;

    impl NavigationResolver for OnlyPeople {
        fn resolve_navigation_property(
            &self,
            type_context: Option<&ElementType>,
            name: &str,
        ) -> Option<ElementType> {
            match (type_context, name) {
                (None, "People") => Some(ElementType::collection("NS.Person")),
                (Some(_), "MyPaintings") => Some(ElementType::collection("NS.Painting")),
                _ => None,
            }
        }
    }

    #[test]
    fn builder_with_model() {
        let builder = UriBuilder::new()
            .model(Arc::new(OnlyPeople))
            .settings(UriBuilderSettings::new(ROOT));

        assert!(builder.build("People?$filter=MyPaintings/$count gt 1").is_ok());

        let err = builder.build("People?$filter=Cars/$count gt 1").unwrap_err();
        assert_eq!(
            err.kind,
            BuildErrorKind::Semantic(SemanticError::UnknownProperty {
                name: "Cars".into(),
                type_context: Some("NS.Person".into()),
            })
        );
    }

    #[test]
    fn free_function_skips_model() {
        assert_eq!(
            canonical("Anything?$filter=Cars/$count gt 1"),
            "http://gobbledygook/Anything?$filter=Cars%2F%24count%20gt%201"
        );
    }

    #[test]
    fn configured_builder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UriBuilder<Configured>>();
    }

    #[test]
    fn debug_hides_resolver() {
        let builder = UriBuilder::new().model(Arc::new(OnlyPeople));
        assert!(format!("{builder:?}").contains("has_model: true"));
    }
}
