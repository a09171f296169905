//! Navigation property links attached to a resource in a response.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::link::{DeferredLink, LinkRead};
use crate::traits::MetadataBuilder;

/// A navigation property of a resource, with its links.
///
/// The navigation link and the association link may be supplied by the
/// caller (or read from the wire), or computed on first read by an attached
/// [`MetadataBuilder`]. A computed value is cached; a supplied value is
/// never replaced by a computed one.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use odata_uri_links::{ConventionalMetadataBuilder, NestedResourceInfo};
///
/// let builder = ConventionalMetadataBuilder::new("http://host/People(1)").unwrap();
/// let mut info = NestedResourceInfo::new("Friends").with_metadata_builder(Arc::new(builder));
///
/// let read = info.url();
/// assert!(read.freshly_computed);
/// assert_eq!(read.uri.map(|u| u.as_str()), Some("http://host/People(1)/Friends"));
///
/// assert!(!info.url().freshly_computed);
/// ```
#[derive(Clone)]
pub struct NestedResourceInfo {
    name: String,
    is_collection: Option<bool>,
    url: DeferredLink,
    association_link_url: DeferredLink,
    context_url: Option<Url>,
    metadata_builder: Option<Arc<dyn MetadataBuilder>>,
}

impl NestedResourceInfo {
    /// Creates info for the navigation property `name` with no links.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_collection: None,
            url: DeferredLink::Unset,
            association_link_url: DeferredLink::Unset,
            context_url: None,
            metadata_builder: None,
        }
    }

    /// Sets whether the navigation yields a collection.
    #[must_use]
    pub const fn with_is_collection(mut self, is_collection: bool) -> Self {
        self.is_collection = Some(is_collection);
        self
    }

    /// Attaches the builder used to compute missing links.
    #[must_use]
    pub fn with_metadata_builder(mut self, builder: Arc<dyn MetadataBuilder>) -> Self {
        self.metadata_builder = Some(builder);
        self
    }

    /// Returns the navigation property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the navigation yields a collection, if known.
    #[must_use]
    pub const fn is_collection(&self) -> Option<bool> {
        self.is_collection
    }

    /// Returns the context URL, if set.
    #[must_use]
    pub const fn context_url(&self) -> Option<&Url> {
        self.context_url.as_ref()
    }

    /// Sets the context URL.
    pub fn set_context_url(&mut self, url: Url) {
        self.context_url = Some(url);
    }

    /// Reads the navigation link, computing it if unset.
    pub fn url(&mut self) -> LinkRead<'_> {
        let read = self.url.resolve_with(|| {
            self.metadata_builder
                .as_ref()
                .and_then(|builder| builder.navigation_link(&self.name))
        });
        if read.freshly_computed {
            tracing::trace!(name = %self.name, "computed navigation link");
        }
        read
    }

    /// Sets the navigation link; it is never recomputed afterwards.
    pub fn set_url(&mut self, url: Url) {
        self.url.set(url);
    }

    /// Reads the association link, computing it if unset.
    pub fn association_link_url(&mut self) -> LinkRead<'_> {
        let read = self.association_link_url.resolve_with(|| {
            self.metadata_builder
                .as_ref()
                .and_then(|builder| builder.association_link(&self.name))
        });
        if read.freshly_computed {
            tracing::trace!(name = %self.name, "computed association link");
        }
        read
    }

    /// Sets the association link; it is never recomputed afterwards.
    pub fn set_association_link_url(&mut self, url: Url) {
        self.association_link_url.set(url);
    }

    /// Returns the navigation link state without computing anything.
    #[must_use]
    pub const fn url_state(&self) -> &DeferredLink {
        &self.url
    }

    /// Returns the association link state without computing anything.
    #[must_use]
    pub const fn association_link_state(&self) -> &DeferredLink {
        &self.association_link_url
    }
}

impl fmt::Debug for NestedResourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedResourceInfo")
            .field("name", &self.name)
            .field("is_collection", &self.is_collection)
            .field("url", &self.url)
            .field("association_link_url", &self.association_link_url)
            .field("context_url", &self.context_url)
            .field("has_metadata_builder", &self.metadata_builder.is_some())
            .finish()
    }
}
