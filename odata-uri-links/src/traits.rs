//! Link computation trait.

use url::Url;

/// Computes links that a payload did not carry.
///
/// A [`NestedResourceInfo`](crate::NestedResourceInfo) asks its builder only
/// while the link is unset, and caches whatever comes back.
/// Implementations may follow URL conventions (see
/// [`ConventionalMetadataBuilder`](crate::ConventionalMetadataBuilder)) or
/// read model annotations.
pub trait MetadataBuilder: Send + Sync {
    /// Computes the navigation link for the navigation property `name`.
    ///
    /// Returns `None` if no link can be computed.
    fn navigation_link(&self, name: &str) -> Option<Url>;

    /// Computes the association (`$ref`) link for the navigation property
    /// `name`.
    ///
    /// Returns `None` if no link can be computed.
    fn association_link(&self, name: &str) -> Option<Url>;
}
