//! Links computed by OData URL conventions.

use odata_uri::{CanonicalUri, REF_SEGMENT, escape_path_segment};
use url::Url;

use crate::error::LinkError;
use crate::traits::MetadataBuilder;

/// Computes links relative to an entity's edit link.
///
/// | Link | Computed as |
/// |------|-------------|
/// | Navigation | `{edit_link}/{name}` |
/// | Association | `{edit_link}/{name}/$ref` |
///
/// Names are escaped with the path profile of the core crate.
///
/// # Examples
///
/// ```
/// use odata_uri_links::{ConventionalMetadataBuilder, MetadataBuilder};
///
/// let builder = ConventionalMetadataBuilder::new("http://host/People(1)/").unwrap();
/// assert_eq!(
///     builder.association_link("Friends").unwrap().as_str(),
///     "http://host/People(1)/Friends/$ref"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalMetadataBuilder {
    edit_link: Url,
}

impl ConventionalMetadataBuilder {
    /// Creates a builder for the entity at `edit_link`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidEditLink`] if the link is not an absolute
    /// hierarchical URL, or carries a query or fragment.
    pub fn new(edit_link: &str) -> Result<Self, LinkError> {
        let invalid = |reason| LinkError::invalid_edit_link(edit_link, reason);

        let url = Url::parse(edit_link).map_err(|_| invalid("not an absolute URL"))?;
        if url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL"));
        }
        if url.query().is_some() {
            return Err(invalid("edit link must not carry a query"));
        }
        if url.fragment().is_some() {
            return Err(invalid("edit link must not carry a fragment"));
        }

        Ok(Self { edit_link: url })
    }

    /// Creates a builder for the entity a canonical request addresses.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidEditLink`] if the request carries query
    /// options.
    pub fn from_canonical(uri: &CanonicalUri) -> Result<Self, LinkError> {
        Self::new(uri.as_str())
    }

    /// Returns the edit link links are computed from.
    #[must_use]
    pub const fn edit_link(&self) -> &Url {
        &self.edit_link
    }

    fn append(&self, segments: &[&str]) -> Option<Url> {
        let mut link = self.edit_link.as_str().trim_end_matches('/').to_string();
        for segment in segments {
            link.push('/');
            link.push_str(&escape_path_segment(segment));
        }
        Url::parse(&link).ok()
    }
}

impl MetadataBuilder for ConventionalMetadataBuilder {
    fn navigation_link(&self, name: &str) -> Option<Url> {
        self.append(&[name])
    }

    fn association_link(&self, name: &str) -> Option<Url> {
        self.append(&[name, REF_SEGMENT])
    }
}

#[cfg(test)]
mod tests {
    use odata_uri::{KeyDelimiterStyle, UriBuilderSettings, build};

    use super::*;

    #[test]
    fn navigation_link() {
        let builder = ConventionalMetadataBuilder::new("http://host/odata/People(1)").unwrap();
        assert_eq!(
            builder.navigation_link("Friends").unwrap().as_str(),
            "http://host/odata/People(1)/Friends"
        );
    }

    #[test]
    fn name_is_path_escaped() {
        let builder = ConventionalMetadataBuilder::new("http://host/People(1)").unwrap();
        assert_eq!(
            builder.navigation_link("My Friends").unwrap().as_str(),
            "http://host/People(1)/My%20Friends"
        );
    }

    #[test]
    fn rejects_query_and_relative_links() {
        assert!(ConventionalMetadataBuilder::new("http://host/People(1)?$top=1").is_err());
        assert!(ConventionalMetadataBuilder::new("People(1)").is_err());
        assert!(ConventionalMetadataBuilder::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn from_canonical_request() {
        let settings = UriBuilderSettings::new("http://gobbledygook/");
        let uri = build("People(1)", KeyDelimiterStyle::Parentheses, &settings).unwrap();
        let builder = ConventionalMetadataBuilder::from_canonical(&uri).unwrap();
        assert_eq!(
            builder.navigation_link("MyPaintings").unwrap().as_str(),
            "http://gobbledygook/People(1)/MyPaintings"
        );

        let with_query = build("People(1)?$top=1", KeyDelimiterStyle::Parentheses, &settings).unwrap();
        assert!(ConventionalMetadataBuilder::from_canonical(&with_query).is_err());
    }
}
