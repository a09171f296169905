//! Deferred navigation and association links for OData responses.
//!
//! A resource in a response carries one [`NestedResourceInfo`] per
//! navigation property. Its links may come from the payload, or be computed
//! on first read by a [`MetadataBuilder`]:
//!
//! - **Deferred values**: [`DeferredLink`] records whether a link is unset,
//!   set explicitly, or computed
//! - **Trait interface**: [`MetadataBuilder`] for computing missing links
//! - **Conventions**: [`ConventionalMetadataBuilder`] derives links from an
//!   entity's edit link
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use odata_uri::{KeyDelimiterStyle, UriBuilderSettings, build};
//! use odata_uri_links::{ConventionalMetadataBuilder, NestedResourceInfo};
//!
//! let settings = UriBuilderSettings::new("http://gobbledygook/");
//! let entity = build("People(1)", KeyDelimiterStyle::Parentheses, &settings).unwrap();
//!
//! let builder = ConventionalMetadataBuilder::from_canonical(&entity).unwrap();
//! let mut friends = NestedResourceInfo::new("Friends")
//!     .with_is_collection(true)
//!     .with_metadata_builder(Arc::new(builder));
//!
//! let read = friends.association_link_url();
//! assert!(read.freshly_computed);
//! assert_eq!(
//!     read.uri.map(|u| u.as_str()),
//!     Some("http://gobbledygook/People(1)/Friends/$ref")
//! );
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod conventional;
mod error;
mod link;
mod nested_resource_info;
mod traits;

pub use conventional::ConventionalMetadataBuilder;
pub use error::LinkError;
pub use link::{DeferredLink, LinkRead};
pub use nested_resource_info::NestedResourceInfo;
pub use traits::MetadataBuilder;
