//! A link value that may be supplied or computed on first read.

use url::Url;

/// Where a link's value came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeferredLink {
    /// No value yet
    #[default]
    Unset,
    /// Set by the caller or read from the wire; never recomputed
    Explicit(Url),
    /// Computed by a metadata builder on an earlier read
    Computed(Url),
}

/// The outcome of reading a [`DeferredLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRead<'a> {
    /// The link, `None` if unset and nothing could compute it
    pub uri: Option<&'a Url>,
    /// True if this read computed and cached the value
    pub freshly_computed: bool,
}

impl DeferredLink {
    /// Returns the current value without computing anything.
    #[must_use]
    pub const fn get(&self) -> Option<&Url> {
        match self {
            Self::Unset => None,
            Self::Explicit(url) | Self::Computed(url) => Some(url),
        }
    }

    /// Returns true if the link holds a value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Returns true if the value was set explicitly.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }

    /// Sets the link explicitly, replacing any computed value.
    pub fn set(&mut self, url: Url) {
        *self = Self::Explicit(url);
    }

    /// Reads the link, running `compute` only while it is unset.
    ///
    /// A computed value is cached, so later reads return it without calling
    /// `compute` again.
    ///
    /// # Examples
    ///
    /// ```
    /// use odata_uri_links::DeferredLink;
    /// use url::Url;
    ///
    /// let mut link = DeferredLink::Unset;
    /// let computed = Url::parse("http://host/People(1)/Friends").unwrap();
    ///
    /// let first = link.resolve_with(|| Some(computed.clone()));
    /// assert!(first.freshly_computed);
    ///
    /// let second = link.resolve_with(|| unreachable!());
    /// assert!(!second.freshly_computed);
    /// assert_eq!(second.uri, Some(&computed));
    /// ```
    pub fn resolve_with(&mut self, compute: impl FnOnce() -> Option<Url>) -> LinkRead<'_> {
        let mut freshly_computed = false;
        if matches!(self, Self::Unset)
            && let Some(url) = compute()
        {
            *self = Self::Computed(url);
            freshly_computed = true;
        }

        LinkRead {
            uri: self.get(),
            freshly_computed,
        }
    }
}
