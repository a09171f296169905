//! Error types for link computation.

use std::fmt;

/// Errors that can occur when configuring link computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The edit link cannot serve as a base for computed links.
    InvalidEditLink {
        /// The rejected edit link
        link: String,
        /// Reason the link is unusable
        reason: &'static str,
    },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEditLink { link, reason } => {
                write!(
                    f,
                    "edit link '{link}' cannot be used to compute links: {reason}"
                )
            }
        }
    }
}

impl std::error::Error for LinkError {}

impl LinkError {
    /// Creates an `InvalidEditLink` error.
    #[must_use]
    pub fn invalid_edit_link(link: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidEditLink {
            link: link.into(),
            reason,
        }
    }
}
