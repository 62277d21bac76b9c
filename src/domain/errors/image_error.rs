//! Image fetch and decode error types.

use thiserror::Error;

/// Failures while retrieving image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },

    #[error("response body was empty")]
    EmptyBody,
}

impl FetchError {
    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates HTTP status error.
    #[must_use]
    pub const fn http(status: u16) -> Self {
        Self::Http { status }
    }

    /// Returns the HTTP status for status errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }
}

/// The bytes were not a valid or supported image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode image: {reason}")]
pub struct DecodeError {
    reason: String,
}

impl DecodeError {
    /// Creates decode error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the failure reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Any failure along the fetch-and-decode path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Fetch stage failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Decode stage failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ImageError {
    /// Short classification used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(FetchError::InvalidUrl { .. }) => "invalid_url",
            Self::Fetch(FetchError::Transport { .. }) => "transport",
            Self::Fetch(FetchError::Http { .. }) => "http",
            Self::Fetch(FetchError::EmptyBody) => "empty_body",
            Self::Decode(_) => "decode",
        }
    }

    /// Returns whether the failure came from the network layer.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::Fetch(FetchError::Transport { .. } | FetchError::Http { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ImageError::from(FetchError::invalid_url("nope", "relative URL")).kind(),
            "invalid_url"
        );
        assert_eq!(ImageError::from(FetchError::http(404)).kind(), "http");
        assert_eq!(ImageError::from(FetchError::EmptyBody).kind(), "empty_body");
        assert_eq!(ImageError::from(DecodeError::new("bad magic")).kind(), "decode");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            FetchError::http(503).to_string(),
            "unexpected HTTP status 503"
        );
        assert_eq!(
            ImageError::from(DecodeError::new("truncated")).to_string(),
            "failed to decode image: truncated"
        );
    }

    #[test]
    fn test_network_errors() {
        assert!(ImageError::from(FetchError::transport("refused")).is_network_error());
        assert!(ImageError::from(FetchError::http(500)).is_network_error());
        assert!(!ImageError::from(FetchError::EmptyBody).is_network_error());
        assert_eq!(FetchError::http(404).status(), Some(404));
        assert_eq!(FetchError::EmptyBody.status(), None);
    }
}
