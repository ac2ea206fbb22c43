use std::error::Error as StdError;

/// Result type for messaging-sink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors returned by platform transports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The addressed channel or message no longer exists on the platform.
    #[error("not found on platform: {what}")]
    NotFound { what: String },

    /// The transport is not connected or lacks permission.
    #[error("messaging unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from the platform client.
    #[error("messaging operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: what.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether the platform reported the target as gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the platform refused the call, typically for lack of
    /// permission. Retrying will not help.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
