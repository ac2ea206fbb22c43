use std::error::Error as StdError;

use freebot_channels::{ChannelId, GuildId};

use crate::strings;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the availability core.
///
/// Everything except [`Error::Publish`] and [`Error::Configuration`] is meant
/// for the user who triggered it; see [`Error::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command arrived before startup reconciliation finished.
    #[error("monitor is not ready yet")]
    NotReady,

    /// The guild has no monitored channels or status channel.
    #[error("guild {guild_id} is not configured for channel monitoring")]
    NotConfigured {
        guild_id: GuildId,
        guild_name: Option<String>,
    },

    /// The channel is not tracked for busy/free status.
    #[error("channel {channel_id} is not monitored")]
    NotMonitored { channel_id: ChannelId },

    /// `/free` on a channel that is already free.
    #[error("channel {channel_id} is already free")]
    AlreadyFree { channel_id: ChannelId },

    /// Ambiguous or conflicting configuration, fatal at startup.
    #[error("invalid monitor configuration: {message}")]
    Configuration { message: String },

    /// Sending, editing, deleting or scanning the status message failed.
    #[error("status publish failed: {context}: {source}")]
    Publish {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn not_configured(guild_id: GuildId) -> Self {
        Self::NotConfigured {
            guild_id,
            guild_name: None,
        }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn publish(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Publish {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Attach the guild's display name to a [`Error::NotConfigured`].
    #[must_use]
    pub fn with_guild_name(self, name: Option<&str>) -> Self {
        match self {
            Self::NotConfigured { guild_id, .. } => Self::NotConfigured {
                guild_id,
                guild_name: name.map(str::to_owned),
            },
            other => other,
        }
    }

    /// Short text to show the user whose action failed, `None` for internal
    /// failures that are only logged.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::NotReady => Some(strings::NOT_READY.to_string()),
            Self::NotConfigured {
                guild_id,
                guild_name,
            } => {
                let name = guild_name
                    .clone()
                    .unwrap_or_else(|| guild_id.to_string());
                Some(strings::not_configured(&name))
            },
            Self::NotMonitored { .. } => Some(strings::NOT_MONITORED.to_string()),
            Self::AlreadyFree { .. } => Some(strings::ALREADY_FREE.to_string()),
            Self::Configuration { .. } | Self::Publish { .. } => None,
        }
    }
}
