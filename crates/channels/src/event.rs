use serde::Serialize;

use crate::{
    ids::{ChannelId, GuildId, MessageId, UserId},
    sink::ChannelDisplay,
};

// ── Inbound events ──────────────────────────────────────────────────────────

/// Everything a transport can deliver to the availability core.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    /// The transport finished connecting. Fired once per session; the core
    /// tolerates repeats caused by reconnects.
    Ready,
    /// A message was posted in a guild channel.
    MessagePosted(PostedMessage),
    /// A slash command was invoked in a guild channel.
    CommandInvoked(CommandInvocation),
    /// A member left a guild.
    MemberLeft { guild_id: GuildId, user_id: UserId },
    /// Channels of a guild were created, moved, renamed or deleted. Carries
    /// the full new layout in display order.
    LayoutChanged {
        guild_id: GuildId,
        layout: Vec<ChannelDisplay>,
    },
}

/// A message posted in a guild text channel.
#[derive(Debug, Clone, Serialize)]
pub struct PostedMessage {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub author_id: UserId,
    /// Author is a bot account.
    pub author_is_bot: bool,
    /// Message was posted through a webhook.
    pub is_webhook: bool,
    /// Message this one replies to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
}

impl PostedMessage {
    /// Bots and webhooks never claim a channel.
    #[must_use]
    pub fn is_automated(&self) -> bool {
        self.author_is_bot || self.is_webhook
    }
}

/// A slash command invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CommandInvocation {
    pub guild_id: GuildId,
    /// Display name of the guild, used in user-facing errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_name: Option<String>,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    /// Command name without the leading slash.
    pub command: String,
}

// ── Replies ─────────────────────────────────────────────────────────────────

/// Reply the transport should deliver for a handled event.
///
/// Message events are answered with a reply to the posted message, command
/// events with an interaction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Reply {
    /// Regular reply, visible to everyone in the channel.
    Message(String),
    /// Error reply, shown only to the invoking user where supported.
    Error(String),
}

impl Reply {
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Message(text) | Self::Error(text) => text,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
