use {async_trait::async_trait, serde::Serialize};

use crate::{
    Result,
    ids::{ChannelId, GuildId, MessageId, UserId},
};

/// Rendered status summary, posted as a titled card (an embed on Discord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCard {
    pub title: String,
    pub body: String,
    /// Accent colour as `0xRRGGBB`.
    pub color: u32,
}

/// One message from a channel's recent history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub message_id: MessageId,
    pub author_id: UserId,
    /// Authored by the bot account itself.
    pub is_self: bool,
    /// Carries a rendered status card.
    pub has_status_payload: bool,
}

/// Platform display info for one channel.
///
/// Sinks return these in the order the chat client shows them; `group` is
/// the category the channel sits under, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelDisplay {
    pub channel_id: ChannelId,
    pub group: Option<String>,
}

/// Outbound half of a chat platform, as seen by the availability core.
#[async_trait]
pub trait MessagingSink: Send + Sync {
    /// Post a new status card and return the id of the created message.
    async fn send_status(&self, channel_id: ChannelId, card: &StatusCard) -> Result<MessageId>;

    /// Replace the card of an existing status message in place.
    async fn edit_status(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        card: &StatusCard,
    ) -> Result<()>;

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()>;

    /// Most recent messages first, at most `limit` entries.
    async fn fetch_recent_history(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> Result<Vec<HistoryEntry>>;

    /// Id of the newest message in the channel, `None` for an empty channel.
    async fn latest_message_id(&self, channel_id: ChannelId) -> Result<Option<MessageId>> {
        let history = self.fetch_recent_history(channel_id, 1).await?;
        Ok(history.first().map(|entry| entry.message_id))
    }

    /// Display order and grouping of the guild's channels. `None` when the
    /// platform has no notion of it. Fetched once at startup; later changes
    /// arrive as [`InboundEvent::LayoutChanged`](crate::InboundEvent::LayoutChanged).
    async fn channel_layout(&self, _guild_id: GuildId) -> Result<Option<Vec<ChannelDisplay>>> {
        Ok(None)
    }
}

/// Answers "is someone using this channel right now" once, at startup.
#[async_trait]
pub trait ActivityProbe: Send + Sync {
    /// Author of the latest human message if the channel still looks in use.
    async fn recent_occupant(&self, channel_id: ChannelId) -> Result<Option<UserId>>;
}
