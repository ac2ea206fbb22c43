//! Discord implementation of the messaging sink and activity probe.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    chrono::Utc,
    serenity::{
        all::{ChannelType, GuildChannel, Message},
        builder::{CreateEmbed, CreateMessage, EditMessage, GetMessages},
        http::Http,
        model::id as serenity_id,
    },
    tracing::debug,
};

use freebot_channels::{
    ActivityProbe, ChannelDisplay, ChannelId, Error, GuildId, HistoryEntry, MessageId,
    MessagingSink, Result, StatusCard, UserId,
};

/// Talks to Discord over REST on behalf of the availability core.
pub struct DiscordSink {
    http: Arc<Http>,
    bot_user_id: UserId,
    /// Embed title that marks a message as a status card.
    status_title: String,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>, bot_user_id: UserId, status_title: impl Into<String>) -> Self {
        Self {
            http,
            bot_user_id,
            status_title: status_title.into(),
        }
    }

    fn history_entry(&self, message: &Message) -> HistoryEntry {
        let author_id = UserId::new(message.author.id.get());
        HistoryEntry {
            message_id: MessageId::new(message.id.get()),
            author_id,
            is_self: author_id == self.bot_user_id,
            has_status_payload: message
                .embeds
                .iter()
                .any(|embed| embed.title.as_deref() == Some(self.status_title.as_str())),
        }
    }
}

fn channel(id: ChannelId) -> serenity_id::ChannelId {
    serenity_id::ChannelId::new(id.get())
}

fn embed(card: &StatusCard) -> CreateEmbed {
    CreateEmbed::new()
        .title(&card.title)
        .description(&card.body)
        .colour(card.color)
}

/// Map a serenity failure, keeping "unknown message/channel" and missing
/// permissions distinguishable.
pub(crate) fn map_err(context: String, err: serenity::Error) -> Error {
    let status = match &err {
        serenity::Error::Http(http) => http.status_code().map(|status| status.as_u16()),
        _ => None,
    };
    match status {
        Some(404) => Error::not_found(context),
        Some(403) => Error::unavailable(format!("{context}: missing permission")),
        _ => Error::external(context, err),
    }
}

#[async_trait]
impl MessagingSink for DiscordSink {
    async fn send_status(&self, channel_id: ChannelId, card: &StatusCard) -> Result<MessageId> {
        let message = channel(channel_id)
            .send_message(&*self.http, CreateMessage::new().embed(embed(card)))
            .await
            .map_err(|e| map_err(format!("send to channel {channel_id}"), e))?;
        Ok(MessageId::new(message.id.get()))
    }

    async fn edit_status(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        card: &StatusCard,
    ) -> Result<()> {
        channel(channel_id)
            .edit_message(
                &*self.http,
                serenity_id::MessageId::new(message_id.get()),
                EditMessage::new().embed(embed(card)),
            )
            .await
            .map_err(|e| map_err(format!("message {message_id} in channel {channel_id}"), e))?;
        Ok(())
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        channel(channel_id)
            .delete_message(&*self.http, serenity_id::MessageId::new(message_id.get()))
            .await
            .map_err(|e| map_err(format!("message {message_id} in channel {channel_id}"), e))
    }

    async fn fetch_recent_history(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> Result<Vec<HistoryEntry>> {
        let messages = channel(channel_id)
            .messages(&*self.http, GetMessages::new().limit(limit))
            .await
            .map_err(|e| map_err(format!("history of channel {channel_id}"), e))?;
        Ok(messages.iter().map(|m| self.history_entry(m)).collect())
    }

    /// One REST call, made at startup before the gateway has cached guilds.
    async fn channel_layout(&self, guild_id: GuildId) -> Result<Option<Vec<ChannelDisplay>>> {
        let channels = serenity_id::GuildId::new(guild_id.get())
            .channels(&*self.http)
            .await
            .map_err(|e| map_err(format!("channels of guild {guild_id}"), e))?;
        let infos: Vec<ChannelInfo> = channels.values().map(ChannelInfo::from).collect();
        Ok(Some(display_order(&infos)))
    }
}

/// The parts of a guild channel that decide where the client shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub is_category: bool,
    pub parent: Option<u64>,
    pub position: u16,
}

impl From<&GuildChannel> for ChannelInfo {
    fn from(channel: &GuildChannel) -> Self {
        Self {
            id: channel.id.get(),
            name: channel.name.clone(),
            is_category: channel.kind == ChannelType::Category,
            parent: channel.parent_id.map(|id| id.get()),
            position: channel.position,
        }
    }
}

/// Order channels the way the Discord client lists them: uncategorised
/// channels first, then each category by position, children by position
/// and id within it.
pub(crate) fn display_order(channels: &[ChannelInfo]) -> Vec<ChannelDisplay> {
    let category = |id: u64| channels.iter().find(|c| c.is_category && c.id == id);

    let mut listed: Vec<(Option<(u16, u64)>, u16, u64, Option<String>)> = channels
        .iter()
        .filter(|c| !c.is_category)
        .map(|c| {
            let parent = c.parent.and_then(category);
            (
                parent.map(|p| (p.position, p.id)),
                c.position,
                c.id,
                parent.map(|p| p.name.clone()),
            )
        })
        .collect();
    listed.sort_by_key(|(parent, position, id, _)| (*parent, *position, *id));

    listed
        .into_iter()
        .map(|(_, _, id, group)| ChannelDisplay {
            channel_id: ChannelId::new(id),
            group,
        })
        .collect()
}

/// Treats a channel as in use when its latest human message is recent.
pub struct DiscordActivityProbe {
    http: Arc<Http>,
    busy_window: Duration,
    scan_limit: u8,
}

impl DiscordActivityProbe {
    pub fn new(http: Arc<Http>, busy_window: Duration, scan_limit: u8) -> Self {
        Self {
            http,
            busy_window,
            scan_limit,
        }
    }
}

/// Whether a message posted at `posted_at` (unix seconds) is still inside
/// the busy window at `now`.
pub(crate) fn within_window(posted_at: i64, now: i64, window: Duration) -> bool {
    let window = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(posted_at) < window
}

#[async_trait]
impl ActivityProbe for DiscordActivityProbe {
    async fn recent_occupant(&self, channel_id: ChannelId) -> Result<Option<UserId>> {
        let messages = channel(channel_id)
            .messages(&*self.http, GetMessages::new().limit(self.scan_limit))
            .await
            .map_err(|e| map_err(format!("history of channel {channel_id}"), e))?;

        let now = Utc::now().timestamp();
        let occupant = messages
            .iter()
            .find(|m| !m.author.bot && m.webhook_id.is_none())
            .filter(|m| within_window(m.timestamp.unix_timestamp(), now, self.busy_window))
            .map(|m| UserId::new(m.author.id.get()));

        debug!(%channel_id, ?occupant, scanned = messages.len(), "probed channel activity");
        Ok(occupant)
    }
}
