//! Keeps each guild's status message in sync with the monitor.

use std::sync::Arc;

use {
    freebot_channels::{ChannelId, GuildId, MessageId, MessagingSink, StatusCard},
    tokio::task::JoinHandle,
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result,
    cache::{StatusMessageCache, StatusMessageRef, resolve_locked},
    monitor::ChannelMonitor,
    render,
};

/// What a successful publish did to the status channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No status message existed, a new one was posted.
    Sent(MessageId),
    /// The status message was still the newest message and was edited.
    Edited(MessageId),
    /// The status message had been buried, so it was deleted and reposted.
    Replaced { stale: MessageId, new: MessageId },
}

impl PublishOutcome {
    /// Id of the message that now holds the summary.
    pub fn message_id(self) -> MessageId {
        match self {
            Self::Sent(id) | Self::Edited(id) => id,
            Self::Replaced { new, .. } => new,
        }
    }
}

pub struct StatusPublisher {
    monitor: Arc<ChannelMonitor>,
    sink: Arc<dyn MessagingSink>,
    cache: StatusMessageCache,
}

impl StatusPublisher {
    pub fn new(monitor: Arc<ChannelMonitor>, sink: Arc<dyn MessagingSink>) -> Self {
        Self {
            monitor,
            sink,
            cache: StatusMessageCache::new(),
        }
    }

    pub fn cache(&self) -> &StatusMessageCache {
        &self.cache
    }

    /// Publish in the background. Failures are logged, never returned.
    pub fn spawn_publish(self: &Arc<Self>, guild_id: GuildId) -> JoinHandle<()> {
        let publisher = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(guild_id).await {
                warn!(%guild_id, error = %e, "failed to publish channel status");
            }
        })
    }

    /// Render the guild's summary and bring its status channel up to date.
    ///
    /// Runs under the status channel's cache lock, so publishes for one
    /// channel never interleave and the last one to run renders the latest
    /// state. The cache only changes after the platform confirmed the call.
    pub async fn publish(&self, guild_id: GuildId) -> Result<PublishOutcome> {
        let status = self.monitor.get_status_channel_for(guild_id)?;
        let channel_id = status.channel_id;
        let mut entry = self.cache.lock(channel_id).await;

        let card = render::status_card(self.monitor.status_message(guild_id)?);
        let sink = self.sink.as_ref();

        let stale = match resolve_locked(sink, channel_id, &mut entry).await? {
            StatusMessageRef::Present(id) => id,
            StatusMessageRef::Unknown | StatusMessageRef::Absent => {
                let new = sink
                    .send_status(channel_id, &card)
                    .await
                    .map_err(|e| Error::publish(format!("send status to {channel_id}"), e))?;
                *entry = StatusMessageRef::Present(new);
                info!(%guild_id, %channel_id, message_id = %new, "posted status message");
                return Ok(PublishOutcome::Sent(new));
            },
        };

        let latest = sink
            .latest_message_id(channel_id)
            .await
            .map_err(|e| Error::publish(format!("read latest message of {channel_id}"), e))?;

        if latest == Some(stale) {
            return Self::edit(sink, channel_id, stale, &card, &mut entry).await;
        }

        match sink.delete_message(channel_id, stale).await {
            Ok(()) => {},
            Err(e) if e.is_unavailable() => {
                warn!(%channel_id, message_id = %stale, error = %e, "cannot delete buried status message, editing it in place");
                return Self::edit(sink, channel_id, stale, &card, &mut entry).await;
            },
            Err(e) => {
                warn!(%channel_id, message_id = %stale, error = %e, "could not delete stale status message");
            },
        }
        let new = sink
            .send_status(channel_id, &card)
            .await
            .map_err(|e| Error::publish(format!("repost status to {channel_id}"), e))?;
        *entry = StatusMessageRef::Present(new);
        info!(%guild_id, %channel_id, stale = %stale, message_id = %new, "reposted status message");
        Ok(PublishOutcome::Replaced { stale, new })
    }

    /// Edit the cached message. A message the platform no longer knows
    /// resets the entry so the next publish reconciles again.
    async fn edit(
        sink: &dyn MessagingSink,
        channel_id: ChannelId,
        message_id: MessageId,
        card: &StatusCard,
        entry: &mut StatusMessageRef,
    ) -> Result<PublishOutcome> {
        match sink.edit_status(channel_id, message_id, card).await {
            Ok(()) => {
                debug!(%channel_id, %message_id, "edited status message");
                Ok(PublishOutcome::Edited(message_id))
            },
            Err(e) => {
                if e.is_not_found() {
                    *entry = StatusMessageRef::Unknown;
                }
                Err(Error::publish(format!("edit status message {message_id}"), e))
            },
        }
    }

    /// Ask the sink for the guild's channel layout. Called once at startup;
    /// later changes arrive as [`freebot_channels::InboundEvent::LayoutChanged`].
    pub async fn refresh_layout(&self, guild_id: GuildId) {
        match self.sink.channel_layout(guild_id).await {
            Ok(Some(layout)) => {
                self.monitor.update_layout(guild_id, layout);
            },
            Ok(None) => {},
            Err(e) => debug!(%guild_id, error = %e, "channel layout unavailable, keeping last known"),
        }
    }
}
