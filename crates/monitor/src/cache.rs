//! Which message currently holds each status channel's summary.

use std::sync::Arc;

use {
    dashmap::DashMap,
    freebot_channels::{ChannelId, MessageId, MessagingSink},
    tokio::sync::{Mutex, OwnedMutexGuard},
    tracing::{debug, info},
};

use crate::{Error, Result};

/// How many recent messages the cold-start scan inspects.
pub const RECONCILE_HISTORY_LIMIT: u8 = 100;

/// Cached knowledge about a status channel's summary message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMessageRef {
    /// Not looked up yet in this process.
    #[default]
    Unknown,
    /// Looked up, no status message exists.
    Absent,
    Present(MessageId),
}

impl StatusMessageRef {
    pub fn message_id(self) -> Option<MessageId> {
        match self {
            Self::Present(id) => Some(id),
            Self::Unknown | Self::Absent => None,
        }
    }
}

/// Per status channel cache of the summary message id.
///
/// Each channel has its own async lock; [`StatusMessageCache::lock`] hands it
/// out so a publisher can hold it across a whole reconcile/edit/repost
/// sequence.
#[derive(Debug, Default)]
pub struct StatusMessageCache {
    entries: DashMap<ChannelId, Arc<Mutex<StatusMessageRef>>>,
}

impl StatusMessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, channel_id: ChannelId) -> Arc<Mutex<StatusMessageRef>> {
        Arc::clone(self.entries.entry(channel_id).or_default().value())
    }

    /// Exclusive access to the channel's entry.
    pub async fn lock(&self, channel_id: ChannelId) -> OwnedMutexGuard<StatusMessageRef> {
        self.slot(channel_id).lock_owned().await
    }

    /// Current entry, waiting for any in-flight publish on the channel.
    pub async fn get(&self, channel_id: ChannelId) -> StatusMessageRef {
        *self.lock(channel_id).await
    }

    /// Forget what is known so the next need scans history again.
    pub async fn invalidate(&self, channel_id: ChannelId) {
        *self.lock(channel_id).await = StatusMessageRef::Unknown;
        debug!(%channel_id, "status message cache invalidated");
    }

    /// Resolve the channel's status message, scanning history if the entry
    /// is still unknown.
    pub async fn resolve(
        &self,
        sink: &dyn MessagingSink,
        channel_id: ChannelId,
    ) -> Result<StatusMessageRef> {
        let mut entry = self.lock(channel_id).await;
        resolve_locked(sink, channel_id, &mut entry).await
    }
}

/// Resolve an entry the caller already holds the lock for.
///
/// A failed scan leaves the entry unknown so the next call retries it.
pub async fn resolve_locked(
    sink: &dyn MessagingSink,
    channel_id: ChannelId,
    entry: &mut StatusMessageRef,
) -> Result<StatusMessageRef> {
    if *entry == StatusMessageRef::Unknown {
        *entry = scan_history(sink, channel_id).await?;
    }
    Ok(*entry)
}

/// Look for the newest bot-authored status message in recent history.
async fn scan_history(sink: &dyn MessagingSink, channel_id: ChannelId) -> Result<StatusMessageRef> {
    let history = sink
        .fetch_recent_history(channel_id, RECONCILE_HISTORY_LIMIT)
        .await
        .map_err(|e| Error::publish(format!("scan history of status channel {channel_id}"), e))?;

    let found = history
        .iter()
        .find(|message| message.is_self && message.has_status_payload)
        .map(|message| message.message_id);

    info!(
        %channel_id,
        scanned = history.len(),
        message_id = ?found,
        "reconciled status message"
    );
    Ok(found.map_or(StatusMessageRef::Absent, StatusMessageRef::Present))
}
