//! In-memory messaging sink that records every call.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use {
    async_trait::async_trait,
    freebot_channels::{
        ActivityProbe, ChannelDisplay, ChannelId, Error, GuildId, HistoryEntry, MessageId,
        MessagingSink, Result, StatusCard, UserId,
    },
};

pub const BOT_USER: UserId = UserId::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    Send(ChannelId, MessageId),
    Edit(ChannelId, MessageId),
    Delete(ChannelId, MessageId),
}

#[derive(Default)]
struct Inner {
    histories: HashMap<ChannelId, Vec<HistoryEntry>>,
    layouts: HashMap<GuildId, Vec<ChannelDisplay>>,
    cards: HashMap<MessageId, StatusCard>,
    calls: Vec<SinkCall>,
    history_limits: Vec<u8>,
    layout_requests: usize,
    next_id: u64,
    fail_send: bool,
    fail_edit: bool,
    edit_not_found: bool,
    fail_delete: bool,
    deny_delete: bool,
    fail_history: bool,
}

/// Keeps a fake history per channel (newest first) that sends, deletes and
/// [`RecordingSink::post_foreign`] update.
pub struct RecordingSink {
    inner: Mutex<Inner>,
}

pub fn history(id: u64, is_self: bool, has_status_payload: bool) -> HistoryEntry {
    HistoryEntry {
        message_id: MessageId::new(id),
        author_id: if is_self {
            BOT_USER
        } else {
            UserId::new(2)
        },
        is_self,
        has_status_payload,
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1000,
                ..Default::default()
            }),
        }
    }

    pub fn set_history(&self, channel_id: ChannelId, entries: Vec<HistoryEntry>) {
        self.inner
            .lock()
            .unwrap()
            .histories
            .insert(channel_id, entries);
    }

    pub fn set_layout(&self, guild_id: GuildId, layout: Vec<ChannelDisplay>) {
        self.inner.lock().unwrap().layouts.insert(guild_id, layout);
    }

    /// Someone else posts in the channel, pushing older messages up.
    pub fn post_foreign(&self, channel_id: ChannelId, id: u64) {
        self.inner
            .lock()
            .unwrap()
            .histories
            .entry(channel_id)
            .or_default()
            .insert(0, history(id, false, false));
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn history_limits(&self) -> Vec<u8> {
        self.inner.lock().unwrap().history_limits.clone()
    }

    pub fn layout_requests(&self) -> usize {
        self.inner.lock().unwrap().layout_requests
    }

    pub fn card(&self, message_id: MessageId) -> Option<StatusCard> {
        self.inner.lock().unwrap().cards.get(&message_id).cloned()
    }

    pub fn fail_send(&self, fail: bool) {
        self.inner.lock().unwrap().fail_send = fail;
    }

    pub fn fail_edit(&self, fail: bool) {
        self.inner.lock().unwrap().fail_edit = fail;
    }

    /// Edits report the message as gone even though history still lists it.
    pub fn edit_not_found(&self, gone: bool) {
        self.inner.lock().unwrap().edit_not_found = gone;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.inner.lock().unwrap().fail_delete = fail;
    }

    /// Deletes are refused as if the bot lacked the permission.
    pub fn deny_delete(&self, deny: bool) {
        self.inner.lock().unwrap().deny_delete = deny;
    }

    pub fn fail_history(&self, fail: bool) {
        self.inner.lock().unwrap().fail_history = fail;
    }
}

fn transport_down() -> Error {
    Error::external("fake transport", std::io::Error::other("connection reset"))
}

#[async_trait]
impl MessagingSink for RecordingSink {
    async fn send_status(&self, channel_id: ChannelId, card: &StatusCard) -> Result<MessageId> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_send {
            return Err(transport_down());
        }
        inner.next_id += 1;
        let id = MessageId::new(inner.next_id);
        inner
            .histories
            .entry(channel_id)
            .or_default()
            .insert(0, history(id.get(), true, true));
        inner.cards.insert(id, card.clone());
        inner.calls.push(SinkCall::Send(channel_id, id));
        Ok(id)
    }

    async fn edit_status(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        card: &StatusCard,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_edit {
            return Err(transport_down());
        }
        let exists = inner
            .histories
            .get(&channel_id)
            .is_some_and(|h| h.iter().any(|m| m.message_id == message_id));
        if !exists || inner.edit_not_found {
            return Err(Error::not_found(format!("message {message_id}")));
        }
        inner.cards.insert(message_id, card.clone());
        inner.calls.push(SinkCall::Edit(channel_id, message_id));
        Ok(())
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete {
            return Err(transport_down());
        }
        if inner.deny_delete {
            return Err(Error::unavailable("missing permission"));
        }
        if let Some(history) = inner.histories.get_mut(&channel_id) {
            history.retain(|m| m.message_id != message_id);
        }
        inner.calls.push(SinkCall::Delete(channel_id, message_id));
        Ok(())
    }

    async fn fetch_recent_history(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> Result<Vec<HistoryEntry>> {
        let mut inner = self.inner.lock().unwrap();
        inner.history_limits.push(limit);
        if inner.fail_history {
            return Err(transport_down());
        }
        Ok(inner
            .histories
            .get(&channel_id)
            .map(|h| h.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn latest_message_id(&self, channel_id: ChannelId) -> Result<Option<MessageId>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_history {
            return Err(transport_down());
        }
        Ok(inner
            .histories
            .get(&channel_id)
            .and_then(|h| h.first())
            .map(|m| m.message_id))
    }

    async fn channel_layout(&self, guild_id: GuildId) -> Result<Option<Vec<ChannelDisplay>>> {
        let mut inner = self.inner.lock().unwrap();
        inner.layout_requests += 1;
        Ok(inner.layouts.get(&guild_id).cloned())
    }
}

/// Probe with canned answers per channel.
#[derive(Default)]
pub struct FixedProbe {
    occupants: HashMap<ChannelId, UserId>,
    failing: HashSet<ChannelId>,
}

impl FixedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel_id: ChannelId, user_id: UserId) -> Self {
        self.occupants.insert(channel_id, user_id);
        self
    }

    pub fn failing(mut self, channel_id: ChannelId) -> Self {
        self.failing.insert(channel_id);
        self
    }
}

#[async_trait]
impl ActivityProbe for FixedProbe {
    async fn recent_occupant(&self, channel_id: ChannelId) -> Result<Option<UserId>> {
        if self.failing.contains(&channel_id) {
            return Err(transport_down());
        }
        Ok(self.occupants.get(&channel_id).copied())
    }
}
