use {
    dashmap::{DashMap, mapref::entry::Entry},
    freebot_channels::{ChannelId, GuildId},
};

use crate::{Error, Result};

/// Where a guild's status summary is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusChannel {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
}

/// Which channels are monitored in each guild and where each guild's summary
/// goes. Filled once from configuration.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Monitored channels per guild, in configuration order.
    monitored: DashMap<GuildId, Vec<ChannelId>>,
    status: DashMap<GuildId, ChannelId>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel to the guild's monitored list if not already listed.
    pub fn add_monitored(&self, guild_id: GuildId, channel_id: ChannelId) {
        let mut channels = self.monitored.entry(guild_id).or_default();
        if !channels.contains(&channel_id) {
            channels.push(channel_id);
        }
    }

    /// Register the guild's status channel. Returns `false` when the same
    /// channel was already registered, fails when a different one was.
    pub fn set_status_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<bool> {
        match self.status.entry(guild_id) {
            Entry::Occupied(existing) if *existing.get() == channel_id => Ok(false),
            Entry::Occupied(existing) => Err(Error::configuration(format!(
                "guild {guild_id} already has status channel {}, refusing {channel_id}",
                existing.get()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(channel_id);
                Ok(true)
            },
        }
    }

    pub fn status_channel(&self, guild_id: GuildId) -> Option<StatusChannel> {
        self.status.get(&guild_id).map(|channel| StatusChannel {
            channel_id: *channel,
            guild_id,
        })
    }

    /// Monitored channels of the guild in configuration order.
    pub fn monitored_channels(&self, guild_id: GuildId) -> Vec<ChannelId> {
        self.monitored
            .get(&guild_id)
            .map(|channels| channels.clone())
            .unwrap_or_default()
    }

    pub fn has_guild(&self, guild_id: GuildId) -> bool {
        self.monitored.contains_key(&guild_id) || self.status.contains_key(&guild_id)
    }

    /// Every guild with any setup, sorted by id.
    pub fn guild_ids(&self) -> Vec<GuildId> {
        let mut ids: Vec<GuildId> = self
            .monitored
            .iter()
            .map(|entry| *entry.key())
            .chain(self.status.iter().map(|entry| *entry.key()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Every registered status channel, sorted by guild id.
    pub fn status_channels(&self) -> Vec<StatusChannel> {
        let mut channels: Vec<StatusChannel> = self
            .status
            .iter()
            .map(|entry| StatusChannel {
                channel_id: *entry.value(),
                guild_id: *entry.key(),
            })
            .collect();
        channels.sort_unstable_by_key(|status| status.guild_id);
        channels
    }
}
