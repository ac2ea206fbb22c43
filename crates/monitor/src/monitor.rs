use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use {
    chrono::Utc,
    dashmap::{DashMap, mapref::entry::Entry},
    freebot_channels::{ChannelDisplay, ChannelId, GuildId, UserId},
    freebot_config::GuildConfig,
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result,
    registry::{ChannelRegistry, StatusChannel},
    render::{self, StatusEntry},
    state::ChannelState,
};

/// Single source of truth for which help channels are busy.
///
/// Every read-modify-write on a channel runs under that channel's map entry
/// guard, so concurrent transitions on one channel are linearizable while
/// different channels never contend with each other.
#[derive(Debug, Default)]
pub struct ChannelMonitor {
    registry: ChannelRegistry,
    states: DashMap<ChannelId, ChannelState>,
    /// Last known platform display order per guild.
    layouts: DashMap<GuildId, Vec<ChannelDisplay>>,
    ready: AtomicBool,
}

impl ChannelMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a monitor from the configured guilds.
    pub fn from_config(guilds: &[GuildConfig]) -> Result<Self> {
        let monitor = Self::new();
        for guild in guilds {
            for channel in &guild.monitored_channels {
                monitor.add_channel_to_monitor(*channel, guild.guild_id);
            }
            monitor.add_channel_for_status(guild.status_channel, guild.guild_id)?;
        }
        Ok(monitor)
    }

    // ── Registration ────────────────────────────────────────────────

    /// Start tracking a channel as free. Re-adding a known channel is a no-op.
    pub fn add_channel_to_monitor(&self, channel_id: ChannelId, guild_id: GuildId) {
        match self.states.entry(channel_id) {
            Entry::Occupied(existing) => {
                if existing.get().guild_id != guild_id {
                    warn!(
                        %channel_id,
                        %guild_id,
                        registered_guild = %existing.get().guild_id,
                        "channel already monitored for another guild, ignoring"
                    );
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(ChannelState::new(guild_id));
                self.registry.add_monitored(guild_id, channel_id);
                debug!(%channel_id, %guild_id, "monitoring channel");
            },
        }
    }

    /// Register the guild's status channel. A different channel for a guild
    /// that already has one is a configuration error.
    pub fn add_channel_for_status(&self, channel_id: ChannelId, guild_id: GuildId) -> Result<()> {
        if self.registry.set_status_channel(guild_id, channel_id)? {
            debug!(%channel_id, %guild_id, "registered status channel");
        }
        Ok(())
    }

    /// Remember the platform's display order and grouping for the guild.
    /// Returns whether it differs from the layout known so far.
    pub fn update_layout(&self, guild_id: GuildId, layout: Vec<ChannelDisplay>) -> bool {
        match self.layouts.entry(guild_id) {
            Entry::Occupied(known) if *known.get() == layout => false,
            entry => {
                entry.insert(layout);
                true
            },
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn is_monitoring_guild(&self, guild_id: GuildId) -> bool {
        self.registry.has_guild(guild_id)
    }

    pub fn is_monitoring_channel(&self, channel_id: ChannelId) -> bool {
        self.states.contains_key(&channel_id)
    }

    /// Guild the monitored channel belongs to.
    pub fn guild_of(&self, channel_id: ChannelId) -> Option<GuildId> {
        self.states.get(&channel_id).map(|state| state.guild_id)
    }

    pub fn is_channel_busy(&self, channel_id: ChannelId) -> Result<bool> {
        self.states
            .get(&channel_id)
            .map(|state| state.is_busy())
            .ok_or(Error::NotMonitored { channel_id })
    }

    pub fn occupant(&self, channel_id: ChannelId) -> Result<Option<UserId>> {
        self.states
            .get(&channel_id)
            .map(|state| state.occupant())
            .ok_or(Error::NotMonitored { channel_id })
    }

    pub fn get_status_channel_for(&self, guild_id: GuildId) -> Result<StatusChannel> {
        self.registry
            .status_channel(guild_id)
            .ok_or_else(|| Error::not_configured(guild_id))
    }

    pub fn guild_ids(&self) -> Vec<GuildId> {
        self.registry.guild_ids()
    }

    pub fn status_channels(&self) -> Vec<StatusChannel> {
        self.registry.status_channels()
    }

    pub fn monitored_channels(&self, guild_id: GuildId) -> Vec<ChannelId> {
        self.registry.monitored_channels(guild_id)
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Free → busy, recording `user_id` as occupant.
    ///
    /// Returns `true` if this call claimed the channel. A channel that is
    /// already busy keeps its first occupant and the call returns `false`.
    pub fn set_channel_busy(&self, channel_id: ChannelId, user_id: UserId) -> Result<bool> {
        let mut state = self
            .states
            .get_mut(&channel_id)
            .ok_or(Error::NotMonitored { channel_id })?;
        let claimed = state.claim(user_id, Utc::now());
        if claimed {
            info!(%channel_id, %user_id, "channel marked busy");
        } else {
            debug!(%channel_id, %user_id, occupant = ?state.occupant(), "channel already busy");
        }
        Ok(claimed)
    }

    /// Busy → free. Returns `false` if the channel was already free.
    pub fn set_channel_free(&self, channel_id: ChannelId) -> Result<bool> {
        let mut state = self
            .states
            .get_mut(&channel_id)
            .ok_or(Error::NotMonitored { channel_id })?;
        let released = state.release();
        if released {
            info!(%channel_id, "channel marked free");
        }
        Ok(released)
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render the guild's status summary from the current channel states.
    pub fn status_message(&self, guild_id: GuildId) -> Result<String> {
        if !self.is_monitoring_guild(guild_id) {
            return Err(Error::not_configured(guild_id));
        }

        let entries: Vec<StatusEntry> = self
            .display_order(guild_id)
            .into_iter()
            .filter_map(|(channel_id, group)| {
                let occupant = self.states.get(&channel_id)?.occupant();
                Some(StatusEntry {
                    channel_id,
                    group,
                    occupant,
                })
            })
            .collect();

        Ok(render::render_status(&entries))
    }

    /// Monitored channels of the guild in platform display order when a
    /// layout is known; channels missing from the layout follow in
    /// configuration order.
    fn display_order(&self, guild_id: GuildId) -> Vec<(ChannelId, Option<String>)> {
        let monitored = self.registry.monitored_channels(guild_id);
        let Some(layout) = self.layouts.get(&guild_id) else {
            return monitored.into_iter().map(|channel| (channel, None)).collect();
        };

        let mut ordered: Vec<(ChannelId, Option<String>)> = Vec::with_capacity(monitored.len());
        for display in layout.iter() {
            let listed = ordered.iter().any(|(id, _)| *id == display.channel_id);
            if monitored.contains(&display.channel_id) && !listed {
                ordered.push((display.channel_id, display.group.clone()));
            }
        }
        drop(layout);

        for channel in monitored {
            if !ordered.iter().any(|(id, _)| *id == channel) {
                ordered.push((channel, None));
            }
        }
        ordered
    }

    // ── Readiness ───────────────────────────────────────────────────

    /// Startup reconciliation finished; commands are accepted from now on.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl fmt::Display for ChannelMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for guild_id in self.guild_ids() {
            let status = self
                .registry
                .status_channel(guild_id)
                .map_or_else(|| "none".to_string(), |s| s.channel_id.to_string());
            writeln!(f, "guild {guild_id}: status channel {status}")?;
            for channel_id in self.monitored_channels(guild_id) {
                match self.occupant(channel_id) {
                    Ok(Some(user)) => writeln!(f, "  {channel_id}: busy ({user})")?,
                    _ => writeln!(f, "  {channel_id}: free")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::{render::sections, strings},
        std::{collections::HashSet, sync::Arc},
    };

    const GUILD: GuildId = GuildId::new(1);
    const A: ChannelId = ChannelId::new(10);
    const B: ChannelId = ChannelId::new(11);
    const STATUS: ChannelId = ChannelId::new(99);

    fn monitor() -> ChannelMonitor {
        let monitor = ChannelMonitor::new();
        monitor.add_channel_to_monitor(A, GUILD);
        monitor.add_channel_to_monitor(B, GUILD);
        monitor.add_channel_for_status(STATUS, GUILD).unwrap();
        monitor
    }

    #[test]
    fn registration_is_idempotent() {
        let monitor = monitor();
        monitor.set_channel_busy(A, UserId::new(5)).unwrap();
        monitor.add_channel_to_monitor(A, GUILD);
        assert!(monitor.is_channel_busy(A).unwrap());
        assert_eq!(monitor.monitored_channels(GUILD), vec![A, B]);
    }

    #[test]
    fn channel_stays_with_its_first_guild() {
        let monitor = monitor();
        monitor.add_channel_to_monitor(A, GuildId::new(2));
        assert_eq!(monitor.guild_of(A), Some(GUILD));
        assert!(!monitor.is_monitoring_guild(GuildId::new(2)));
    }

    #[test]
    fn conflicting_status_channel_fails() {
        let monitor = monitor();
        assert!(monitor.add_channel_for_status(STATUS, GUILD).is_ok());
        let err = monitor
            .add_channel_for_status(ChannelId::new(100), GUILD)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(monitor.get_status_channel_for(GUILD).unwrap().channel_id, STATUS);
    }

    #[test]
    fn lookups() {
        let monitor = monitor();
        assert!(monitor.is_monitoring_guild(GUILD));
        assert!(!monitor.is_monitoring_guild(GuildId::new(2)));
        assert!(monitor.is_monitoring_channel(A));
        assert!(!monitor.is_monitoring_channel(STATUS));
        assert!(matches!(
            monitor.is_channel_busy(STATUS),
            Err(Error::NotMonitored { channel_id }) if channel_id == STATUS
        ));
        assert!(matches!(
            monitor.get_status_channel_for(GuildId::new(2)),
            Err(Error::NotConfigured { .. })
        ));
    }

    #[test]
    fn first_occupant_wins() {
        let monitor = monitor();
        assert!(monitor.set_channel_busy(A, UserId::new(5)).unwrap());
        assert!(!monitor.set_channel_busy(A, UserId::new(6)).unwrap());
        assert_eq!(monitor.occupant(A).unwrap(), Some(UserId::new(5)));
    }

    #[test]
    fn free_after_busy_clears_occupant() {
        let monitor = monitor();
        monitor.set_channel_busy(A, UserId::new(5)).unwrap();
        assert!(monitor.set_channel_free(A).unwrap());
        assert!(!monitor.set_channel_free(A).unwrap());
        assert!(!monitor.is_channel_busy(A).unwrap());
        assert_eq!(monitor.occupant(A).unwrap(), None);
    }

    #[test]
    fn transitions_on_unknown_channels_fail() {
        let monitor = monitor();
        assert!(monitor.set_channel_busy(STATUS, UserId::new(5)).is_err());
        assert!(monitor.set_channel_free(STATUS).is_err());
    }

    #[test]
    fn busy_iff_occupant_recorded() {
        let monitor = monitor();
        let check = |monitor: &ChannelMonitor| {
            for channel in [A, B] {
                assert_eq!(
                    monitor.is_channel_busy(channel).unwrap(),
                    monitor.occupant(channel).unwrap().is_some()
                );
            }
        };
        check(&monitor);
        monitor.set_channel_busy(A, UserId::new(5)).unwrap();
        check(&monitor);
        monitor.set_channel_busy(B, UserId::new(6)).unwrap();
        monitor.set_channel_free(A).unwrap();
        check(&monitor);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_have_one_winner() {
        let monitor = Arc::new(monitor());
        let tasks: Vec<_> = (0..32)
            .map(|user| {
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move {
                    monitor
                        .set_channel_busy(A, UserId::new(user))
                        .unwrap()
                        .then_some(UserId::new(user))
                })
            })
            .collect();

        let mut winners = HashSet::new();
        for task in tasks {
            if let Some(user) = task.await.unwrap() {
                winners.insert(user);
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(monitor.occupant(A).unwrap(), winners.into_iter().next());
    }

    #[test]
    fn status_message_lists_busy_channel_under_busy() {
        let monitor = monitor();
        monitor.set_channel_busy(A, UserId::new(5)).unwrap();
        let text = monitor.status_message(GUILD).unwrap();
        let (free, busy) = sections(&text);
        assert!(busy.contains("<#10>"));
        assert!(busy.contains("<@5>"));
        assert!(free.contains("<#11>"));
        assert!(!free.contains("<#10>"));
    }

    #[test]
    fn status_message_is_stable_without_mutation() {
        let monitor = monitor();
        monitor.set_channel_busy(B, UserId::new(5)).unwrap();
        assert_eq!(
            monitor.status_message(GUILD).unwrap(),
            monitor.status_message(GUILD).unwrap()
        );
    }

    #[test]
    fn status_message_for_unknown_guild_fails() {
        assert!(matches!(
            monitor().status_message(GuildId::new(2)),
            Err(Error::NotConfigured { .. })
        ));
    }

    #[test]
    fn layout_controls_order_and_groups() {
        let monitor = monitor();
        let c = ChannelId::new(12);
        monitor.add_channel_to_monitor(c, GUILD);
        monitor.update_layout(GUILD, vec![
            ChannelDisplay {
                channel_id: ChannelId::new(500),
                group: Some("Off-topic".into()),
            },
            ChannelDisplay {
                channel_id: B,
                group: Some("Help".into()),
            },
            ChannelDisplay {
                channel_id: A,
                group: Some("Help".into()),
            },
        ]);

        let text = monitor.status_message(GUILD).unwrap();
        assert!(text.find("<#11>") < text.find("<#10>"));
        assert!(text.find("<#10>") < text.find(strings::UNGROUPED_HEADER));
        assert!(text.find("<#10>") < text.find("<#12>"));
        assert!(text.contains("**Help**"));
        assert!(!text.contains("Off-topic"));
        assert!(!text.contains("<#500>"));
    }

    #[test]
    fn update_layout_reports_changes() {
        let monitor = monitor();
        let layout = vec![ChannelDisplay {
            channel_id: A,
            group: Some("Help".into()),
        }];
        assert!(monitor.update_layout(GUILD, layout.clone()));
        assert!(!monitor.update_layout(GUILD, layout));
        assert!(monitor.update_layout(GUILD, vec![ChannelDisplay {
            channel_id: A,
            group: Some("Questions".into()),
        }]));
    }

    #[test]
    fn from_config_registers_everything() {
        let guilds = vec![GuildConfig {
            guild_id: GUILD,
            status_channel: STATUS,
            monitored_channels: vec![A, B],
        }];
        let monitor = ChannelMonitor::from_config(&guilds).unwrap();
        assert_eq!(monitor.monitored_channels(GUILD), vec![A, B]);
        assert_eq!(monitor.status_channels().len(), 1);
        assert!(!monitor.is_ready());
        monitor.mark_ready();
        assert!(monitor.is_ready());
    }

    #[test]
    fn from_config_rejects_two_status_channels() {
        let guilds = vec![
            GuildConfig {
                guild_id: GUILD,
                status_channel: STATUS,
                monitored_channels: vec![A],
            },
            GuildConfig {
                guild_id: GUILD,
                status_channel: ChannelId::new(98),
                monitored_channels: vec![B],
            },
        ];
        assert!(matches!(
            ChannelMonitor::from_config(&guilds),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn display_dumps_configuration() {
        let monitor = monitor();
        monitor.set_channel_busy(A, UserId::new(5)).unwrap();
        let dump = monitor.to_string();
        assert!(dump.contains("guild 1: status channel 99"));
        assert!(dump.contains("10: busy (5)"));
        assert!(dump.contains("11: free"));
    }
}
