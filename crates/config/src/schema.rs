//! Config schema types.

use {
    freebot_channels::{ChannelId, GuildId},
    secrecy::Secret,
    serde::Deserialize,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FreebotConfig {
    pub discord: DiscordConfig,
    pub monitor: MonitorConfig,
    /// One entry per guild whose help channels are tracked.
    pub guilds: Vec<GuildConfig>,
}

/// Discord connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. Usually `"${DISCORD_TOKEN}"`.
    pub token: Secret<String>,

    /// Register the global `/free` command on connect.
    pub register_commands: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            register_commands: true,
        }
    }
}

/// Tuning for the startup activity scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// A channel whose latest human message is younger than this is
    /// considered busy when the bot starts.
    pub initial_busy_window_secs: u64,

    /// How many recent messages the startup scan looks at per channel.
    pub activity_scan_limit: u8,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            initial_busy_window_secs: 3600,
            activity_scan_limit: 20,
        }
    }
}

/// Help-channel setup for a single guild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuildConfig {
    pub guild_id: GuildId,
    /// Channel that receives the status summary.
    pub status_channel: ChannelId,
    /// Channels tracked for busy/free status.
    #[serde(default)]
    pub monitored_channels: Vec<ChannelId>,
}
