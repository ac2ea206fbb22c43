//! Configuration validation.
//!
//! Checks a loaded [`FreebotConfig`] for setups the monitor cannot run with
//! (errors) and for ones that are probably mistakes (warnings).

use std::collections::{HashMap, HashSet};

use {
    freebot_channels::{ChannelId, GuildId},
    secrecy::ExposeSecret,
};

use crate::schema::FreebotConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. `guilds[0].status_channel`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
#[must_use]
pub fn validate(config: &FreebotConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let token = config.discord.token.expose_secret();
    if token.is_empty() {
        result.push(Severity::Error, "discord.token", "bot token is required");
    } else if token.starts_with("${") {
        result.push(
            Severity::Error,
            "discord.token",
            format!("environment variable {token} is not set"),
        );
    }

    if config.monitor.activity_scan_limit == 0 || config.monitor.activity_scan_limit > 100 {
        result.push(
            Severity::Error,
            "monitor.activity_scan_limit",
            "must be between 1 and 100",
        );
    }

    if config.guilds.is_empty() {
        result.push(Severity::Warning, "guilds", "no guilds configured, nothing to monitor");
    }

    let mut status_by_guild: HashMap<GuildId, ChannelId> = HashMap::new();
    let mut monitored_seen: HashSet<ChannelId> = HashSet::new();

    for (i, guild) in config.guilds.iter().enumerate() {
        let prefix = format!("guilds[{i}]");

        if guild.guild_id.get() == 0 {
            result.push(Severity::Error, format!("{prefix}.guild_id"), "id must be non-zero");
        }
        if guild.status_channel.get() == 0 {
            result.push(
                Severity::Error,
                format!("{prefix}.status_channel"),
                "id must be non-zero",
            );
        }

        match status_by_guild.get(&guild.guild_id) {
            Some(existing) if *existing != guild.status_channel => result.push(
                Severity::Error,
                format!("{prefix}.status_channel"),
                format!(
                    "guild {} already uses status channel {existing}",
                    guild.guild_id
                ),
            ),
            Some(_) => {},
            None => {
                status_by_guild.insert(guild.guild_id, guild.status_channel);
            },
        }

        if guild.monitored_channels.is_empty() {
            result.push(
                Severity::Warning,
                format!("{prefix}.monitored_channels"),
                "no channels to monitor",
            );
        }

        for (j, channel) in guild.monitored_channels.iter().enumerate() {
            let path = format!("{prefix}.monitored_channels[{j}]");
            if channel.get() == 0 {
                result.push(Severity::Error, path, "id must be non-zero");
            } else if !monitored_seen.insert(*channel) {
                result.push(
                    Severity::Warning,
                    path,
                    format!("channel {channel} is listed more than once"),
                );
            }
        }
    }

    result
}
