//! One-time startup: seed channel state, reconcile status messages, go ready.

use {
    freebot_channels::ActivityProbe,
    tracing::{debug, info, warn},
};

use crate::{monitor::ChannelMonitor, publisher::StatusPublisher};

/// Counters from a startup run, logged once it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Channels found in use and marked busy.
    pub busy: usize,
    /// Status channels brought up to date.
    pub published: usize,
    /// Probe or publish calls that failed.
    pub failures: usize,
}

/// Seed every monitored channel from recent activity, publish each guild's
/// summary, then mark the monitor ready.
///
/// Nothing here is fatal: a failed probe leaves the channel free and a
/// failed publish is retried by the next transition in that guild.
pub async fn run(
    monitor: &ChannelMonitor,
    publisher: &StatusPublisher,
    probe: Option<&dyn ActivityProbe>,
) -> StartupReport {
    let mut report = StartupReport::default();
    debug!(state = %monitor, "starting channel monitor");

    if let Some(probe) = probe {
        for guild_id in monitor.guild_ids() {
            for channel_id in monitor.monitored_channels(guild_id) {
                match probe.recent_occupant(channel_id).await {
                    Ok(Some(user_id)) => {
                        if matches!(monitor.set_channel_busy(channel_id, user_id), Ok(true)) {
                            report.busy += 1;
                        }
                    },
                    Ok(None) => {},
                    Err(e) => {
                        report.failures += 1;
                        warn!(%guild_id, %channel_id, error = %e, "activity probe failed, channel stays free");
                    },
                }
            }
        }
    }

    for status in monitor.status_channels() {
        publisher.refresh_layout(status.guild_id).await;
        match publisher.publish(status.guild_id).await {
            Ok(outcome) => {
                report.published += 1;
                debug!(guild_id = %status.guild_id, ?outcome, "initial status published");
            },
            Err(e) => {
                report.failures += 1;
                warn!(
                    guild_id = %status.guild_id,
                    channel_id = %status.channel_id,
                    error = %e,
                    "initial status publish failed"
                );
            },
        }
    }

    monitor.mark_ready();
    info!(
        busy = report.busy,
        published = report.published,
        failures = report.failures,
        "channel monitor ready"
    );
    report
}
