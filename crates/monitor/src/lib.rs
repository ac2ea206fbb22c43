//! Busy/free tracking for help channels and the status summary that mirrors it.
//!
//! [`ChannelMonitor`] owns the per-channel state machine, [`StatusPublisher`]
//! keeps one status message per guild in sync with it, and [`EventHandlers`]
//! turns inbound platform events into monitor transitions.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod monitor;
pub mod publisher;
pub mod registry;
pub mod render;
pub mod startup;
pub mod state;
pub mod strings;

#[cfg(test)]
mod test_support;

pub use {
    cache::{StatusMessageCache, StatusMessageRef},
    error::{Error, Result},
    handlers::{EventHandlers, FREE_COMMAND, FREE_COMMAND_DESCRIPTION},
    monitor::ChannelMonitor,
    publisher::{PublishOutcome, StatusPublisher},
    registry::{ChannelRegistry, StatusChannel},
    startup::StartupReport,
    state::{Availability, ChannelState},
};
