//! Discord transport for freebot.
//!
//! Uses serenity for the gateway connection and REST calls. The handler
//! feeds gateway events to [`freebot_monitor::EventHandlers`], while
//! [`DiscordSink`] and [`DiscordActivityProbe`] give the monitor its view of
//! channel history.

pub mod client;
pub mod handler;
pub mod sink;

pub use {
    client::run,
    handler::DiscordHandler,
    sink::{DiscordActivityProbe, DiscordSink},
};
