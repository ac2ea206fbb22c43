//! Platform-neutral vocabulary shared by the freebot crates.
//!
//! The availability core only talks to the chat platform through the types
//! and traits defined here: opaque snowflake ids, one tagged inbound event
//! enum, and the [`MessagingSink`] / [`ActivityProbe`] collaborator traits.
//! Concrete transports (Discord) implement the traits in their own crates.

pub mod error;
pub mod event;
pub mod ids;
pub mod sink;

pub use {
    error::{Error, Result},
    event::{CommandInvocation, InboundEvent, PostedMessage, Reply},
    ids::{ChannelId, GuildId, MessageId, UserId},
    sink::{ActivityProbe, ChannelDisplay, HistoryEntry, MessagingSink, StatusCard},
};
