//! Inbound platform events → monitor transitions.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use {
    freebot_channels::{
        ActivityProbe, ChannelDisplay, CommandInvocation, GuildId, InboundEvent, PostedMessage,
        Reply,
    },
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result, monitor::ChannelMonitor, publisher::StatusPublisher, startup, strings,
};

/// Name of the slash command that releases a channel.
pub const FREE_COMMAND: &str = "free";

/// Description shown next to the command in the client.
pub const FREE_COMMAND_DESCRIPTION: &str =
    "marks this channel as free for another user to ask a question";

/// Entry point for every event a transport delivers.
pub struct EventHandlers {
    monitor: Arc<ChannelMonitor>,
    publisher: Arc<StatusPublisher>,
    probe: Option<Arc<dyn ActivityProbe>>,
    started: AtomicBool,
}

impl EventHandlers {
    pub fn new(
        monitor: Arc<ChannelMonitor>,
        publisher: Arc<StatusPublisher>,
        probe: Option<Arc<dyn ActivityProbe>>,
    ) -> Self {
        Self {
            monitor,
            publisher,
            probe,
            started: AtomicBool::new(false),
        }
    }

    pub fn monitor(&self) -> &Arc<ChannelMonitor> {
        &self.monitor
    }

    /// Handle one event and return what the transport should reply, if
    /// anything. Status publishing triggered here runs in the background.
    pub async fn handle(&self, event: InboundEvent) -> Option<Reply> {
        match event {
            InboundEvent::Ready => {
                self.on_ready().await;
                None
            },
            InboundEvent::MessagePosted(message) => self.on_message(&message),
            InboundEvent::CommandInvoked(invocation) => self.on_command(&invocation),
            InboundEvent::MemberLeft { guild_id, user_id } => {
                debug!(%guild_id, %user_id, "member left, nothing to do");
                None
            },
            InboundEvent::LayoutChanged { guild_id, layout } => {
                self.on_layout(guild_id, layout);
                None
            },
        }
    }

    /// Run the startup sequence the first time the transport is ready.
    async fn on_ready(&self) {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("transport reconnected, startup already done");
            return;
        }
        startup::run(&self.monitor, &self.publisher, self.probe.as_deref()).await;
    }

    /// A human posting in a free monitored channel claims it.
    pub fn on_message(&self, message: &PostedMessage) -> Option<Reply> {
        if message.is_automated() {
            return None;
        }
        let channel_id = message.channel_id;
        if self.monitor.guild_of(channel_id) != Some(message.guild_id) {
            return None;
        }

        match self.monitor.set_channel_busy(channel_id, message.author_id) {
            Ok(true) => {
                self.publisher.spawn_publish(message.guild_id);
                Some(Reply::message(strings::NEW_QUESTION))
            },
            Ok(false) => None,
            Err(e) => {
                warn!(%channel_id, error = %e, "could not mark channel busy");
                None
            },
        }
    }

    /// Channels moved in a monitored guild; the summary follows the new order.
    pub fn on_layout(&self, guild_id: GuildId, layout: Vec<ChannelDisplay>) {
        if !self.monitor.is_monitoring_guild(guild_id) {
            return;
        }
        if self.monitor.update_layout(guild_id, layout) && self.monitor.is_ready() {
            debug!(%guild_id, "channel layout changed, republishing status");
            self.publisher.spawn_publish(guild_id);
        }
    }

    /// Dispatch a slash command. Unknown commands are ignored.
    pub fn on_command(&self, invocation: &CommandInvocation) -> Option<Reply> {
        if invocation.command != FREE_COMMAND {
            debug!(command = %invocation.command, "ignoring unknown command");
            return None;
        }

        let reply = match self.free_channel(invocation) {
            Ok(()) => Reply::message(strings::MARKED_FREE),
            Err(e) => {
                debug!(
                    guild_id = %invocation.guild_id,
                    channel_id = %invocation.channel_id,
                    user_id = %invocation.user_id,
                    error = %e,
                    "free command rejected"
                );
                Reply::error(e.user_message().unwrap_or_else(|| e.to_string()))
            },
        };
        Some(reply)
    }

    /// `/free`: release the channel the command was invoked in.
    pub fn free_channel(&self, invocation: &CommandInvocation) -> Result<()> {
        let (guild_id, channel_id) = (invocation.guild_id, invocation.channel_id);

        if !self.monitor.is_ready() {
            return Err(Error::NotReady);
        }
        if !self.monitor.is_monitoring_guild(guild_id) {
            return Err(Error::not_configured(guild_id)
                .with_guild_name(invocation.guild_name.as_deref()));
        }
        if self.monitor.guild_of(channel_id) != Some(guild_id) {
            return Err(Error::NotMonitored { channel_id });
        }
        if !self.monitor.set_channel_free(channel_id)? {
            return Err(Error::AlreadyFree { channel_id });
        }

        info!(%guild_id, %channel_id, user_id = %invocation.user_id, "channel freed by command");
        self.publisher.spawn_publish(guild_id);
        Ok(())
    }
}
