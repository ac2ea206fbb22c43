//! Discord event handler for serenity.
//!
//! Translates gateway events into [`InboundEvent`]s for the monitor and
//! delivers the replies it hands back.

use std::sync::Arc;

use {
    serenity::{
        all::{
            Command, CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
            CreateInteractionResponseMessage, EventHandler, GatewayIntents, GuildChannel, GuildId,
            Interaction, Member, Message, Ready, User,
        },
        async_trait,
    },
    tracing::{debug, info, warn},
};

use {
    freebot_channels::{
        self as channels, ChannelDisplay, CommandInvocation, InboundEvent, PostedMessage, Reply,
    },
    freebot_monitor::{EventHandlers, FREE_COMMAND, FREE_COMMAND_DESCRIPTION},
};

use crate::sink::{ChannelInfo, display_order};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    pub handlers: Arc<EventHandlers>,
    /// Register the global `/free` command when connected.
    pub register_commands: bool,
}

impl DiscordHandler {
    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::MESSAGE_CONTENT
    }

    async fn register_commands(&self, ctx: &Context) {
        let command = CreateCommand::new(FREE_COMMAND).description(FREE_COMMAND_DESCRIPTION);
        match Command::create_global_command(&ctx.http, command).await {
            Ok(_) => info!(command = FREE_COMMAND, "registered global slash command"),
            Err(e) => warn!(command = FREE_COMMAND, error = %e, "failed to register slash command"),
        }
    }

    async fn on_command(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(guild_id) = command.guild_id else {
            debug!(command = %command.data.name, "ignoring command outside a guild");
            return;
        };
        let guild_name = ctx.cache.guild(guild_id).map(|guild| guild.name.clone());

        let invocation = CommandInvocation {
            guild_id: channels::GuildId::new(guild_id.get()),
            guild_name,
            channel_id: channels::ChannelId::new(command.channel_id.get()),
            user_id: channels::UserId::new(command.user.id.get()),
            command: command.data.name.clone(),
        };

        let Some(reply) = self
            .handlers
            .handle(InboundEvent::CommandInvoked(invocation))
            .await
        else {
            return;
        };

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply.text())
                .ephemeral(reply.is_error()),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            warn!(error = %e, "failed to respond to command");
        }
    }

    async fn layout_changed(&self, ctx: &Context, guild_id: GuildId) {
        let Some(layout) = cached_layout(ctx, guild_id) else {
            debug!(%guild_id, "guild not cached, keeping known channel layout");
            return;
        };
        self.handlers
            .handle(InboundEvent::LayoutChanged {
                guild_id: channels::GuildId::new(guild_id.get()),
                layout,
            })
            .await;
    }
}

/// Current layout of the guild from serenity's cache, which the gateway has
/// already updated by the time a channel event is dispatched.
fn cached_layout(ctx: &Context, guild_id: GuildId) -> Option<Vec<ChannelDisplay>> {
    let guild = ctx.cache.guild(guild_id)?;
    let infos: Vec<ChannelInfo> = guild.channels.values().map(ChannelInfo::from).collect();
    Some(display_order(&infos))
}

/// Map a gateway message to the core's view of it. Direct messages have no
/// guild and are dropped.
pub(crate) fn posted_message(msg: &Message) -> Option<PostedMessage> {
    let guild_id = msg.guild_id?;
    Some(PostedMessage {
        guild_id: channels::GuildId::new(guild_id.get()),
        channel_id: channels::ChannelId::new(msg.channel_id.get()),
        message_id: channels::MessageId::new(msg.id.get()),
        author_id: channels::UserId::new(msg.author.id.get()),
        author_is_bot: msg.author.bot,
        is_webhook: msg.webhook_id.is_some(),
        reply_to: msg
            .message_reference
            .as_ref()
            .and_then(|reference| reference.message_id)
            .map(|id| channels::MessageId::new(id.get())),
    })
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );

        if self.register_commands {
            self.register_commands(&ctx).await;
        }
        self.handlers.handle(InboundEvent::Ready).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(posted) = posted_message(&msg) else {
            return;
        };

        if let Some(Reply::Message(text) | Reply::Error(text)) = self
            .handlers
            .handle(InboundEvent::MessagePosted(posted))
            .await
            && let Err(e) = msg.reply(&ctx, text).await
        {
            warn!(channel_id = %msg.channel_id, error = %e, "failed to reply to message");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.on_command(&ctx, &command).await;
        }
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member: Option<Member>,
    ) {
        self.handlers
            .handle(InboundEvent::MemberLeft {
                guild_id: channels::GuildId::new(guild_id.get()),
                user_id: channels::UserId::new(user.id.get()),
            })
            .await;
    }

    async fn channel_create(&self, ctx: Context, channel: GuildChannel) {
        self.layout_changed(&ctx, channel.guild_id).await;
    }

    async fn category_create(&self, ctx: Context, category: GuildChannel) {
        self.layout_changed(&ctx, category.guild_id).await;
    }

    async fn channel_update(&self, ctx: Context, _old: Option<GuildChannel>, new: GuildChannel) {
        self.layout_changed(&ctx, new.guild_id).await;
    }

    async fn channel_delete(
        &self,
        ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        self.layout_changed(&ctx, channel.guild_id).await;
    }

    async fn category_delete(&self, ctx: Context, category: GuildChannel) {
        self.layout_changed(&ctx, category.guild_id).await;
    }
}
