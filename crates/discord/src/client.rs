//! Wires the monitor to a live Discord connection.

use std::{future::Future, sync::Arc, time::Duration};

use {
    anyhow::Context as _,
    secrecy::ExposeSecret,
    serenity::{Client, http::Http},
    tracing::info,
};

use {
    freebot_channels::{ActivityProbe, MessagingSink, UserId},
    freebot_config::FreebotConfig,
    freebot_monitor::{ChannelMonitor, EventHandlers, StatusPublisher, strings::STATUS_TITLE},
};

use crate::{
    handler::DiscordHandler,
    sink::{DiscordActivityProbe, DiscordSink},
};

/// Connect to Discord and run until `shutdown` resolves or the gateway
/// connection fails.
pub async fn run(config: &FreebotConfig, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let token = config.discord.token.expose_secret();
    let http = Arc::new(Http::new(token));
    let me = http
        .get_current_user()
        .await
        .context("failed to log in to Discord, check the bot token")?;
    let bot_user_id = UserId::new(me.id.get());
    info!(bot_name = %me.name, %bot_user_id, "authenticated with Discord");

    let monitor = Arc::new(
        ChannelMonitor::from_config(&config.guilds).context("invalid guild configuration")?,
    );
    let sink: Arc<dyn MessagingSink> =
        Arc::new(DiscordSink::new(Arc::clone(&http), bot_user_id, STATUS_TITLE));
    let probe: Arc<dyn ActivityProbe> = Arc::new(DiscordActivityProbe::new(
        Arc::clone(&http),
        Duration::from_secs(config.monitor.initial_busy_window_secs),
        config.monitor.activity_scan_limit,
    ));
    let publisher = Arc::new(StatusPublisher::new(Arc::clone(&monitor), sink));
    let handlers = Arc::new(EventHandlers::new(monitor, publisher, Some(probe)));

    let handler = DiscordHandler {
        handlers,
        register_commands: config.discord.register_commands,
    };
    let mut client = Client::builder(token, DiscordHandler::intents())
        .event_handler(handler)
        .await
        .context("failed to create Discord client")?;
    let shard_manager = Arc::clone(&client.shard_manager);

    tokio::select! {
        result = client.start() => result.context("Discord gateway connection failed"),
        () = shutdown => {
            info!("shutting down Discord connection");
            shard_manager.shutdown_all().await;
            Ok(())
        },
    }
}
