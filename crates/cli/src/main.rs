mod config_commands;

use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    freebot_config::FreebotConfig,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "freebot", about = "freebot: busy/free tracking for Discord help channels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of searching the standard locations.
    #[arg(long, global = true, env = "FREEBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and track help channels (default).
    Run,
    /// Validate the configuration file and report errors/warnings.
    CheckConfig,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Path given on the command line, otherwise the first file found in the
/// standard locations.
fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => freebot_config::find_config_file().context(
            "no config file found; create freebot.toml in the working directory or the user \
             config directory",
        ),
    }
}

async fn run(config: FreebotConfig) -> anyhow::Result<()> {
    let report = freebot_config::validate(&config);
    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            freebot_config::Severity::Error => error!(%diagnostic, "invalid configuration"),
            freebot_config::Severity::Warning => warn!(%diagnostic, "configuration warning"),
        }
    }
    if report.has_errors() {
        anyhow::bail!("configuration has errors, run `freebot check-config` for details");
    }

    freebot_discord::run(&config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "freebot starting");

    let path = resolve_config_path(cli.config.as_deref())?;
    match cli.command {
        None | Some(Commands::Run) => {
            info!(path = %path.display(), "loading config");
            let config = freebot_config::load_config(&path)?;
            run(config).await
        },
        Some(Commands::CheckConfig) => config_commands::check(&path),
    }
}
