//! Configuration loading and validation.
//!
//! Config files: `freebot.toml`, `freebot.yaml`, `freebot.yml` or `freebot.json`,
//! searched in `./` then the user config directory (`~/.config/freebot/` on Linux).
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, find_config_file, load_config},
    schema::{DiscordConfig, FreebotConfig, GuildConfig, MonitorConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
