//! CLI argument definitions for the Cafe Hunter server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use cafehunter_core::config::CafeHunterConfig;

/// Cafe Hunter - a Messenger bot that recommends cafes near a place.
#[derive(Parser, Debug)]
#[command(name = "cafehunter", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Webhook server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Directory holding the cafe database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Cafe dataset JSON to import before serving.
    #[arg(long = "import")]
    pub import: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CAFEHUNTER_CONFIG env var > ~/.cafehunter/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CAFEHUNTER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Fold flag and environment overrides into a loaded config.
    pub fn apply(&self, config: &mut CafeHunterConfig) {
        self.apply_with_env(config, |key| std::env::var(key).ok());
    }

    fn apply_with_env(
        &self,
        config: &mut CafeHunterConfig,
        env: impl Fn(&str) -> Option<String>,
    ) {
        let general = &mut config.general;
        general.port = pick(self.port, env("CAFEHUNTER_PORT"), general.port);
        general.data_dir = pick(
            self.data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            env("CAFEHUNTER_DATA_DIR"),
            std::mem::take(&mut general.data_dir),
        );
        general.log_level = pick(
            self.log_level.clone(),
            env("CAFEHUNTER_LOG_LEVEL"),
            std::mem::take(&mut general.log_level),
        );
    }
}

/// Flag value, else a parseable env value, else the config value.
fn pick<T: FromStr>(flag: Option<T>, env: Option<String>, config: T) -> T {
    flag.or_else(|| env.and_then(|v| v.parse().ok()))
        .unwrap_or(config)
}

fn default_config_path() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".cafehunter").join("config.toml"),
        Err(_) => PathBuf::from("config.toml"),
    }
}
