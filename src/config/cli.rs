use crate::config::toml_config::TomlConfig;
use crate::utils::error::{ConnectError, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "linkup")]
#[command(about = "Connection-request backend for a small social network")]
pub struct CliConfig {
    #[arg(long, short, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on, overrides server.bind_addr")]
    pub bind: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the config file, if any, and applies the command-line overrides on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) if !path.is_file() => {
                return Err(ConnectError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
        Ok(config)
    }
}
