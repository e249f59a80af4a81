use clap::{Args, Parser, Subcommand};

use replog_engine::ReplogConfig;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "replog-secondary", about = "Secondary node of a replicated log")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the replica HTTP API.
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Path to TOML config file. Defaults apply when omitted.
    #[arg(long, env = "REPLOG_CONFIG")]
    pub config: Option<String>,

    /// Override `api_port` from the config.
    #[arg(long, env = "REPLOG_PORT")]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Resolve the effective configuration.
    pub fn load_config(&self) -> Result<ReplogConfig, ServerError> {
        let mut config = match &self.config {
            Some(path) => ReplogConfig::load(path).map_err(|e| ServerError::Config {
                context: "load",
                detail: e.to_string(),
            })?,
            None => ReplogConfig::default(),
        };
        if let Some(port) = self.port {
            config.api_port = port;
        }
        Ok(config)
    }
}
