//! Process configuration.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use futurehouse_client::DEFAULT_BASE_URL;

use crate::dispatcher::PollSettings;
use crate::error::DispatchError;

/// MCP transport to serve on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP at `/mcp`.
    StreamableHttp,
}

/// FutureHouse MCP server.
#[derive(Parser, Debug)]
#[command(name = "futurehouse-mcp", about = "MCP server for the FutureHouse platform")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Run modes mirroring the published entry points.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve over stdio
    Stdio,
    /// Serve over stdio with only the PHOENIX chemistry tool
    StdioPhoenix,
}

/// Flags shared by every run mode.
#[derive(Args, Debug)]
pub struct Settings {
    /// FutureHouse API key
    #[arg(long, env = "FUTUREHOUSE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Platform base URL
    #[arg(long, env = "FUTUREHOUSE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Transport type
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value = "streamable-http")]
    pub transport: Transport,

    /// Host to bind to
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "MCP_PORT", default_value = "3001")]
    pub port: u16,

    /// Seconds between task status polls
    #[arg(long, env = "FUTUREHOUSE_POLL_INTERVAL_SECS", default_value = "5")]
    pub poll_interval_secs: u64,

    /// Seconds to wait for a task before giving up
    #[arg(long, env = "FUTUREHOUSE_MAX_WAIT_SECS", default_value = "1200")]
    pub max_wait_secs: u64,

    /// Expose only the PHOENIX chemistry tool
    #[arg(long)]
    pub phoenix_only: bool,
}

/// Resolved server configuration. Read-only after startup.
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub poll: PollSettings,
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub phoenix_only: bool,
}

impl Config {
    /// Resolve the command line into a config.
    ///
    /// A missing or blank API key is a fatal [`DispatchError::MissingCredential`].
    pub fn from_cli(cli: Cli) -> Result<Self, DispatchError> {
        let settings = cli.settings;
        let api_key = require_api_key(settings.api_key)?;

        let (transport, phoenix_only) = match cli.command {
            None => (settings.transport, settings.phoenix_only),
            Some(Command::Stdio) => (Transport::Stdio, settings.phoenix_only),
            Some(Command::StdioPhoenix) => (Transport::Stdio, true),
        };

        if settings.poll_interval_secs == 0 {
            return Err(DispatchError::InvalidConfig(
                "poll interval must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url: settings.base_url,
            poll: PollSettings {
                interval: Duration::from_secs(settings.poll_interval_secs),
                max_wait: Duration::from_secs(settings.max_wait_secs),
            },
            transport,
            host: settings.host,
            port: settings.port,
            phoenix_only,
        })
    }

    /// `host:port` for network transports.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require_api_key(api_key: Option<String>) -> Result<String, DispatchError> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(DispatchError::MissingCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_missing_key_is_fatal() {
        assert!(matches!(
            require_api_key(None),
            Err(DispatchError::MissingCredential)
        ));
        assert!(matches!(
            require_api_key(Some("  ".to_string())),
            Err(DispatchError::MissingCredential)
        ));
    }

    #[test]
    fn test_explicit_flags() {
        let config = Config::from_cli(parse(&[
            "futurehouse-mcp",
            "--api-key",
            "k",
            "--transport",
            "stdio",
            "--poll-interval-secs",
            "2",
            "--max-wait-secs",
            "60",
            "--port",
            "4000",
        ]))
        .unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.poll.interval, Duration::from_secs(2));
        assert_eq!(config.poll.max_wait, Duration::from_secs(60));
        assert!(config.bind_addr().ends_with(":4000"));
        assert!(!config.phoenix_only);
    }

    #[test]
    fn test_stdio_phoenix_subcommand() {
        let config =
            Config::from_cli(parse(&["futurehouse-mcp", "--api-key", "k", "stdio-phoenix"]))
                .unwrap();
        assert_eq!(config.transport, Transport::Stdio);
        assert!(config.phoenix_only);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = Config::from_cli(parse(&[
            "futurehouse-mcp",
            "--api-key",
            "k",
            "--poll-interval-secs",
            "0",
        ]));
        assert!(matches!(result, Err(DispatchError::InvalidConfig(_))));
    }
}
