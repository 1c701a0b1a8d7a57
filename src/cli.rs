// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `playbook-agent`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "playbook-agent",
    version,
    about = "Serve playbook runs, host inventory and live run logs over HTTP.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `playbook-agent.toml` in the working directory is used when
    /// present, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Address to bind, overriding `[server].host`.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind, overriding `[server].port`.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PLAYBOOK_AGENT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate config, print the resolved settings, and exit.
    #[arg(long)]
    pub check_config: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
