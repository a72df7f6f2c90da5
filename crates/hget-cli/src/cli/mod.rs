//! CLI for the hget HTTP getter.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hget_core::config;
use std::path::PathBuf;

use commands::{run_config, run_get, run_mode, Forced};

/// Top-level CLI for hget.
#[derive(Debug, Parser)]
#[command(name = "hget")]
#[command(about = "hget: fetch files and terraform-get modules over HTTP", long_about = None)]
pub struct Cli {
    /// Do not add credentials from ~/.netrc, whatever the config says.
    #[arg(long, global = true)]
    pub no_netrc: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL; a trailing slash means a directory (module), anything else a file.
    Get {
        /// HTTP/HTTPS URL to fetch.
        url: String,
        /// Destination file or directory.
        dst: PathBuf,
    },

    /// Fetch a URL as a single file, optionally with `?ranged_request_bytes=START-END`.
    File {
        url: String,
        /// Destination file.
        dst: PathBuf,
    },

    /// Fetch a URL as a directory through terraform-get discovery.
    Dir {
        url: String,
        /// Destination directory.
        dst: PathBuf,
    },

    /// Print whether a URL would be fetched as a file or a directory.
    Mode {
        url: String,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let use_netrc = cfg.netrc && !cli.no_netrc;

        match cli.command {
            CliCommand::Get { url, dst } => run_get(&cfg, use_netrc, &url, &dst, None)?,
            CliCommand::File { url, dst } => {
                run_get(&cfg, use_netrc, &url, &dst, Some(Forced::File))?
            }
            CliCommand::Dir { url, dst } => {
                run_get(&cfg, use_netrc, &url, &dst, Some(Forced::Dir))?
            }
            CliCommand::Mode { url } => run_mode(&url)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
