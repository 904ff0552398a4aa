// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod common;

use common::{CONFIG_ENV, Session};

#[derive(Parser)]
#[command(name = "shellfs", author, version, about = "Inspect a seeded virtual file store", long_about = None)]
struct Cli {
    /// Store configuration file (YAML)
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Seed layout (JSON or YAML); the standard layout when omitted
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// User to run as; `guest` is anonymous, default is root
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the hierarchy below a directory
    Tree {
        #[arg(default_value = "/")]
        path: String,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Mode, owner and size for each entry
        #[arg(short, long)]
        long: bool,
    },
    /// Print file contents
    Cat { path: String },
    /// Show the stored entry
    Stat {
        path: String,
        /// Describe a link itself instead of its target
        #[arg(long)]
        no_follow: bool,
    },
    /// Total size of a file or directory
    Du {
        #[arg(default_value = "/")]
        path: String,
        /// Exact byte count
        #[arg(short, long)]
        bytes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();
    let session = Session::open(cli.config.as_deref(), cli.seed.as_deref(), cli.user.as_deref()).await?;

    let text = match &cli.command {
        Commands::Tree { path } => commands::tree_command(&session, path).await?,
        Commands::Ls { path, long } => commands::ls_command(&session, path, *long).await?,
        Commands::Cat { path } => {
            let content = commands::cat_command(&session, path).await?;
            std::io::stdout().write_all(&content)?;
            return Ok(());
        }
        Commands::Stat { path, no_follow } => commands::stat_command(&session, path, *no_follow).await?,
        Commands::Du { path, bytes } => commands::du_command(&session, path, *bytes).await?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_from_environment() {
        // SAFETY: no other test reads or writes this variable.
        unsafe {
            std::env::set_var(CONFIG_ENV, "/etc/shellfs.yaml");
        }
        let cli = Cli::try_parse_from(["shellfs", "ls"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/shellfs.yaml")));

        let cli = Cli::try_parse_from(["shellfs", "--config", "/tmp/other.yaml", "ls"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/other.yaml")));
        unsafe {
            std::env::remove_var(CONFIG_ENV);
        }
    }
}
