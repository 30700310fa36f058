//! `memchat config {show,get}`

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use crate::settings::AppConfig;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration (default)
    Show,
    /// Print a single setting
    Get {
        /// Setting key (dot notation: client.retry.max_attempts)
        key: String,
    },
}

pub fn run(config: &AppConfig, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let rendered = toml::to_string_pretty(&config.redacted())
                .context("Failed to serialize config")?;
            print!("{rendered}");
        }
        ConfigCommands::Get { key } => println!("{}", lookup(config, &key)?),
    }
    Ok(())
}

fn lookup(config: &AppConfig, key: &str) -> Result<String> {
    let root = toml::Value::try_from(config.redacted()).context("Failed to serialize config")?;

    let mut current = &root;
    for part in key.split('.') {
        current = match current.get(part) {
            Some(value) => value,
            None => bail!("Unknown setting: {key}"),
        };
    }

    Ok(match current {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
