use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use votewatch_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective config
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, json),
        ConfigSubcommand::Validate => validate(&config, json),
    }
}

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    println!("chambers:             {}", config.chambers.join(", "));
    println!("voting duration:      {}s", config.voting_duration_secs);
    println!("log retention:        {}s", config.log_retention_secs);
    println!("api base url:         {}", config.api.base_url);
    println!("api user agent:       {}", config.api.user_agent);
    println!("api page size:        {}", config.api.page_size);
    println!("api request interval: {}ms", config.api.request_interval_ms);
    println!("api timeout:          {}s", config.api.timeout_secs);
    Ok(())
}

fn validate(config: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
