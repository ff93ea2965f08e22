pub mod backfill;
pub mod config;
pub mod init;
pub mod show;
pub mod status;
pub mod tick;

use anyhow::Context;
use std::path::Path;
use votewatch_core::config::Config;
use votewatch_core::nationstates::NsClient;

/// Load the config and build an API client, honoring a User-Agent override.
pub(crate) fn client(
    root: &Path,
    user_agent: Option<String>,
) -> anyhow::Result<(Config, NsClient)> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(ua) = user_agent {
        config.api.user_agent = ua;
    }
    let client = NsClient::new(&config.api).context("failed to build HTTP client")?;
    Ok((config, client))
}
