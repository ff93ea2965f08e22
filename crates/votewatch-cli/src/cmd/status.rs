use crate::output::{print_json, print_table};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use votewatch_core::{
    chamber::ChamberState,
    config::Config,
    lifecycle::{format_remaining, format_ts},
};

#[derive(Serialize)]
struct ChamberStatus {
    chamber: String,
    #[serde(flatten)]
    state: ChamberState,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let now = chrono::Utc::now().timestamp();

    let mut statuses = Vec::new();
    for chamber in &config.chambers {
        let state = ChamberState::load(root, chamber)
            .with_context(|| format!("failed to load state for chamber {chamber}"))?;
        statuses.push(ChamberStatus {
            chamber: chamber.clone(),
            state,
        });
    }

    if json {
        return print_json(&statuses);
    }

    let rows = statuses
        .iter()
        .map(|s| match &s.state.open_resolution_id {
            None => vec![s.chamber.clone(), "idle".to_string()],
            Some(id) => {
                let name = s.state.open_resolution_name.as_deref().unwrap_or("?");
                let seen = s
                    .state
                    .last_observed_timestamp
                    .map(format_ts)
                    .unwrap_or_else(|| "-".to_string());
                let end = s
                    .state
                    .voting_end_timestamp
                    .map(|t| format!("{} ({} left)", format_ts(t), format_remaining(t - now)))
                    .unwrap_or_else(|| "-".to_string());
                vec![
                    s.chamber.clone(),
                    format!("{id} \"{name}\""),
                    seen,
                    end,
                ]
            }
        })
        .collect();
    print_table(&["CHAMBER", "TRACKING", "LAST SEEN", "CLOSES"], rows);
    Ok(())
}
