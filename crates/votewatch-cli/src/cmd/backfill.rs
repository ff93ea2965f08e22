use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use votewatch_core::lifecycle::{format_ts, TickSettings};
use votewatch_core::reconcile;

pub fn run(
    root: &Path,
    resolution: &str,
    since: i64,
    until: i64,
    user_agent: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    if since > until {
        anyhow::bail!("--since ({since}) is after --until ({until})");
    }
    let (config, mut client) = super::client(root, user_agent)?;
    let settings = TickSettings::from(&config);
    let now = chrono::Utc::now().timestamp();

    let report = reconcile::backfill(
        root,
        &mut client,
        resolution,
        since,
        until,
        &settings.backfill,
        now,
    )
    .with_context(|| format!("backfill failed for resolution {resolution}"))?;

    if json {
        return print_json(&report);
    }

    println!(
        "Finalized {} over {} .. {}",
        report.resolution_id,
        format_ts(report.since),
        format_ts(report.before)
    );
    println!(
        "  {} log entries in {} page(s), {} actor(s) updated",
        report.entries, report.fetches, report.actions
    );
    println!(
        "  final tally: {} for, {} against",
        report.votes_for, report.votes_against
    );
    if let Some(reason) = &report.truncated {
        println!("  warning: log fetch stopped early ({reason}); tally may be incomplete");
    }
    Ok(())
}
