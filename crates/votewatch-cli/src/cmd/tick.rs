use crate::output::{print_json, print_table};
use std::path::Path;
use votewatch_core::lifecycle::{
    format_ts, ChamberOutcome, ChamberReport, Engine, Finalization, TickSettings,
};

pub fn run(
    root: &Path,
    chambers: &[String],
    user_agent: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (config, mut client) = super::client(root, user_agent)?;
    let chambers = if chambers.is_empty() {
        config.chambers.clone()
    } else {
        chambers.to_vec()
    };

    // The same client serves both the live feed and the event log; the engine
    // only ever uses one of them at a time.
    let mut log = client.clone();
    let settings = TickSettings::from(&config);
    let now = chrono::Utc::now().timestamp();
    let reports = Engine::new(root, &mut client, &mut log, settings).run_tick(&chambers, now);

    if json {
        return print_json(&reports);
    }

    let rows = reports.iter().map(describe).collect();
    print_table(&["CHAMBER", "OUTCOME", "DETAIL"], rows);
    Ok(())
}

fn describe(report: &ChamberReport) -> Vec<String> {
    let (outcome, detail) = match &report.outcome {
        ChamberOutcome::Idle => ("idle", "no resolution at vote".to_string()),
        ChamberOutcome::Opened {
            resolution_id,
            voting_end,
        } => (
            "opened",
            format!("{resolution_id} (closes {})", format_ts(*voting_end)),
        ),
        ChamberOutcome::Refreshed {
            resolution_id,
            voting_end,
        } => (
            "refreshed",
            format!("{resolution_id} (closes {})", format_ts(*voting_end)),
        ),
        ChamberOutcome::Closed { finalization } => ("closed", finalization_detail(finalization)),
        ChamberOutcome::Replaced {
            finalization,
            opened,
            ..
        } => (
            "replaced",
            format!("{}; now tracking {opened}", finalization_detail(finalization)),
        ),
        ChamberOutcome::Failed { error } => ("failed", error.clone()),
    };
    vec![report.chamber.clone(), outcome.to_string(), detail]
}

fn finalization_detail(finalization: &Finalization) -> String {
    match finalization {
        Finalization::Finalized(report) => {
            let mut detail = format!(
                "{} finalized: {} for, {} against",
                report.resolution_id, report.votes_for, report.votes_against
            );
            if let Some(reason) = &report.truncated {
                detail.push_str(&format!(" (partial log: {reason})"));
            }
            detail
        }
        Finalization::Failed {
            resolution_id,
            error,
        } => format!("{resolution_id} NOT finalized: {error}"),
    }
}
