//! Backfill of a closed resolution: replay the event log over the window
//! since the last live observation and fold it into the stored roster.

use crate::error::{Result, VoteError};
use crate::merge;
use crate::paginate::{self, LogSource};
use crate::roster::{self, VoteSnapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Knobs for one backfill run.
#[derive(Debug, Clone)]
pub struct BackfillSettings {
    pub page_size: usize,
    pub request_interval: Duration,
    /// How far back from `now` the log is still served.
    pub log_retention_secs: i64,
}

/// Summary of a finished backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub resolution_id: String,
    pub since: i64,
    pub before: i64,
    pub fetches: usize,
    pub entries: usize,
    /// Distinct actors whose final action was applied.
    pub actions: usize,
    pub votes_for: usize,
    pub votes_against: usize,
    /// Set when a page fetch failed and the window was cut short.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<String>,
}

/// Replay `[since, before]` of the event log onto the stored roster for
/// `resolution_id`, then persist the finalized roster.
///
/// A missing roster is an error. A page fetch failure is not: the roster is
/// finalized with whatever was retrieved and the report carries the reason.
pub fn backfill<H: LogSource + ?Sized>(
    root: &Path,
    log: &mut H,
    resolution_id: &str,
    since: i64,
    before: i64,
    settings: &BackfillSettings,
    now: i64,
) -> Result<ReconcileReport> {
    let base = VoteSnapshot::load(root, resolution_id)?
        .ok_or_else(|| VoteError::MissingBaseSnapshot(resolution_id.to_string()))?;

    if since < now - settings.log_retention_secs {
        warn!(
            resolution = %resolution_id,
            since,
            before,
            retention_secs = settings.log_retention_secs,
            "backfill window starts before the log retention horizon; early events may be lost"
        );
    }

    let mut pager = paginate::fetch_window(log, since, before, settings.page_size)
        .with_interval(settings.request_interval);
    let actions = merge::reduce(pager.by_ref(), &base.resolution_name);
    let truncated = pager.truncated().map(str::to_string);
    if let Some(reason) = &truncated {
        warn!(
            resolution = %resolution_id,
            since,
            before,
            fetches = pager.fetch_count(),
            error = %reason,
            "backfill window truncated; finalizing with partial log"
        );
    }

    let mut finalized = roster::finalize(&base, &actions);
    finalized.finalized_at = Some(now);
    finalized.save(root)?;

    let report = ReconcileReport {
        resolution_id: resolution_id.to_string(),
        since,
        before,
        fetches: pager.fetch_count(),
        entries: pager.entry_count(),
        actions: actions.len(),
        votes_for: finalized.votes_for.len(),
        votes_against: finalized.votes_against.len(),
        truncated,
    };
    info!(
        resolution = %resolution_id,
        since,
        before,
        entries = report.entries,
        actions = report.actions,
        votes_for = report.votes_for,
        votes_against = report.votes_against,
        "resolution finalized"
    );
    Ok(report)
}
