//! Per-chamber resolution lifecycle: `Idle` → `Open(R)` → `Idle`.
//!
//! Each tick feeds every chamber the current live observation. A resolution
//! that disappears from the feed (or is replaced by another one) is
//! backfilled from the event log and finalized exactly once.

use crate::chamber::ChamberState;
use crate::config::Config;
use crate::error::Result;
use crate::live::{LiveSnapshot, LiveSource};
use crate::paginate::LogSource;
use crate::reconcile::{self, BackfillSettings, ReconcileReport};
use crate::roster::VoteSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TickSettings {
    pub voting_duration_secs: i64,
    pub backfill: BackfillSettings,
}

impl From<&Config> for TickSettings {
    fn from(config: &Config) -> Self {
        Self {
            voting_duration_secs: config.voting_duration_secs,
            backfill: BackfillSettings {
                page_size: config.api.page_size,
                request_interval: config.api.request_interval(),
                log_retention_secs: config.log_retention_secs,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How finalizing a closed resolution went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Finalization {
    Finalized(ReconcileReport),
    /// Left un-finalized; retried on a later tick or by `backfill`.
    Failed { resolution_id: String, error: String },
}

/// What one tick did for one chamber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChamberOutcome {
    Idle,
    Opened {
        resolution_id: String,
        voting_end: i64,
    },
    Refreshed {
        resolution_id: String,
        voting_end: i64,
    },
    Closed {
        finalization: Finalization,
    },
    Replaced {
        finalization: Finalization,
        opened: String,
        voting_end: i64,
    },
    /// Nothing changed on disk; the chamber is retried next tick.
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamberReport {
    pub chamber: String,
    #[serde(flatten)]
    pub outcome: ChamberOutcome,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine<'a, L, H> {
    root: &'a Path,
    live: L,
    log: H,
    settings: TickSettings,
}

impl<'a, L: LiveSource, H: LogSource> Engine<'a, L, H> {
    pub fn new(root: &'a Path, live: L, log: H, settings: TickSettings) -> Self {
        Self {
            root,
            live,
            log,
            settings,
        }
    }

    /// Run one polling tick over `chambers`, in order. A failing chamber never
    /// stops the others.
    pub fn run_tick(&mut self, chambers: &[String], now: i64) -> Vec<ChamberReport> {
        chambers
            .iter()
            .map(|chamber| {
                let outcome = match self.tick_chamber(chamber, now) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(chamber = %chamber, error = %e, "chamber tick abandoned");
                        ChamberOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                ChamberReport {
                    chamber: chamber.clone(),
                    outcome,
                }
            })
            .collect()
    }

    fn tick_chamber(&mut self, chamber: &str, now: i64) -> Result<ChamberOutcome> {
        let mut state = ChamberState::load(self.root, chamber)?;
        let live = self.live.fetch_live(chamber)?;

        let outcome = match (state.open_resolution_id.clone(), live) {
            (None, None) => {
                info!(chamber = %chamber, "no resolution at vote");
                return Ok(ChamberOutcome::Idle);
            }
            (None, Some(live)) => {
                self.observe(chamber, &mut state, &live, now)?;
                let voting_end = live.voting_end(self.settings.voting_duration_secs);
                ChamberOutcome::Opened {
                    resolution_id: live.resolution_id,
                    voting_end,
                }
            }
            (Some(open), Some(live)) if open == live.resolution_id => {
                self.observe(chamber, &mut state, &live, now)?;
                let voting_end = live.voting_end(self.settings.voting_duration_secs);
                ChamberOutcome::Refreshed {
                    resolution_id: live.resolution_id,
                    voting_end,
                }
            }
            (Some(open), None) => match self.finalize_open(chamber, &open, &state, now) {
                Ok(report) => {
                    state.clear();
                    ChamberOutcome::Closed {
                        finalization: Finalization::Finalized(report),
                    }
                }
                // State stays Open(R) on disk, so a later tick retries once
                // the roster is restored.
                Err(e) if e.is_permanent() => {
                    error!(
                        chamber = %chamber,
                        resolution = %open,
                        window = ?state.backfill_window(chamber).ok(),
                        error = %e,
                        "resolution left un-finalized"
                    );
                    return Ok(ChamberOutcome::Closed {
                        finalization: Finalization::Failed {
                            resolution_id: open,
                            error: e.to_string(),
                        },
                    });
                }
                Err(e) => return Err(e),
            },
            (Some(open), Some(live)) => {
                info!(
                    chamber = %chamber,
                    closed = %open,
                    opened = %live.resolution_id,
                    "resolution replaced between ticks"
                );
                // The new resolution has to be tracked either way, so any
                // failure here is reported rather than retried.
                let finalization = match self.finalize_open(chamber, &open, &state, now) {
                    Ok(report) => Finalization::Finalized(report),
                    Err(e) => {
                        error!(
                            chamber = %chamber,
                            resolution = %open,
                            window = ?state.backfill_window(chamber).ok(),
                            error = %e,
                            "resolution left un-finalized"
                        );
                        Finalization::Failed {
                            resolution_id: open,
                            error: e.to_string(),
                        }
                    }
                };
                state.clear();
                self.observe(chamber, &mut state, &live, now)?;
                let voting_end = live.voting_end(self.settings.voting_duration_secs);
                ChamberOutcome::Replaced {
                    finalization,
                    opened: live.resolution_id,
                    voting_end,
                }
            }
        };

        state.save(self.root, chamber)?;
        Ok(outcome)
    }

    /// `Idle + R` and `Open(R) + R`: overwrite the roster from the live
    /// feed and record the observation.
    fn observe(
        &self,
        chamber: &str,
        state: &mut ChamberState,
        live: &LiveSnapshot,
        now: i64,
    ) -> Result<()> {
        let roster = VoteSnapshot::from_live(chamber, live);
        roster.save(self.root)?;
        state.observe(live, now, self.settings.voting_duration_secs);

        let voting_end = live.voting_end(self.settings.voting_duration_secs);
        info!(
            chamber = %chamber,
            resolution = %live.resolution_id,
            votes_for = roster.votes_for.len(),
            votes_against = roster.votes_against.len(),
            remaining = %format_remaining(voting_end - now),
            end = %format_ts(voting_end),
            "vote record saved"
        );
        Ok(())
    }

    fn finalize_open(
        &mut self,
        chamber: &str,
        resolution_id: &str,
        state: &ChamberState,
        now: i64,
    ) -> Result<ReconcileReport> {
        let (since, before) = state.backfill_window(chamber)?;
        info!(
            chamber = %chamber,
            resolution = %resolution_id,
            since = %format_ts(since),
            before = %format_ts(before),
            "voting closed; backfilling from event log"
        );
        if now < before {
            warn!(
                chamber = %chamber,
                resolution = %resolution_id,
                "resolution left the floor before its scheduled close"
            );
        }
        reconcile::backfill(
            self.root,
            &mut self.log,
            resolution_id,
            since,
            before,
            &self.settings.backfill,
            now,
        )
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Unix seconds as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_ts(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Seconds as `[-]Nd HH:MM:SS`.
pub fn format_remaining(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    let (days, rest) = (secs / 86_400, secs % 86_400);
    format!(
        "{sign}{days}d {:02}:{:02}:{:02}",
        rest / 3_600,
        (rest % 3_600) / 60,
        rest % 60
    )
}
