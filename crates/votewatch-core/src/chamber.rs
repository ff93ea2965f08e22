use crate::error::{Result, VoteError};
use crate::live::LiveSnapshot;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lifecycle record for one chamber: what was open at the last tick and when
/// it closes. Never holds vote content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamberState {
    #[serde(default)]
    pub open_resolution_id: Option<String>,
    #[serde(default)]
    pub open_resolution_name: Option<String>,
    #[serde(default)]
    pub last_observed_timestamp: Option<i64>,
    #[serde(default)]
    pub voting_end_timestamp: Option<i64>,
}

impl ChamberState {
    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load the state for `chamber`; a chamber never seen before is idle.
    pub fn load(root: &Path, chamber: &str) -> Result<Self> {
        paths::validate_chamber(chamber)?;
        let path = paths::chamber_state_path(root, chamber);
        match crate::io::read_optional(&path)? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path, chamber: &str) -> Result<()> {
        paths::validate_chamber(chamber)?;
        let path = paths::chamber_state_path(root, chamber);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub fn is_idle(&self) -> bool {
        self.open_resolution_id.is_none()
    }

    /// Start (or keep) tracking `live`, observed at `now`.
    pub fn observe(&mut self, live: &LiveSnapshot, now: i64, voting_duration_secs: i64) {
        self.open_resolution_id = Some(live.resolution_id.clone());
        self.open_resolution_name = Some(live.name.clone());
        self.last_observed_timestamp = Some(now);
        self.voting_end_timestamp = Some(live.voting_end(voting_duration_secs));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The `[last observed, voting end]` span the event log has to cover for
    /// the open resolution.
    pub fn backfill_window(&self, chamber: &str) -> Result<(i64, i64)> {
        let resolution = self.open_resolution_id.clone().unwrap_or_default();
        let incomplete = |field| VoteError::IncompleteChamberState {
            chamber: chamber.to_string(),
            resolution: resolution.clone(),
            field,
        };
        let since = self
            .last_observed_timestamp
            .ok_or_else(|| incomplete("last observed timestamp"))?;
        let before = self
            .voting_end_timestamp
            .ok_or_else(|| incomplete("voting end timestamp"))?;
        Ok((since, before))
    }
}
