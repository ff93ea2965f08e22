use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What the live feed reports for a resolution currently at vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub resolution_id: String,
    pub name: String,
    /// When the resolution was promoted to the floor, unix seconds.
    pub promoted: i64,
    #[serde(default)]
    pub proposed_by: Option<String>,
    #[serde(default)]
    pub coauthors: Vec<String>,
    #[serde(default)]
    pub votes_for: Vec<String>,
    #[serde(default)]
    pub votes_against: Vec<String>,
}

impl LiveSnapshot {
    pub fn voting_end(&self, voting_duration_secs: i64) -> i64 {
        self.promoted + voting_duration_secs
    }
}

/// Anything that can report the resolution currently at vote in a chamber.
///
/// `Ok(None)` means nothing is at vote right now.
pub trait LiveSource {
    fn fetch_live(&mut self, chamber: &str) -> Result<Option<LiveSnapshot>>;
}

impl<T: LiveSource + ?Sized> LiveSource for &mut T {
    fn fetch_live(&mut self, chamber: &str) -> Result<Option<LiveSnapshot>> {
        (**self).fetch_live(chamber)
    }
}
