use crate::error::Result;
use crate::live::LiveSnapshot;
use crate::merge::ReducedActionSet;
use crate::paths;
use crate::types::Ballot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// VoteSnapshot
// ---------------------------------------------------------------------------

/// The for/against roster of one resolution, as stored on disk.
///
/// Overwritten from the live feed every tick while the vote is open, then
/// finalized exactly once after it closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSnapshot {
    pub resolution_id: String,
    pub resolution_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coauthors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted: Option<i64>,
    #[serde(default)]
    pub votes_for: BTreeSet<String>,
    #[serde(default)]
    pub votes_against: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<i64>,
}

impl VoteSnapshot {
    pub fn new(resolution_id: impl Into<String>, resolution_name: impl Into<String>) -> Self {
        Self {
            resolution_id: resolution_id.into(),
            resolution_name: resolution_name.into(),
            chamber: None,
            proposed_by: None,
            coauthors: Vec::new(),
            promoted: None,
            votes_for: BTreeSet::new(),
            votes_against: BTreeSet::new(),
            finalized_at: None,
        }
    }

    /// Build the on-disk roster from a live observation.
    pub fn from_live(chamber: &str, live: &LiveSnapshot) -> Self {
        let mut snapshot = Self::new(&live.resolution_id, &live.name);
        snapshot.chamber = Some(chamber.to_string());
        snapshot.proposed_by = live.proposed_by.clone();
        snapshot.coauthors = live.coauthors.clone();
        snapshot.promoted = Some(live.promoted);
        let (votes_for, votes_against) =
            split_ballots(ballots_from(&live.votes_for, &live.votes_against));
        snapshot.votes_for = votes_for;
        snapshot.votes_against = votes_against;
        snapshot
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }

    pub fn total_votes(&self) -> usize {
        self.votes_for.len() + self.votes_against.len()
    }

    pub fn ballot_of(&self, actor: &str) -> Option<Ballot> {
        if self.votes_for.contains(actor) {
            Some(Ballot::For)
        } else if self.votes_against.contains(actor) {
            Some(Ballot::Against)
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load the roster for `resolution_id`, `None` if it was never written.
    pub fn load(root: &Path, resolution_id: &str) -> Result<Option<Self>> {
        paths::validate_resolution_id(resolution_id)?;
        let path = paths::roster_path(root, resolution_id);
        match crate::io::read_optional(&path)? {
            Some(data) => Ok(Some(serde_yaml::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        paths::validate_resolution_id(&self.resolution_id)?;
        let path = paths::roster_path(root, &self.resolution_id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Every roster under `resolutions/`, sorted by resolution id.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = paths::resolutions_dir(root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut rosters = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_roster = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(paths::ROSTER_SUFFIX));
            if !is_roster {
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            rosters.push(serde_yaml::from_str::<VoteSnapshot>(&data)?);
        }
        rosters.sort_by(|a, b| a.resolution_id.cmp(&b.resolution_id));
        Ok(rosters)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Apply a reduced action set to `existing` and return the final roster.
///
/// Withdrawals drop the actor, votes replace whatever the actor had. Pure and
/// idempotent: re-applying the same actions is a no-op.
pub fn finalize(existing: &VoteSnapshot, actions: &ReducedActionSet) -> VoteSnapshot {
    let mut ballots = ballots_from(&existing.votes_for, &existing.votes_against);
    for (actor, action) in actions {
        match action.kind.ballot() {
            Some(ballot) => {
                ballots.insert(actor.clone(), ballot);
            }
            None => {
                ballots.remove(actor);
            }
        }
    }

    let (votes_for, votes_against) = split_ballots(ballots);
    VoteSnapshot {
        votes_for,
        votes_against,
        ..existing.clone()
    }
}

/// Actor → ballot map. An actor listed on both sides keeps the `against`
/// entry, which is how the live feed lists a flip caught mid-update.
fn ballots_from(
    votes_for: impl IntoIterator<Item = impl AsRef<str>>,
    votes_against: impl IntoIterator<Item = impl AsRef<str>>,
) -> BTreeMap<String, Ballot> {
    let mut ballots = BTreeMap::new();
    for actor in votes_for {
        ballots.insert(actor.as_ref().to_string(), Ballot::For);
    }
    for actor in votes_against {
        ballots.insert(actor.as_ref().to_string(), Ballot::Against);
    }
    ballots
}

fn split_ballots(ballots: BTreeMap<String, Ballot>) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut votes_for = BTreeSet::new();
    let mut votes_against = BTreeSet::new();
    for (actor, ballot) in ballots {
        match ballot {
            Ballot::For => votes_for.insert(actor),
            Ballot::Against => votes_against.insert(actor),
        };
    }
    (votes_for, votes_against)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{VoteAction, VoteKind};
    use tempfile::TempDir;

    fn snapshot(votes_for: &[&str], votes_against: &[&str]) -> VoteSnapshot {
        let mut s = VoteSnapshot::new("612", "Clean Air");
        s.votes_for = votes_for.iter().map(|s| s.to_string()).collect();
        s.votes_against = votes_against.iter().map(|s| s.to_string()).collect();
        s
    }

    fn actions(items: &[(&str, VoteKind)]) -> ReducedActionSet {
        items
            .iter()
            .enumerate()
            .map(|(i, (actor, kind))| {
                (
                    actor.to_string(),
                    VoteAction {
                        actor: actor.to_string(),
                        kind: *kind,
                        timestamp: i as i64,
                        sequence_id: i as u64,
                    },
                )
            })
            .collect()
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn simple_flip() {
        let base = snapshot(&["A", "B"], &["C"]);
        let result = finalize(
            &base,
            &actions(&[("B", VoteKind::Against), ("D", VoteKind::For)]),
        );
        assert_eq!(names(&result.votes_for), vec!["A", "D"]);
        assert_eq!(names(&result.votes_against), vec!["B", "C"]);
        assert_eq!(result.resolution_id, "612");
        assert_eq!(result.resolution_name, "Clean Air");
    }

    #[test]
    fn withdraw_removes() {
        let base = snapshot(&["n1"], &[]);
        let result = finalize(&base, &actions(&[("n1", VoteKind::Withdraw)]));
        assert!(result.votes_for.is_empty());
        assert!(result.votes_against.is_empty());
    }

    #[test]
    fn withdraw_of_unknown_actor_is_noop() {
        let base = snapshot(&["n1"], &["n2"]);
        let result = finalize(&base, &actions(&[("ghost", VoteKind::Withdraw)]));
        assert_eq!(result, base);
    }

    #[test]
    fn finalize_is_idempotent() {
        let base = snapshot(&["A", "B", "E"], &["C", "F"]);
        let set = actions(&[
            ("A", VoteKind::Withdraw),
            ("C", VoteKind::For),
            ("G", VoteKind::Against),
            ("F", VoteKind::Against),
        ]);
        let once = finalize(&base, &set);
        let twice = finalize(&once, &set);
        assert_eq!(once, twice);
    }

    #[test]
    fn sides_stay_disjoint() {
        // a malformed base listing X on both sides still comes out disjoint
        let base = snapshot(&["X", "Y"], &["X", "Z"]);
        let set = actions(&[("Y", VoteKind::Against), ("Z", VoteKind::For)]);
        let result = finalize(&base, &set);
        assert!(result.votes_for.is_disjoint(&result.votes_against));
        assert_eq!(result.ballot_of("X"), Some(Ballot::Against));
        assert_eq!(result.ballot_of("Y"), Some(Ballot::Against));
        assert_eq!(result.ballot_of("Z"), Some(Ballot::For));
    }

    #[test]
    fn from_live_copies_metadata() {
        let live = LiveSnapshot {
            resolution_id: "77".to_string(),
            name: "Clean Air".to_string(),
            promoted: 1_700_000_000,
            proposed_by: Some("author".to_string()),
            coauthors: vec!["helper".to_string()],
            votes_for: vec!["a".to_string()],
            votes_against: vec!["b".to_string()],
        };
        let roster = VoteSnapshot::from_live("1", &live);
        assert_eq!(roster.chamber.as_deref(), Some("1"));
        assert_eq!(roster.promoted, Some(1_700_000_000));
        assert_eq!(roster.total_votes(), 2);
        assert!(!roster.is_finalized());
    }

    #[test]
    fn roster_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut roster = snapshot(&["a", "b"], &["c"]);
        roster.finalized_at = Some(42);
        roster.save(dir.path()).unwrap();

        let loaded = VoteSnapshot::load(dir.path(), "612").unwrap().unwrap();
        assert_eq!(loaded, roster);
        assert!(dir.path().join("resolutions/612_votes.yaml").exists());
    }

    #[test]
    fn missing_roster_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(VoteSnapshot::load(dir.path(), "612").unwrap().is_none());
    }

    #[test]
    fn list_sorts_and_skips_foreign_files() {
        let dir = TempDir::new().unwrap();
        VoteSnapshot::new("b2", "Second").save(dir.path()).unwrap();
        VoteSnapshot::new("a1", "First").save(dir.path()).unwrap();
        std::fs::write(dir.path().join("resolutions/README.md"), "notes").unwrap();

        let ids: Vec<String> = VoteSnapshot::list(dir.path())
            .unwrap()
            .into_iter()
            .map(|r| r.resolution_id)
            .collect();
        assert_eq!(ids, vec!["a1", "b2"]);
    }
}
