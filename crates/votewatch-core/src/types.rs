use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// VoteKind
// ---------------------------------------------------------------------------

/// What a single log entry did to an actor's ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    For,
    Against,
    Withdraw,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::For => "for",
            VoteKind::Against => "against",
            VoteKind::Withdraw => "withdraw",
        }
    }

    /// The ballot this action leaves behind, `None` for a withdrawal.
    pub fn ballot(self) -> Option<Ballot> {
        match self {
            VoteKind::For => Some(Ballot::For),
            VoteKind::Against => Some(Ballot::Against),
            VoteKind::Withdraw => None,
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VoteKind {
    type Err = crate::error::VoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "for" => Ok(VoteKind::For),
            "against" => Ok(VoteKind::Against),
            "withdraw" => Ok(VoteKind::Withdraw),
            _ => Err(crate::error::VoteError::InvalidVoteKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Ballot
// ---------------------------------------------------------------------------

/// A standing vote on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ballot {
    For,
    Against,
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ballot::For => "for",
            Ballot::Against => "against",
        })
    }
}

// ---------------------------------------------------------------------------
// VoteAction
// ---------------------------------------------------------------------------

/// One parsed log entry, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteAction {
    pub actor: String,
    pub kind: VoteKind,
    /// Unix seconds.
    pub timestamp: i64,
    /// Source event id; higher is newer, used to break same-second ties.
    pub sequence_id: u64,
}

impl VoteAction {
    /// Chronological sort key.
    pub fn order_key(&self) -> (i64, u64) {
        (self.timestamp, self.sequence_id)
    }
}
