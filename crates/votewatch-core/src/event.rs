//! Event parsing: free-text vote notices from the historical log into
//! typed [`VoteAction`]s.
//!
//! Two notice shapes are recognized:
//!
//! ```text
//! @@actor@@ voted for the World Assembly Resolution "Name".
//! @@actor@@ withdrew its vote on the World Assembly Resolution "Name".
//! ```
//!
//! The `@@` wrapper is optional. Everything that does not match, or matches a
//! different resolution, is rejected with `None`.

use crate::types::{VoteAction, VoteKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One raw log entry as returned by a page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub id: Option<u64>,
}

impl RawEvent {
    pub fn new(id: u64, timestamp: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Some(timestamp),
            id: Some(id),
        }
    }
}

/// Entries from one fetch, newest first.
pub type ActionLogPage = Vec<RawEvent>;

static NOTICE_RE: OnceLock<Regex> = OnceLock::new();

fn notice_re() -> &'static Regex {
    NOTICE_RE.get_or_init(|| {
        Regex::new(
            r#"^(?:@@(?P<wrapped>[A-Za-z0-9_]+)@@|(?P<bare>[A-Za-z0-9_]+)) (?:voted (?P<dir>for|against)|withdrew its vote on) the .*?Resolution "(?P<name>.+)"\.$"#,
        )
        .unwrap()
    })
}

/// Recognize a vote notice for `expected_resolution` and return the actor and
/// what they did.
pub fn parse(raw_text: &str, expected_resolution: &str) -> Option<(String, VoteKind)> {
    let caps = notice_re().captures(raw_text.trim())?;
    if &caps["name"] != expected_resolution {
        return None;
    }
    let actor = caps.name("wrapped").or_else(|| caps.name("bare"))?;
    let kind = match caps.name("dir") {
        Some(dir) => dir.as_str().parse().ok()?,
        None => VoteKind::Withdraw,
    };
    Some((actor.as_str().to_string(), kind))
}

/// Parse a full log entry. Entries without a timestamp or id are malformed
/// and rejected like any other non-match.
pub fn parse_event(event: &RawEvent, expected_resolution: &str) -> Option<VoteAction> {
    let timestamp = event.timestamp?;
    let sequence_id = event.id?;
    let (actor, kind) = parse(&event.text, expected_resolution)?;
    Some(VoteAction {
        actor,
        kind,
        timestamp,
        sequence_id,
    })
}
