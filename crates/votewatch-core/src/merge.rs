//! Chronological merge of log pages into one action per actor.

use crate::event::{self, ActionLogPage};
use crate::types::VoteAction;
use std::collections::BTreeMap;

/// Final action per actor within a backfill window.
pub type ReducedActionSet = BTreeMap<String, VoteAction>;

/// Flatten `pages`, keep the notices about `expected_resolution`, and reduce
/// them to the chronologically latest action per actor.
///
/// Ordering is `(timestamp, sequence_id)`, so the result does not depend on
/// how the source happened to split events across pages.
pub fn reduce<I>(pages: I, expected_resolution: &str) -> ReducedActionSet
where
    I: IntoIterator<Item = ActionLogPage>,
{
    let mut actions: Vec<VoteAction> = pages
        .into_iter()
        .flatten()
        .filter_map(|raw| event::parse_event(&raw, expected_resolution))
        .collect();
    actions.sort_by_key(VoteAction::order_key);

    let mut reduced = ReducedActionSet::new();
    for action in actions {
        reduced.insert(action.actor.clone(), action);
    }
    reduced
}
