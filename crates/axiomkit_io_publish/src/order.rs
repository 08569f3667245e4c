//! Execution ordering of planned actions.

use std::collections::HashSet;

use tracing::trace;

use crate::spec::SpecAction;

/// Group actions by kind in [`crate::spec::EnumActionKind`] order and drop duplicates.
///
/// Within one kind, first-occurrence order is kept. Archives therefore run
/// before the directories they would see created, and directories exist before
/// files are copied into them.
pub fn order_actions(actions: Vec<SpecAction>) -> Vec<SpecAction> {
    let n_planned = actions.len();
    let mut l_sorted = actions;
    l_sorted.sort_by_key(|action| action.kind);

    let mut set_seen = HashSet::with_capacity(l_sorted.len());
    let l_ordered: Vec<SpecAction> = l_sorted
        .into_iter()
        .filter(|action| set_seen.insert(action.clone()))
        .collect();

    trace!(
        n_planned,
        n_ordered = l_ordered.len(),
        "ordered actions by kind"
    );
    l_ordered
}
