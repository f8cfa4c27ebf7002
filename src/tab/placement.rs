//! Where a newly opened, duplicated or restored tab lands in the strip.
//!
//! Positions are computed over the moving tab's lane with the moving tab
//! taken out, so the result is the tab's final lane position and applying it
//! twice is a no-op.

use super::selection::get_family_tab;
use super::store::TabStore;
use super::TabId;
use crate::host::TabCollection;
use tab_lineage_config::{Direction, FamilyRule, OpenPosition, Reach, Relation};

/// Final lane position of `moving` under `position`
///
/// `lane` includes `moving`. Returns `None` for [`OpenPosition::Default`], when
/// `moving` is not in the lane, or when a base-relative position has no base.
/// A base outside the lane (a pinned opener) puts the tab at the lane start.
/// Hidden bases are handled by [`resolve_move`].
pub fn compute_insert_index(
    lane: &[TabId],
    store: &TabStore,
    base: Option<TabId>,
    moving: TabId,
    position: OpenPosition,
) -> Option<usize> {
    if !lane.contains(&moving) {
        return None;
    }
    let others: Vec<TabId> = lane.iter().copied().filter(|&id| id != moving).collect();

    let base_pos = || -> Option<Option<usize>> {
        let base = base?;
        Some(others.iter().position(|&id| id == base))
    };

    match position {
        OpenPosition::Default => None,
        OpenPosition::FirstEnd => Some(0),
        OpenPosition::LastEnd => Some(others.len()),
        OpenPosition::PrevAdjacent => Some(base_pos()?.unwrap_or(0)),
        OpenPosition::NextAdjacent => Some(base_pos()?.map_or(0, |pos| pos + 1)),
        OpenPosition::NextIncrementDescendant => {
            let Some(pos) = base_pos()? else {
                return Some(0);
            };
            let base = others[pos];
            let rule = FamilyRule::new(Direction::Next, Reach::Farthest, false, Relation::Descendant);
            let last_descendant = get_family_tab(&others, store, base, rule)
                .and_then(|id| others.iter().position(|&other| other == id));
            Some(last_descendant.unwrap_or(pos) + 1)
        }
    }
}

/// Full-strip index to hand to the host, or `None` when nothing should move
///
/// A hidden base leaves the tab where the host put it for the base-relative
/// positions. Hidden tabs have no lane position to be adjacent to.
pub fn resolve_move(
    tabs: &TabCollection,
    store: &TabStore,
    base: Option<TabId>,
    moving: TabId,
    position: OpenPosition,
) -> Option<usize> {
    let base_relative = matches!(
        position,
        OpenPosition::PrevAdjacent | OpenPosition::NextAdjacent | OpenPosition::NextIncrementDescendant
    );
    if base_relative
        && let Some(base) = base
        && base != moving
        && tabs.get(base).is_some_and(|t| t.hidden)
    {
        log::debug!("Base tab {} is hidden, leaving tab {} in place", base, moving);
        return None;
    }
    let lane = tabs.lane_for(moving);
    let target = compute_insert_index(&lane, store, base, moving, position)?;
    let current_host = tabs.host_index(moving)?;

    let others: Vec<TabId> = lane.iter().copied().filter(|&id| id != moving).collect();
    let strip: Vec<TabId> = tabs
        .host_tabs()
        .iter()
        .map(|t| t.id)
        .filter(|&id| id != moving)
        .collect();
    let host_index = match others.get(target) {
        Some(anchor) => strip.iter().position(|id| id == anchor)?,
        None => match others.last() {
            Some(last) => strip.iter().position(|id| id == last)? + 1,
            None => current_host,
        },
    };

    (host_index != current_host).then_some(host_index)
}
