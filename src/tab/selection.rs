//! Selection policy: which tab becomes current when the selected one closes.
//!
//! Resolution is pure. It reads a [`TabCollection`] snapshot, the metadata
//! store and the closed-tab archive, and returns a [`SelectOutcome`] that the
//! manager carries out.

use super::read_state::SelectedTimes;
use super::store::TabStore;
use super::TabId;
use crate::host::TabCollection;
use crate::session::ClosedArchive;
use tab_lineage_config::{Direction, FamilyRule, Reach, Relation, SelectPolicy, SelectPosition};

/// What the engine should do to pick the next tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Select an existing tab
    Tab(TabId),
    /// Reopen an archived tab and select it
    RestoreClosed(TabId),
    /// Open a fresh tab on this URL and select it
    OpenUrl(String),
}

/// Everything a resolution reads
pub struct SelectionContext<'a> {
    pub tabs: &'a TabCollection,
    pub store: &'a TabStore,
    pub archive: &'a ClosedArchive,
    pub times: SelectedTimes,
}

/// Walk the lane from `base` in one direction looking for relatives
///
/// Adjacent reach inspects only the immediate neighbour. Farthest reach
/// returns the last tab of the contiguous run of relatives.
pub fn get_family_tab(
    lane: &[TabId],
    store: &TabStore,
    base: TabId,
    rule: FamilyRule,
) -> Option<TabId> {
    let pos = lane.iter().position(|&id| id == base)?;
    let step = |i: usize| -> Option<usize> {
        match rule.direction {
            Direction::Prev => i.checked_sub(1),
            Direction::Next => (i + 1 < lane.len()).then_some(i + 1),
        }
    };

    let mut cursor = step(pos)?;
    if !is_related(store, base, lane[cursor], rule) {
        return None;
    }
    if rule.reach == Reach::Farthest {
        while let Some(next) = step(cursor) {
            if !is_related(store, base, lane[next], rule) {
                break;
            }
            cursor = next;
        }
    }
    Some(lane[cursor])
}

fn is_related(store: &TabStore, base: TabId, candidate: TabId, rule: FamilyRule) -> bool {
    match rule.relation {
        Relation::Ancestor => store.is_descendant(base, candidate),
        Relation::Descendant => {
            let chain = store.ancestors(candidate);
            chain.contains(&base)
                || (rule.extended
                    && store
                        .get(base)
                        .and_then(|meta| meta.parent())
                        .is_some_and(|parent| chain.contains(&parent)))
        }
    }
}

/// The tab that opened `base`
///
/// An opener that is gone can be brought back from the archive when
/// `undo_close` is set. A tab with no recorded opener falls back to its
/// referrer URL under the same flag.
pub fn get_opener_tab(
    ctx: &SelectionContext<'_>,
    base: TabId,
    undo_close: bool,
) -> Option<SelectOutcome> {
    let meta = ctx.store.get(base)?;
    match meta.parent() {
        Some(parent) => {
            if ctx.tabs.candidates(base).contains(&parent) {
                Some(SelectOutcome::Tab(parent))
            } else if undo_close && ctx.archive.find_by_id(parent).is_some() {
                Some(SelectOutcome::RestoreClosed(parent))
            } else {
                None
            }
        }
        None if undo_close => meta
            .open_info
            .effective_referrer()
            .map(|url| SelectOutcome::OpenUrl(url.to_string())),
        None => None,
    }
}

/// The most recently selected tab other than `base`
///
/// Without `trace_back` the most recent candidate is accepted only if it
/// holds the window's previous selection time. With `undo_close` a closed
/// tab holding that time is restored instead.
pub fn get_prev_selected_tab(
    ctx: &SelectionContext<'_>,
    base: TabId,
    trace_back: bool,
    undo_close: bool,
) -> Option<SelectOutcome> {
    let latest = ctx
        .tabs
        .candidates(base)
        .into_iter()
        .filter_map(|id| Some((ctx.store.get(id)?.select_time?, id)))
        .max();

    if let Some((time, id)) = latest
        && (trace_back || Some(time) == ctx.times.previous)
    {
        return Some(SelectOutcome::Tab(id));
    }

    if undo_close
        && let Some(previous) = ctx.times.previous
        && let Some(entry) = ctx.archive.find_by_select_time(previous)
    {
        return Some(SelectOutcome::RestoreClosed(entry.id));
    }
    None
}

/// The earliest-opened tab that was never read
pub fn get_oldest_unread_tab(
    ctx: &SelectionContext<'_>,
    base: TabId,
    include_pinned: bool,
) -> Option<TabId> {
    let pool = if include_pinned {
        ctx.tabs.candidates(base)
    } else {
        ctx.tabs.active()
    };
    pool.into_iter()
        .filter(|&id| id != base)
        .filter(|&id| ctx.store.get(id).is_some_and(|meta| !meta.read))
        .min()
}

/// Evaluate `positions` in order and return the first hit
///
/// `Default` ends the evaluation and leaves the choice to the host.
pub fn select_tab_at(
    ctx: &SelectionContext<'_>,
    base: TabId,
    positions: &[SelectPosition],
    flags: &SelectPolicy,
) -> Option<SelectOutcome> {
    let lane = ctx.tabs.lane_for(base);
    for position in positions {
        let found = match position {
            SelectPosition::Default => return None,
            SelectPosition::FirstEnd => lane.iter().copied().find(|&id| id != base).map(SelectOutcome::Tab),
            SelectPosition::LastEnd => lane
                .iter()
                .rev()
                .copied()
                .find(|&id| id != base)
                .map(SelectOutcome::Tab),
            SelectPosition::PrevAdjacent => neighbour(&lane, base, Direction::Prev).map(SelectOutcome::Tab),
            SelectPosition::NextAdjacent => neighbour(&lane, base, Direction::Next).map(SelectOutcome::Tab),
            SelectPosition::Family(rule) => {
                get_family_tab(&lane, ctx.store, base, *rule).map(SelectOutcome::Tab)
            }
            SelectPosition::AnywhereOpener => get_opener_tab(ctx, base, flags.undo_close),
            SelectPosition::AnywherePrevSelected => {
                get_prev_selected_tab(ctx, base, flags.trace_back, flags.undo_close)
            }
            SelectPosition::AnywhereOldestUnread => {
                get_oldest_unread_tab(ctx, base, flags.include_pinned_unread).map(SelectOutcome::Tab)
            }
        };
        if let Some(outcome) = found {
            log::debug!("Selection for tab {} resolved by {}: {:?}", base, position, outcome);
            return Some(outcome);
        }
    }
    None
}

fn neighbour(lane: &[TabId], base: TabId, direction: Direction) -> Option<TabId> {
    let pos = lane.iter().position(|&id| id == base)?;
    match direction {
        Direction::Prev => pos.checked_sub(1).map(|i| lane[i]),
        Direction::Next => lane.get(pos + 1).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostTab;
    use crate::tab::{OpenInfo, TabMeta};

    fn store_with(chains: &[(TabId, &[TabId])]) -> TabStore {
        let mut store = TabStore::new();
        for (id, ancestors) in chains {
            let mut meta = TabMeta::new(*id, OpenInfo::new(format!("https://t{id}.example")));
            meta.ancestors = ancestors.to_vec();
            store.insert(meta);
        }
        store
    }

    fn rule(direction: Direction, reach: Reach, extended: bool, relation: Relation) -> FamilyRule {
        FamilyRule::new(direction, reach, extended, relation)
    }

    #[test]
    fn adjacent_ancestor_is_the_immediate_opener() {
        let store = store_with(&[(1, &[]), (2, &[1]), (3, &[2, 1])]);
        let lane = [1, 2, 3];
        let prev_ancestor = rule(Direction::Prev, Reach::Adjacent, false, Relation::Ancestor);
        assert_eq!(get_family_tab(&lane, &store, 3, prev_ancestor), Some(2));
        assert_eq!(get_family_tab(&lane, &store, 2, prev_ancestor), Some(1));
        assert_eq!(get_family_tab(&lane, &store, 1, prev_ancestor), None);
    }

    #[test]
    fn farthest_descendant_stops_at_first_stranger() {
        let store = store_with(&[(1, &[]), (2, &[1]), (3, &[2, 1]), (4, &[]), (5, &[1])]);
        let lane = [1, 2, 3, 4, 5];
        let next_far = rule(Direction::Next, Reach::Farthest, false, Relation::Descendant);
        assert_eq!(get_family_tab(&lane, &store, 1, next_far), Some(3));
    }

    #[test]
    fn extended_descendant_includes_siblings() {
        let store = store_with(&[(1, &[]), (2, &[1]), (3, &[1])]);
        let lane = [1, 2, 3];
        let strict = rule(Direction::Next, Reach::Adjacent, false, Relation::Descendant);
        let extended = rule(Direction::Next, Reach::Adjacent, true, Relation::Descendant);
        assert_eq!(get_family_tab(&lane, &store, 2, strict), None);
        assert_eq!(get_family_tab(&lane, &store, 2, extended), Some(3));
    }

    #[test]
    fn oldest_unread_skips_pinned_unless_asked() {
        let mut store = store_with(&[(1, &[]), (2, &[]), (3, &[]), (4, &[])]);
        store.get_mut(2).unwrap().read = true;
        let tabs = TabCollection::new(vec![
            HostTab {
                pinned: true,
                ..HostTab::new(1)
            },
            HostTab::new(2),
            HostTab::new(3),
            HostTab::new(4),
        ]);
        let archive = ClosedArchive::new();
        let ctx = SelectionContext {
            tabs: &tabs,
            store: &store,
            archive: &archive,
            times: SelectedTimes::default(),
        };
        assert_eq!(get_oldest_unread_tab(&ctx, 4, false), Some(3));
        assert_eq!(get_oldest_unread_tab(&ctx, 4, true), Some(1));
    }

    #[test]
    fn default_stops_the_list() {
        let store = store_with(&[(1, &[]), (2, &[])]);
        let tabs = TabCollection::new(vec![HostTab::new(1), HostTab::new(2)]);
        let archive = ClosedArchive::new();
        let ctx = SelectionContext {
            tabs: &tabs,
            store: &store,
            archive: &archive,
            times: SelectedTimes::default(),
        };
        let positions = [SelectPosition::Default, SelectPosition::FirstEnd];
        assert_eq!(select_tab_at(&ctx, 2, &positions, &SelectPolicy::default()), None);
        assert_eq!(
            select_tab_at(&ctx, 2, &positions[1..], &SelectPolicy::default()),
            Some(SelectOutcome::Tab(1))
        );
    }
}
