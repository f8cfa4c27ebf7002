//! Genealogy, placement and close-time selection
//!
//! Covers the open path (id allocation, ancestor chains, insertion policy),
//! duplicates, and the close path's select-position list.

mod common;

use common::{TestWindow, config_without_suspension};
use std::sync::Arc;
use tab_lineage::LineageError;
use tab_lineage::config::{
    Config, Direction, FamilyRule, OpenPosition, Reach, Relation, SelectPolicy, SelectPosition,
};
use tab_lineage::host::{HostTab, StaticHistory, TabCollection, TabHost};
use tab_lineage::session::ClosedArchive;
use tab_lineage::tab::placement::{compute_insert_index, resolve_move};
use tab_lineage::tab::read_state::SelectedTimes;
use tab_lineage::tab::selection::{SelectionContext, get_family_tab, select_tab_at};
use tab_lineage::tab::{
    EventOutcome, OpenInfo, OpenRequest, SelectOutcome, TabEvent, TabMeta, TabStore,
};

// ============================================================================
// Genealogy
// ============================================================================

#[tokio::test]
async fn test_ids_strictly_increase_within_one_tick() {
    let mut window = TestWindow::new(config_without_suspension());
    let ids: Vec<_> = (0..6)
        .map(|i| window.open(&format!("about:blank#{i}")))
        .collect();
    assert_eq!(window.now(), common::START_TIME, "clock never moved");
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "{ids:?}");
}

#[tokio::test]
async fn test_related_open_inherits_selected_chain() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", false);
    assert_eq!(window.selected(), Some(b));
    let c = window.open_related("https://c.example", false);

    assert_eq!(window.manager.meta(b).unwrap().ancestors, vec![a]);
    assert_eq!(window.manager.meta(c).unwrap().ancestors, vec![b, a]);
}

#[tokio::test]
async fn test_unrelated_open_has_no_ancestors() {
    let mut window = TestWindow::new(config_without_suspension());
    window.open("https://a.example");
    let b = window.open("https://b.example");
    assert!(window.manager.meta(b).unwrap().ancestors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_makes_original_the_parent() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    window.commit_select(a).await;
    assert!(window.manager.meta(a).unwrap().read);

    let d = window.manager.duplicate_tab(&mut window.host, a).unwrap();
    let dup = window.manager.meta(d).unwrap();
    assert_eq!(dup.ancestors, vec![a]);
    assert_eq!(dup.open_info.url, "https://a.example");
    // Unselected duplicates look unread again
    assert!(!dup.read);
    assert_eq!(dup.select_time, None);
    assert_eq!(window.order(), vec![a, d]);
}

#[tokio::test]
async fn test_duplicate_of_child_keeps_lineage() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", false);
    let d = window.manager.duplicate_tab(&mut window.host, b).unwrap();
    assert_eq!(window.manager.meta(d).unwrap().ancestors, vec![b, a]);
}

#[tokio::test]
async fn test_open_without_url_is_rejected() {
    let mut window = TestWindow::new(config_without_suspension());
    let result = window.manager.open_tab(&mut window.host, OpenRequest::new(""));
    assert!(matches!(
        result,
        Err(LineageError::MissingOpenParameter("url"))
    ));
    assert!(window.order().is_empty(), "nothing reached the host");
}

#[tokio::test(start_paused = true)]
async fn test_referrer_inferred_from_history() {
    let history = StaticHistory::new().with_referrer("https://b.example", "https://search.example");
    let mut window = TestWindow::with_history(config_without_suspension(), Arc::new(history));
    let b = window.open("https://b.example");
    assert_eq!(window.manager.meta(b).unwrap().open_info.from_visit, None);

    window.advance(10).await;
    let info = &window.manager.meta(b).unwrap().open_info;
    assert_eq!(info.from_visit.as_deref(), Some("https://search.example"));
    assert_eq!(info.effective_referrer(), Some("https://search.example"));
}

#[tokio::test(start_paused = true)]
async fn test_explicit_referrer_skips_history() {
    let history = StaticHistory::new().with_referrer("https://b.example", "https://search.example");
    let mut window = TestWindow::with_history(config_without_suspension(), Arc::new(history));
    let b = window
        .manager
        .open_tab(
            &mut window.host,
            OpenRequest::new("https://b.example").with_referrer("https://given.example"),
        )
        .unwrap();
    window.advance(10).await;
    let info = &window.manager.meta(b).unwrap().open_info;
    assert_eq!(info.from_visit, None);
    assert_eq!(info.effective_referrer(), Some("https://given.example"));
}

#[tokio::test(start_paused = true)]
async fn test_referrer_lookup_for_closed_tab_is_dropped() {
    let history = StaticHistory::new().with_referrer("https://b.example", "https://search.example");
    let mut window = TestWindow::with_history(config_without_suspension(), Arc::new(history));
    window.open("https://a.example");
    let b = window.open("https://b.example");
    window.close(b);
    window.advance(10).await;
    assert!(window.manager.meta(b).is_none());
    assert_eq!(window.manager.pending_tasks(), 1, "only the selection poll of a remains");
}

#[tokio::test]
async fn test_promote_to_startup_tab_drops_lineage() {
    let mut window = TestWindow::new(config_without_suspension());
    window.open("https://a.example");
    let b = window.open_related("https://b.example", false);
    window
        .manager
        .promote_to_startup_tab(&mut window.host, b, "https://b.example/later")
        .unwrap();
    let meta = window.manager.meta(b).unwrap();
    assert!(meta.ancestors.is_empty());
    assert_eq!(meta.open_info, OpenInfo::new("https://b.example/later"));

    let missing = window
        .manager
        .promote_to_startup_tab(&mut window.host, 42, "https://x.example");
    assert!(matches!(missing, Err(LineageError::UnknownTab(42))));
}

// ============================================================================
// Placement
// ============================================================================

#[tokio::test]
async fn test_linked_tabs_open_after_existing_children() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", true);
    let c = window.open_related("https://c.example", true);
    assert_eq!(window.order(), vec![a, b, c]);

    let x = window.open_background("https://x.example");
    assert_eq!(window.order(), vec![a, b, c, x]);

    let d = window.open_related("https://d.example", true);
    assert_eq!(window.order(), vec![a, b, c, d, x]);
    assert_eq!(window.selected(), Some(a), "background opens keep selection");
}

#[tokio::test]
async fn test_open_positions_follow_config() {
    let mut config = config_without_suspension();
    config.placement.open.unlinked = OpenPosition::FirstEnd;
    config.placement.open.linked = OpenPosition::PrevAdjacent;
    let mut window = TestWindow::new(config);

    let a = window.open("https://a.example");
    let b = window.open("https://b.example");
    assert_eq!(window.order(), vec![b, a]);

    window.user_select(a);
    let c = window.open_related("https://c.example", true);
    assert_eq!(window.order(), vec![b, c, a]);
}

#[tokio::test]
async fn test_pinned_tabs_stay_ahead_of_first_end() {
    let mut config = config_without_suspension();
    config.placement.open.unlinked = OpenPosition::FirstEnd;
    let mut window = TestWindow::new(config);
    let p = window.open("https://pinned.example");
    window.host.set_pinned(p, true);
    let a = window.open("https://a.example");
    let b = window.open("https://b.example");
    assert_eq!(window.order(), vec![p, b, a]);
}

#[tokio::test]
async fn test_insert_index_is_idempotent() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", true);
    let c = window.open("https://c.example");
    assert_eq!(window.order(), vec![a, b, c]);

    let tabs = TabCollection::new(window.host.tabs());
    let lane = tabs.lane_for(c);
    let position = OpenPosition::NextAdjacent;
    let first = compute_insert_index(&lane, window.manager.store(), Some(a), c, position);
    let second = compute_insert_index(&lane, window.manager.store(), Some(a), c, position);
    assert_eq!(first, Some(1));
    assert_eq!(first, second);

    let index = resolve_move(&tabs, window.manager.store(), Some(a), c, position)
        .expect("c has to move next to a");
    window.host.move_tab_to(c, index);
    assert_eq!(window.order(), vec![a, c, b]);

    let tabs = TabCollection::new(window.host.tabs());
    assert_eq!(
        resolve_move(&tabs, window.manager.store(), Some(a), c, position),
        None,
        "applying the same position again is a no-op"
    );
}

// ============================================================================
// Close-time selection (pure)
// ============================================================================

fn store_with(chains: &[(u64, &[u64])]) -> TabStore {
    let mut store = TabStore::new();
    for (id, ancestors) in chains {
        let mut meta = TabMeta::new(*id, OpenInfo::new(format!("https://t{id}.example")));
        meta.ancestors = ancestors.to_vec();
        store.insert(meta);
    }
    store
}

fn plain_tabs(ids: &[u64]) -> TabCollection {
    TabCollection::new(ids.iter().map(|&id| HostTab::new(id)).collect())
}

#[test]
fn test_siblings_are_extended_descendants() {
    let store = store_with(&[(1, &[]), (2, &[1]), (3, &[1])]);
    let rule = FamilyRule::new(Direction::Next, Reach::Adjacent, true, Relation::Descendant);
    assert_eq!(get_family_tab(&[1, 2, 3], &store, 2, rule), Some(3));
}

#[test]
fn test_prev_adjacent_ancestor_walks_up_one_level() {
    let store = store_with(&[(1, &[]), (2, &[1]), (3, &[2, 1])]);
    let rule = FamilyRule::new(Direction::Prev, Reach::Adjacent, false, Relation::Ancestor);
    assert_eq!(get_family_tab(&[1, 2, 3], &store, 3, rule), Some(2));
    assert_eq!(get_family_tab(&[1, 2, 3], &store, 2, rule), Some(1));
}

#[test]
fn test_default_list_falls_through_to_prev_selected() {
    let mut store = store_with(&[(1, &[]), (2, &[]), (3, &[]), (4, &[])]);
    store.get_mut(1).unwrap().select_time = Some(5_000);
    store.get_mut(3).unwrap().select_time = Some(7_000);
    let tabs = plain_tabs(&[1, 2, 3, 4]);
    let archive = ClosedArchive::new();
    let ctx = SelectionContext {
        tabs: &tabs,
        store: &store,
        archive: &archive,
        times: SelectedTimes::default(),
    };
    let policy = SelectPolicy::default();
    assert_eq!(
        select_tab_at(&ctx, 2, policy.list_for(false), &policy),
        Some(SelectOutcome::Tab(3))
    );
}

#[test]
fn test_prev_selected_without_trace_back_needs_matching_time() {
    let mut store = store_with(&[(1, &[]), (2, &[])]);
    store.get_mut(1).unwrap().select_time = Some(5_000);
    let tabs = plain_tabs(&[1, 2]);
    let archive = ClosedArchive::new();
    let policy = SelectPolicy {
        trace_back: false,
        ..SelectPolicy::default()
    };
    let positions = [SelectPosition::AnywherePrevSelected];

    let stale = SelectionContext {
        tabs: &tabs,
        store: &store,
        archive: &archive,
        times: SelectedTimes {
            previous: Some(4_000),
            current: Some(6_000),
        },
    };
    assert_eq!(select_tab_at(&stale, 2, &positions, &policy), None);

    let matching = SelectionContext {
        times: SelectedTimes {
            previous: Some(5_000),
            current: Some(6_000),
        },
        ..stale
    };
    assert_eq!(
        select_tab_at(&matching, 2, &positions, &policy),
        Some(SelectOutcome::Tab(1))
    );
}

#[test]
fn test_oldest_unread_picks_earliest_open() {
    let mut store = store_with(&[(1, &[]), (2, &[]), (3, &[]), (4, &[])]);
    store.get_mut(1).unwrap().read = true;
    let tabs = plain_tabs(&[4, 3, 2, 1]);
    let archive = ClosedArchive::new();
    let ctx = SelectionContext {
        tabs: &tabs,
        store: &store,
        archive: &archive,
        times: SelectedTimes::default(),
    };
    let positions = [SelectPosition::AnywhereOldestUnread];
    assert_eq!(
        select_tab_at(&ctx, 4, &positions, &SelectPolicy::default()),
        Some(SelectOutcome::Tab(2))
    );
}

// ============================================================================
// Close-time selection (engine)
// ============================================================================

#[tokio::test]
async fn test_closing_child_selects_next_sibling() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", true);
    let c = window.open_related("https://c.example", true);
    window.user_select(b);

    assert_eq!(window.close(b), Some(c));
    assert_eq!(window.selected(), Some(c));
    assert_eq!(window.order(), vec![a, c]);
    assert!(window.manager.meta(b).is_none());
}

#[tokio::test]
async fn test_closing_last_child_returns_to_parent() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", false);
    let c = window.open_related("https://c.example", false);
    assert_eq!(window.order(), vec![a, b, c]);

    assert_eq!(window.close(c), Some(b));
    assert_eq!(window.close(b), Some(a));
}

#[tokio::test(start_paused = true)]
async fn test_closing_unrelated_tab_returns_to_previous_selection() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let _b = window.open("https://b.example");
    let c = window.open("https://c.example");
    let d = window.open("https://d.example");

    window.commit_select(a).await;
    window.commit_select(c).await;

    // The host alone would pick d (same index)
    assert_eq!(window.close(c), Some(a));
    assert_eq!(window.selected(), Some(a));
    assert!(window.order().contains(&d));
}

#[tokio::test]
async fn test_closing_unselected_tab_keeps_selection() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open("https://b.example");
    window.user_select(a);
    assert_eq!(window.close(b), None);
    assert_eq!(window.selected(), Some(a));
}

#[tokio::test]
async fn test_default_entry_leaves_host_choice() {
    let mut config = config_without_suspension();
    config.placement.select_on_close.unpinned = vec![SelectPosition::Default, SelectPosition::FirstEnd];
    let mut window = TestWindow::new(config);
    let _a = window.open("https://a.example");
    let b = window.open("https://b.example");
    let c = window.open("https://c.example");
    window.user_select(b);

    assert_eq!(window.close(b), None);
    assert_eq!(window.selected(), Some(c), "host default: same index");
    assert!(window.manager.is_polling_selection(c));
}

#[tokio::test]
async fn test_missing_opener_restored_from_archive() {
    let mut config: Config = config_without_suspension();
    config.placement.select_on_close.undo_close = true;
    let mut window = TestWindow::new(config);
    let a = window.open("https://a.example");
    let b = window.open_related("https://b.example", false);
    let _x = window.open_background("https://x.example");

    window.close(a);
    assert_eq!(window.selected(), Some(b));

    assert_eq!(window.close(b), Some(a));
    assert_eq!(window.selected(), Some(a));
    let restored = window.manager.meta(a).expect("opener metadata restored");
    assert!(restored.read, "undo-close forces the restored tab read");
    assert!(window.host.closed_archive().find_by_id(a).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_previous_selection_restored_from_archive() {
    let mut config = config_without_suspension();
    config.placement.select_on_close.trace_back = false;
    config.placement.select_on_close.undo_close = true;
    config.placement.select_on_close.unpinned = vec![SelectPosition::AnywherePrevSelected];
    let mut window = TestWindow::new(config);
    let a = window.open("https://a.example");
    let x = window.open("https://x.example");
    let y = window.open("https://y.example");
    window.commit_select(a).await;
    window.commit_select(x).await;
    window.commit_select(y).await;
    let x_time = window.manager.meta(x).unwrap().select_time;

    assert_eq!(window.close(x), None);
    assert_eq!(window.selected(), Some(y));
    assert_eq!(window.manager.selected_times().previous, x_time);

    assert_eq!(window.close(y), Some(x), "a was not the previous selection");
    assert_eq!(window.selected(), Some(x));
    assert_eq!(window.order().len(), 2);
    assert!(window.manager.meta(x).unwrap().read);
    assert!(window.host.closed_archive().find_by_id(x).is_none());
}

#[tokio::test]
async fn test_orphan_falls_back_to_referrer_url() {
    let mut config = config_without_suspension();
    config.placement.select_on_close.undo_close = true;
    config.placement.select_on_close.unpinned = vec![SelectPosition::AnywhereOpener];
    let mut window = TestWindow::new(config);
    let a = window
        .manager
        .open_tab(
            &mut window.host,
            OpenRequest::new("https://a.example").with_referrer("https://origin.example"),
        )
        .unwrap();

    let reopened = window.close(a).expect("referrer opened");
    assert_ne!(reopened, a);
    assert_eq!(
        window.manager.meta(reopened).unwrap().open_info.url,
        "https://origin.example"
    );
    assert_eq!(window.selected(), Some(reopened));
}

#[tokio::test(start_paused = true)]
async fn test_pinned_close_uses_pinned_list() {
    let mut window = TestWindow::new(config_without_suspension());
    let p = window.open("https://p.example");
    let q = window.open("https://q.example");
    window.host.set_pinned(p, true);
    window.host.set_pinned(q, true);
    let a = window.open("https://a.example");

    window.commit_select(a).await;
    window.commit_select(q).await;
    assert_eq!(window.close(q), Some(a));
    assert_eq!(window.order(), vec![p, a]);
}

#[tokio::test]
async fn test_events_dispatch_to_operations() {
    let mut window = TestWindow::new(config_without_suspension());
    let opened = window
        .manager
        .handle_event(&mut window.host, TabEvent::Open(OpenRequest::new("https://a.example")))
        .unwrap();
    let EventOutcome::Opened(a) = opened else {
        panic!("expected an open outcome, got {opened:?}");
    };
    let b = window.open("https://b.example");

    window.host.select_tab(a);
    assert_eq!(
        window
            .manager
            .handle_event(&mut window.host, TabEvent::Select(a))
            .unwrap(),
        EventOutcome::Selected(a)
    );
    assert_eq!(
        window
            .manager
            .handle_event(&mut window.host, TabEvent::Close(b))
            .unwrap(),
        EventOutcome::Closed { selected: None }
    );
    assert_eq!(window.order(), vec![a]);
}
