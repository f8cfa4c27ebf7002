//! Selection commit polling and read-state bookkeeping

mod common;

use common::{START_TIME, TestWindow, config_without_suspension};
use tab_lineage::LineageError;
use tab_lineage::host::TabHost;
use tab_lineage::session::attributes::{ATTR_READ_TIME, ATTR_SELECT_TIME};

#[tokio::test(start_paused = true)]
async fn test_selection_commits_only_after_load_finishes() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    assert!(window.manager.is_polling_selection(a));

    window.advance(300).await;
    let meta = window.manager.meta(a).unwrap();
    assert_eq!(meta.select_time, None, "still loading");
    assert!(!meta.read);
    assert!(window.manager.is_polling_selection(a));

    window.host.set_busy(a, false);
    window.advance(260).await;
    let meta = window.manager.meta(a).unwrap();
    let committed = meta.select_time.expect("committed once loaded");
    assert!(committed > START_TIME);
    assert!(meta.read);
    assert_eq!(meta.read_time, Some(committed));
    assert!(!window.manager.is_polling_selection(a));
    assert_eq!(window.manager.selected_times().current, Some(committed));
    assert_eq!(window.manager.selected_times().previous, None);

    let attrs = &window.host.tab(a).unwrap().attributes;
    assert_eq!(attrs.get(ATTR_SELECT_TIME), Some(committed.to_string().as_str()));
    assert_eq!(attrs.get(ATTR_READ_TIME), Some(committed.to_string().as_str()));
}

#[tokio::test(start_paused = true)]
async fn test_switching_away_before_commit_leaves_tab_unread() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_background("https://b.example");
    window.host.finish_all_loads();

    window.user_select(b);
    assert!(window.manager.is_polling_selection(b));
    assert!(!window.manager.is_polling_selection(a));
    window.advance(100).await;

    window.user_select(a);
    assert!(!window.manager.is_polling_selection(b));
    window.advance(300).await;

    let b_meta = window.manager.meta(b).unwrap();
    assert_eq!(b_meta.select_time, None);
    assert!(!b_meta.read);
    assert!(window.manager.meta(a).unwrap().read);
}

#[tokio::test(start_paused = true)]
async fn test_committed_selections_roll_window_times() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    window.commit_select(a).await;
    let b = window.open("https://b.example");
    window.commit_select(b).await;

    let a_time = window.manager.meta(a).unwrap().select_time;
    let b_time = window.manager.meta(b).unwrap().select_time;
    assert!(a_time < b_time);
    let times = window.manager.selected_times();
    assert_eq!(times.previous, a_time);
    assert_eq!(times.current, b_time);
}

#[tokio::test(start_paused = true)]
async fn test_read_time_is_stamped_once() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    window.commit_select(a).await;
    let first_read = window.manager.meta(a).unwrap().read_time;
    let first_select = window.manager.meta(a).unwrap().select_time;

    let b = window.open("https://b.example");
    window.commit_select(b).await;
    window.commit_select(a).await;

    let meta = window.manager.meta(a).unwrap();
    assert_eq!(meta.read_time, first_read);
    assert!(meta.select_time > first_select);
}

#[tokio::test(start_paused = true)]
async fn test_reset_read_state_clears_times_and_attributes() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    window.commit_select(a).await;

    window.manager.reset_read_state(&mut window.host, a).unwrap();
    let meta = window.manager.meta(a).unwrap();
    assert_eq!((meta.select_time, meta.read_time, meta.read), (None, None, false));
    let attrs = &window.host.tab(a).unwrap().attributes;
    assert_eq!(attrs.get(ATTR_SELECT_TIME), None);
    assert_eq!(attrs.get(ATTR_READ_TIME), None);
}

#[tokio::test(start_paused = true)]
async fn test_force_read_marks_immediately_without_rolling_times() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    window.commit_select(a).await;
    let before = window.manager.selected_times();
    let b = window.open_background("https://b.example");

    window.manager.force_read(&mut window.host, b).unwrap();
    let meta = window.manager.meta(b).unwrap();
    assert!(meta.read);
    assert_eq!(meta.select_time, Some(window.now()));
    assert_eq!(meta.read_time, Some(window.now()));
    assert_eq!(window.manager.selected_times(), before);
}

#[tokio::test]
async fn test_read_state_of_unknown_tab_is_an_error() {
    let mut window = TestWindow::new(config_without_suspension());
    let err = window.manager.force_read(&mut window.host, 42).unwrap_err();
    assert!(matches!(err, LineageError::UnknownTab(42)));
    let err = window.manager.reset_read_state(&mut window.host, 42).unwrap_err();
    assert!(matches!(err, LineageError::UnknownTab(42)));
}

#[tokio::test]
async fn test_selecting_untracked_tab_starts_no_poll() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    window.manager.on_tab_select(&mut window.host, 42);
    assert!(!window.manager.is_polling_selection(42));
    assert!(window.manager.is_polling_selection(a));
}

#[tokio::test(start_paused = true)]
async fn test_poll_is_dropped_when_host_selection_moves_without_engine() {
    let mut window = TestWindow::new(config_without_suspension());
    let a = window.open("https://a.example");
    let b = window.open_background("https://b.example");
    window.host.finish_all_loads();

    // Host switches tabs but the engine never hears about it
    window.host.select_tab(b);
    window.advance(300).await;

    assert!(!window.manager.is_polling_selection(a));
    assert_eq!(window.manager.meta(a).unwrap().select_time, None);
}
