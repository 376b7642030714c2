use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use uploadq_core::{
    update, ChannelIcon, Effect, Msg, OnlineQueueResponse, Precedence, QueueState, QueueStatus,
    RawOfflineCommand, RawOnlineItem, RowTrailing, SourceFetchFailure,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(uploadq_logging::initialize_for_tests);
}

fn raw(id: &str, route: &str, segment: u32, progress: f64) -> RawOnlineItem {
    RawOnlineItem {
        id: id.to_string(),
        url: format!("https://upload.commadotai.com/dev/{route}/{segment}/qlog.bz2"),
        path: String::new(),
        progress,
        created_at: 1_700_000_000,
        retry_count: 0,
        current: progress > 0.0,
    }
}

fn online_ok(state: QueueState, seq: u64, items: Vec<RawOnlineItem>) -> QueueState {
    update(
        state,
        Msg::OnlineQueueFetched {
            seq,
            result: Ok(OnlineQueueResponse::with_items(items)),
        },
    )
    .0
}

fn online_err(state: QueueState, seq: u64) -> QueueState {
    update(
        state,
        Msg::OnlineQueueFetched {
            seq,
            result: Err(SourceFetchFailure::new("device not connected")),
        },
    )
    .0
}

fn offline_files(routes: &[&str]) -> Vec<RawOfflineCommand> {
    let files: Vec<_> = routes
        .iter()
        .map(|route| {
            json!({
                "fn": format!("{route}--0/rlog.bz2"),
                "url": format!("https://upload.commadotai.com/dev/{route}/0/rlog.bz2"),
            })
        })
        .collect();
    vec![RawOfflineCommand {
        method: "uploadFilesToUrls".to_string(),
        params: json!({ "files_data": files }),
    }]
}

fn offline_ok(state: QueueState, seq: u64, routes: &[&str]) -> QueueState {
    update(
        state,
        Msg::OfflineQueueFetched {
            seq,
            result: Ok(offline_files(routes)),
        },
    )
    .0
}

fn routes(state: &QueueState) -> Vec<String> {
    state.store().items().map(|item| item.route.clone()).collect()
}

#[test]
fn status_starts_connecting() {
    init_logging();
    let state = QueueState::new();
    let view = state.view();
    assert_eq!(view.status, QueueStatus::Connecting);
    assert_eq!(
        view.status.message(),
        Some("Waiting for device to connect...")
    );
    assert_eq!(view.queued, 0);
    assert!(state.offline_poll_enabled());
}

#[test]
fn online_failure_with_nothing_pending_is_device_offline() {
    init_logging();
    let mut state = online_err(QueueState::new(), 1);
    assert_eq!(state.view().status, QueueStatus::DeviceOffline);
    assert_eq!(state.view().status.message(), Some("Device offline"));
    assert!(state.consume_dirty());
    assert!(state.offline_poll_enabled());
}

#[test]
fn online_success_with_empty_queue_is_empty() {
    init_logging();
    let state = online_ok(QueueState::new(), 1, Vec::new());
    assert_eq!(state.view().status, QueueStatus::Empty);
    assert_eq!(state.view().status.message(), Some("Nothing to upload"));
    assert!(!state.offline_poll_enabled());
}

#[test]
fn offline_answer_alone_ends_connecting() {
    init_logging();
    let state = offline_ok(QueueState::new(), 1, &[]);
    assert_eq!(state.view().status, QueueStatus::Empty);

    let state = offline_ok(QueueState::new(), 1, &["pending"]);
    assert_eq!(state.view().status, QueueStatus::Populated);
    assert_eq!(state.view().source, Precedence::Offline);
}

#[test]
fn online_success_overrides_offline_data() {
    init_logging();
    let state = offline_ok(QueueState::new(), 1, &["offline-a", "offline-b"]);
    assert_eq!(routes(&state), vec!["offline-a", "offline-b"]);

    let state = online_ok(state, 1, vec![raw("u1", "live", 1, 0.0)]);
    assert_eq!(state.precedence(), Precedence::Online);
    assert_eq!(routes(&state), vec!["live"]);

    // Late offline data is suppressed while the device answers.
    let state = offline_ok(state, 2, &["offline-c"]);
    assert_eq!(routes(&state), vec!["live"]);
    assert_eq!(state.view().queued, 1);
}

#[test]
fn online_failure_falls_back_to_offline_list() {
    init_logging();
    let state = offline_ok(QueueState::new(), 1, &["offline-a"]);
    let state = online_ok(state, 1, vec![raw("u1", "live", 1, 0.3)]);
    assert_eq!(routes(&state), vec!["live"]);

    let state = online_err(state, 2);
    assert!(state.online().ever_succeeded());
    assert!(state.online().latest_failed());
    assert_eq!(state.precedence(), Precedence::Offline);
    assert_eq!(routes(&state), vec!["offline-a"]);
    assert_eq!(state.view().status, QueueStatus::Populated);
    assert!(state.offline_poll_enabled());
}

#[test]
fn offline_failure_clears_offline_list() {
    init_logging();
    let state = online_err(QueueState::new(), 1);
    let state = offline_ok(state, 1, &["offline-a"]);
    assert_eq!(state.view().status, QueueStatus::Populated);

    let (state, _) = update(
        state,
        Msg::OfflineQueueFetched {
            seq: 2,
            result: Err(SourceFetchFailure::new("timeout")),
        },
    );
    assert_eq!(state.view().status, QueueStatus::DeviceOffline);
    assert!(state.offline().last_failure().is_some());
}

#[test]
fn stale_poll_results_are_ignored() {
    init_logging();
    let state = online_ok(QueueState::new(), 5, vec![raw("new", "r", 1, 0.0)]);
    let mut state = online_ok(state, 4, vec![raw("old", "r", 2, 0.0)]);
    assert_eq!(state.view().rows[0].id, "new");
    assert_eq!(state.online().completed_attempts(), 1);
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::OnlineQueueFetched {
            seq: 5,
            result: Err(SourceFetchFailure::new("late")),
        },
    );
    assert!(state.online().latest_succeeded());
    assert!(!state.consume_dirty());
}

#[test]
fn cancel_all_sends_acknowledged_ids_once() {
    init_logging();
    let state = online_ok(
        QueueState::new(),
        1,
        vec![raw("a", "r", 1, 0.0), raw("b", "r", 2, 0.4)],
    );
    let (state, effects) = update(state, Msg::CancelAllClicked);
    assert_eq!(
        effects,
        vec![Effect::CancelUploads {
            ids: vec!["b".to_string(), "a".to_string()],
        }]
    );
    // Cancelling does not touch local state; the next poll decides.
    assert_eq!(state.view().queued, 2);
}

#[test]
fn cancel_all_skips_unacknowledged_uploads() {
    init_logging();
    let state = online_ok(
        QueueState::new(),
        1,
        vec![raw("a", "r", 1, 0.0), raw("", "r", 2, 0.0), raw("b", "r", 3, 0.4)],
    );
    let (_state, effects) = update(state, Msg::CancelAllClicked);
    let Effect::CancelUploads { mut ids } = effects.into_iter().next().expect("one effect");
    ids.sort();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn cancel_all_on_empty_or_offline_only_set_is_noop() {
    init_logging();
    let (state, effects) = update(QueueState::new(), Msg::CancelAllClicked);
    assert!(effects.is_empty());

    let state = offline_ok(state, 1, &["offline-a"]);
    let (_state, effects) = update(state, Msg::CancelAllClicked);
    assert!(effects.is_empty());
}

#[test]
fn cancel_one_only_for_unstarted_acknowledged_uploads() {
    init_logging();
    let state = online_ok(
        QueueState::new(),
        1,
        vec![raw("idle", "r", 1, 0.0), raw("busy", "r", 2, 0.6), raw("", "r", 3, 0.0)],
    );

    let (state, effects) = update(
        state,
        Msg::CancelOneClicked {
            id: "idle".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::CancelUploads {
            ids: vec!["idle".to_string()],
        }]
    );

    for id in ["busy", "", "unknown"] {
        let (_, effects) = update(state.clone(), Msg::CancelOneClicked { id: id.to_string() });
        assert!(effects.is_empty(), "{id:?}");
    }
}

#[test]
fn started_upload_renders_percentage_without_cancel() {
    init_logging();
    let response: OnlineQueueResponse = serde_json::from_value(json!({
        "result": [{
            "id": "u1",
            "progress": 0.5,
            "url": "https://upload.commadotai.com/abc/3/qlog.bz2",
            "created_at": 100,
            "retry_count": 0,
            "current": true
        }]
    }))
    .unwrap();
    let (state, _) = update(
        QueueState::new(),
        Msg::OnlineQueueFetched {
            seq: 1,
            result: Ok(response),
        },
    );

    let view = state.view();
    assert_eq!(view.status, QueueStatus::Populated);
    assert_eq!(view.queued, 1);
    let item = state.store().items().next().unwrap();
    assert_eq!(item.route, "abc");
    assert_eq!(item.segment, 3);
    assert_eq!(item.filename, "qlog.bz2");
    assert!(item.is_priority_channel);

    let row = &view.rows[0];
    assert_eq!(row.label, "abc 3 qlog.bz2");
    assert_eq!(row.icon, ChannelIcon::Priority);
    assert_eq!(row.trailing, RowTrailing::Percent(50));
    assert!(!row.offers_cancel());
    assert!(row.current);
    assert_eq!(row.created_at, 100);
}

#[test]
fn row_trailing_reflects_acknowledgement_and_progress() {
    init_logging();
    let state = online_ok(
        QueueState::new(),
        1,
        vec![raw("done", "r", 1, 1.0), raw("idle", "r", 2, 0.0)],
    );
    let view = state.view();
    assert_eq!(view.rows[0].trailing, RowTrailing::Percent(100));
    assert!(view.rows[0].complete);
    assert_eq!(view.rows[1].trailing, RowTrailing::CancelButton);
    assert!(view.row_for_upload("idle").unwrap().offers_cancel());

    let state = offline_ok(online_err(state, 2), 1, &["pending"]);
    let view = state.view();
    assert_eq!(view.rows[0].trailing, RowTrailing::Offline);
    assert_eq!(view.rows[0].id, "");
}

#[test]
fn unchanged_polls_do_not_dirty_the_view() {
    init_logging();
    let mut state = online_ok(QueueState::new(), 1, vec![raw("a", "r", 1, 0.2)]);
    assert!(state.consume_dirty());
    let row_id = state.view().rows[0].row_id;

    let mut state = online_ok(state, 2, vec![raw("a", "r", 1, 0.2)]);
    assert!(!state.consume_dirty());

    let mut state = online_ok(state, 3, vec![raw("a", "r", 1, 0.5)]);
    assert!(state.consume_dirty());
    assert_eq!(state.view().rows[0].row_id, row_id);
    assert_eq!(state.view().rows[0].trailing, RowTrailing::Percent(50));

    // Regressions are tolerated.
    let state = online_ok(state, 4, vec![raw("a", "r", 1, 0.1)]);
    assert_eq!(state.view().rows[0].trailing, RowTrailing::Percent(10));
}

#[test]
fn malformed_items_are_counted_for_the_shown_source() {
    init_logging();
    let mut bad = raw("bad", "r", 1, 0.0);
    bad.url = "https://upload.commadotai.com/short".to_string();
    let state = online_ok(QueueState::new(), 1, vec![raw("a", "r", 1, 0.0), bad]);
    let view = state.view();
    assert_eq!(view.queued, 1);
    assert_eq!(view.malformed_items, 1);
}
