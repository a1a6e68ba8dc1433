//! End-to-end tests of the stream client against a scripted transport.
//!
//! All tests run under paused tokio time, so the fixed reconnect delay
//! elapses instantly and deterministically.

use std::sync::Arc;
use std::time::Duration;

use latchview_core::mock::{MockConnect, MockDiagnostics, MockFrame, MockTransport};
use latchview_core::{
    ClientState, DashboardUpdate, StreamClient, StreamOptions, UpdateReceiver,
};
use latchview_types::{ConnectionStatus, EventKind, LockState, SchedulerDiagnostics};

fn event_json(n: u32, old: &str, new: &str) -> String {
    format!(
        r#"{{"timestamp": "2026-01-05T10:00:{n:02}+00:00",
            "event_type": "lock_state",
            "old_value": "{old}",
            "new_value": "{new}",
            "source": "ble"}}"#
    )
}

fn initial_state_frame() -> String {
    format!(
        r#"{{"type": "initial_state",
            "state": {{"lock_state": "locked", "door_state": "closed", "battery_level": 90}},
            "events": [{}, {}, {}]}}"#,
        event_json(1, "unknown", "locked"),
        event_json(2, "locked", "unlocked"),
        event_json(3, "unlocked", "locked"),
    )
}

fn unlock_frame() -> String {
    format!(
        r#"{{"type": "state_update",
            "state": {{"lock_state": "unlocked"}},
            "event": {}}}"#,
        event_json(10, "locked", "unlocked"),
    )
}

fn client_with(
    transport: Arc<MockTransport>,
    diagnostics: Arc<MockDiagnostics>,
) -> StreamClient {
    StreamClient::new(transport, diagnostics, StreamOptions::default()).unwrap()
}

/// Receive updates until `matcher` accepts one.
///
/// Only call this for an update the script is guaranteed to produce.
async fn recv_until(
    rx: &mut UpdateReceiver,
    matcher: impl Fn(&DashboardUpdate) -> bool,
) -> DashboardUpdate {
    loop {
        let update = rx.recv().await.unwrap();
        if matcher(&update) {
            return update;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_initial_state_then_update() {
    let transport = Arc::new(MockTransport::with_script(vec![MockConnect::Open(vec![
        MockFrame::Message(initial_state_frame()),
        MockFrame::Message(unlock_frame()),
    ])]));
    let diagnostics = Arc::new(MockDiagnostics::new());
    diagnostics.set_response(SchedulerDiagnostics {
        mode: "active".to_string(),
        next_interval_sec: Some(5.0),
    });

    let client = client_with(transport, Arc::clone(&diagnostics));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    let snapshot = recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;
    match snapshot {
        DashboardUpdate::Snapshot { view, timeline } => {
            assert_eq!(view.state.lock_state, LockState::Locked);
            assert_eq!(view.state.battery_level, Some(90));
            assert_eq!(view.connection, ConnectionStatus::Connected);
            // Wire order was oldest-first; the timeline is newest-first.
            assert_eq!(timeline.len(), 3);
            assert_eq!(timeline[0].new_value, "locked");
            assert_eq!(timeline[2].new_value, "locked");
        }
        other => panic!("unexpected update: {other:?}"),
    }

    let update = recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Timeline { .. })).await;
    match update {
        DashboardUpdate::Timeline { view, event, timeline } => {
            assert_eq!(view.state.lock_state, LockState::Unlocked);
            // The merge only touched lock_state.
            assert_eq!(view.state.battery_level, Some(90));
            assert_eq!(event.event_type, EventKind::LockState);
            assert_eq!(event.new_value, "unlocked");
            assert_eq!(timeline.len(), 4);
            assert_eq!(timeline[0].new_value, "unlocked");
        }
        other => panic!("unexpected update: {other:?}"),
    }

    // Both handled messages triggered a diagnostics refresh.
    let update = recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Diagnostics { .. })).await;
    assert_eq!(update.view().diagnostics.as_ref().unwrap().mode, "active");
    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Diagnostics { .. })).await;
    assert_eq!(diagnostics.pull_count(), 2);

    client.stop().await;
    assert_eq!(client.state().await, ClientState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_update_without_event_leaves_timeline() {
    let transport = Arc::new(MockTransport::with_script(vec![MockConnect::Open(vec![
        MockFrame::Message(initial_state_frame()),
        MockFrame::Message(r#"{"type": "state_update", "state": {"battery_level": 15}}"#.into()),
    ])]));
    let client = client_with(transport, Arc::new(MockDiagnostics::new()));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;
    let update = recv_until(&mut rx, |u| {
        matches!(u, DashboardUpdate::State { view } if view.state.battery_level == Some(15))
    })
    .await;

    // Battery changed, everything else survived, no new event.
    assert_eq!(update.view().state.lock_state, LockState::Locked);
    assert_eq!(client.timeline_snapshot().await.len(), 3);

    client.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_bad_and_unknown_messages_are_dropped() {
    let transport = Arc::new(MockTransport::with_script(vec![MockConnect::Open(vec![
        MockFrame::Message("{not json at all".into()),
        MockFrame::Message(r#"{"type": "firmware_progress", "percent": 40}"#.into()),
        MockFrame::Message(initial_state_frame()),
    ])]));
    let diagnostics = Arc::new(MockDiagnostics::new());
    diagnostics.set_response(SchedulerDiagnostics {
        mode: "active".to_string(),
        next_interval_sec: None,
    });
    let client = client_with(transport, Arc::clone(&diagnostics));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    let update = recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;
    assert_eq!(update.view().state.lock_state, LockState::Locked);

    // Only the handled initial_state pulled diagnostics; the dropped
    // frames triggered nothing.
    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Diagnostics { .. })).await;
    assert_eq!(diagnostics.pull_count(), 1);

    client.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_connect_failure_retries_after_fixed_delay() {
    let transport = Arc::new(MockTransport::with_script(vec![
        MockConnect::Fail("connection refused".into()),
        MockConnect::Open(vec![MockFrame::Message(initial_state_frame())]),
    ]));
    let client = client_with(Arc::clone(&transport), Arc::new(MockDiagnostics::new()));
    let mut rx = client.subscribe();

    let started = tokio::time::Instant::now();
    client.start().await.unwrap();

    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;

    // Exactly one back-off period elapsed before the second attempt.
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(transport.connect_count(), 2);
    assert_eq!(client.state().await, ClientState::Open);

    client.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_clean_server_close_reconnects() {
    let transport = Arc::new(MockTransport::with_script(vec![
        MockConnect::Open(vec![MockFrame::Message(initial_state_frame()), MockFrame::Close]),
        MockConnect::Open(vec![MockFrame::Message(initial_state_frame())]),
    ]));
    let client = client_with(Arc::clone(&transport), Arc::new(MockDiagnostics::new()));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;
    // The drop shows as reconnecting before the new epoch connects.
    recv_until(&mut rx, |u| {
        matches!(u, DashboardUpdate::State { view }
            if view.connection == ConnectionStatus::Reconnecting)
    })
    .await;
    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;

    assert_eq!(transport.connect_count(), 2);
    assert_eq!(client.view().await.connection, ConnectionStatus::Connected);

    client.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_mid_stream_error_reconnects_and_resyncs() {
    let transport = Arc::new(MockTransport::with_script(vec![
        MockConnect::Open(vec![
            MockFrame::Message(initial_state_frame()),
            MockFrame::Error("connection reset".into()),
        ]),
        MockConnect::Open(vec![MockFrame::Message(unlock_frame())]),
    ]));
    let client = client_with(Arc::clone(&transport), Arc::new(MockDiagnostics::new()));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;
    let update = recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Timeline { .. })).await;

    // State from before the drop survives; the new event landed on top.
    assert_eq!(update.view().state.battery_level, Some(90));
    assert_eq!(update.view().state.lock_state, LockState::Unlocked);
    assert_eq!(transport.connect_count(), 2);

    client.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_backoff_cancels_retry() {
    let transport = Arc::new(MockTransport::with_script(vec![MockConnect::Fail(
        "connection refused".into(),
    )]));
    let client = client_with(Arc::clone(&transport), Arc::new(MockDiagnostics::new()));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    recv_until(&mut rx, |u| {
        matches!(u, DashboardUpdate::State { view }
            if view.connection == ConnectionStatus::Reconnecting)
    })
    .await;

    client.stop().await;

    assert_eq!(client.state().await, ClientState::Closed);
    // The back-off never completed; no second attempt was made.
    assert_eq!(transport.connect_count(), 1);
    assert_eq!(client.view().await.connection, ConnectionStatus::Disconnected);
    assert!(!client.view().await.state.connected);
}

#[tokio::test(start_paused = true)]
async fn test_reinitialize_replaces_timeline_after_reconnect() {
    let transport = Arc::new(MockTransport::with_script(vec![
        MockConnect::Open(vec![
            MockFrame::Message(initial_state_frame()),
            MockFrame::Message(unlock_frame()),
            MockFrame::Close,
        ]),
        MockConnect::Open(vec![MockFrame::Message(format!(
            r#"{{"type": "initial_state", "state": {{"lock_state": "locked"}}, "events": [{}]}}"#,
            event_json(20, "unlocked", "locked"),
        ))]),
    ]));
    let client = client_with(transport, Arc::new(MockDiagnostics::new()));
    let mut rx = client.subscribe();
    client.start().await.unwrap();

    recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Timeline { .. })).await;
    assert_eq!(client.timeline_snapshot().await.len(), 4);

    // The next epoch's history wholesale-replaces the old timeline.
    let update = recv_until(&mut rx, |u| matches!(u, DashboardUpdate::Snapshot { .. })).await;
    match update {
        DashboardUpdate::Snapshot { timeline, .. } => {
            assert_eq!(timeline.len(), 1);
            assert_eq!(timeline[0].new_value, "locked");
        }
        other => panic!("unexpected update: {other:?}"),
    }

    client.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_timeline_uninitialized_until_first_history() {
    let transport = Arc::new(MockTransport::with_script(vec![MockConnect::Fail(
        "connection refused".into(),
    )]));
    let client = client_with(transport, Arc::new(MockDiagnostics::new()));
    assert!(!client.timeline_initialized().await);

    let mut rx = client.subscribe();
    client.start().await.unwrap();
    recv_until(&mut rx, |u| {
        matches!(u, DashboardUpdate::State { view }
            if view.connection == ConnectionStatus::Reconnecting)
    })
    .await;

    // Still waiting for history; "no events yet" is not the same thing.
    assert!(!client.timeline_initialized().await);
    client.stop().await;
}
