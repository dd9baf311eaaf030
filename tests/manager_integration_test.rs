//! Integration tests for CalibrationManager
//!
//! These tests exercise the manager from async code, including:
//! - Progress broadcast to subscribers
//! - The tokio timeout watchdog, including restarts
//! - Result retention for persistence

use std::time::Duration;

use touch_calibrator::calibration::Geometry;
use touch_calibrator::config::CalibrationConfig;
use touch_calibrator::error::CalibrationError;
use touch_calibrator::managers::CalibrationManager;
use touch_calibrator::session::{AbortReason, SessionState};

fn init_test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build test runtime")
}

fn geometry() -> Geometry {
    Geometry::new(800, 600).unwrap()
}

/// Watchdog aborts an idle session and publishes the final snapshot
#[test]
fn test_watchdog_times_out_idle_session() {
    let runtime = init_test_runtime();
    let manager = CalibrationManager::new();
    let mut rx = manager.init_progress_channel().subscribe();

    let config = CalibrationConfig {
        timeout_ms: 50,
        tick_ms: 10,
        ..CalibrationConfig::default()
    };
    manager.start(geometry(), &config).unwrap();

    runtime.block_on(async {
        let watchdog = manager.spawn_timeout_watchdog(config.tick());

        let finished = tokio::time::timeout(Duration::from_secs(5), watchdog).await;
        assert!(finished.is_ok(), "watchdog should stop after timing out");

        let mut last_state = None;
        while let Ok(progress) = rx.try_recv() {
            last_state = Some(progress.session_state);
        }
        assert_eq!(last_state, Some(SessionState::Aborted));
    });

    assert!(matches!(
        manager.outcome().unwrap(),
        Some(Err(AbortReason::TimedOut))
    ));
    assert_eq!(manager.last_result().unwrap(), None);
}

/// Watchdog exits on its own once the session completes
#[test]
fn test_watchdog_stops_after_completion() {
    let runtime = init_test_runtime();
    let manager = CalibrationManager::new();
    let config = CalibrationConfig {
        tick_ms: 10,
        ..CalibrationConfig::default()
    };
    manager.start(geometry(), &config).unwrap();

    runtime.block_on(async {
        let watchdog = manager.spawn_timeout_watchdog(config.tick());

        for (x, y) in [(100, 75), (699, 74), (99, 524), (700, 525)] {
            manager.submit_click(x, y).unwrap();
        }

        let finished = tokio::time::timeout(Duration::from_secs(5), watchdog).await;
        assert!(finished.is_ok(), "watchdog should stop after completion");
    });

    let stored = manager.last_result().unwrap().expect("result stored");
    assert!(!stored.swap_xy);
}

/// A watchdog left over from an earlier session never ticks its replacement
#[test]
fn test_restarted_session_gets_full_timeout() {
    let runtime = init_test_runtime();
    let manager = CalibrationManager::new();
    let config = CalibrationConfig {
        timeout_ms: 400,
        tick_ms: 20,
        ..CalibrationConfig::default()
    };

    runtime.block_on(async {
        manager.start(geometry(), &config).unwrap();
        let first = manager.spawn_timeout_watchdog(config.tick());
        manager.abort().unwrap();

        manager.start(geometry(), &config).unwrap();
        let second = manager.spawn_timeout_watchdog(config.tick());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(
            manager.progress().unwrap().session_state,
            SessionState::Running,
            "only one watchdog may count idle time"
        );

        let first_done = tokio::time::timeout(Duration::from_secs(5), first).await;
        assert!(first_done.is_ok(), "stale watchdog should stop");

        let second_done = tokio::time::timeout(Duration::from_secs(5), second).await;
        assert!(second_done.is_ok(), "watchdog should stop after timing out");
    });

    assert!(matches!(
        manager.outcome().unwrap(),
        Some(Err(AbortReason::TimedOut))
    ));
}

/// Subscribers see every click as a progress snapshot
#[tokio::test]
async fn test_progress_stream_follows_clicks() {
    let manager = CalibrationManager::new();
    manager.init_progress_channel();
    let mut rx = manager.subscribe().unwrap();

    manager.start(geometry(), &CalibrationConfig::default()).unwrap();
    for (x, y) in [(100, 75), (699, 74), (99, 524), (700, 525)] {
        manager.submit_click(x, y).unwrap();
    }

    let mut collected = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        collected.push(progress.clicks_collected);
    }
    assert_eq!(collected, vec![0, 1, 2, 3, 4]);
}

/// Events after the session ended are accepted but change nothing
#[tokio::test]
async fn test_events_after_abort_are_ignored() {
    let manager = CalibrationManager::new();
    manager.start(geometry(), &CalibrationConfig::default()).unwrap();
    manager.focus_lost().unwrap();

    manager.submit_click(100, 75).unwrap();
    manager.abort().unwrap();

    assert!(matches!(
        manager.outcome().unwrap(),
        Some(Err(AbortReason::FocusLost))
    ));
    assert_eq!(
        manager.progress().unwrap().session_state,
        SessionState::Aborted
    );
}

#[test]
fn test_operations_without_session() {
    let manager = CalibrationManager::new();
    assert!(matches!(
        manager.tick(Duration::from_millis(10)),
        Err(CalibrationError::NotRunning)
    ));
    assert!(matches!(
        manager.update_geometry(geometry()),
        Err(CalibrationError::NotRunning)
    ));
}
