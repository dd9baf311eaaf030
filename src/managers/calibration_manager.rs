// CalibrationManager: thread-safe owner of the active calibration session
//
// Single Responsibility: session lifecycle, progress broadcast and the last
// successful calibration, for callers that deliver input events from more
// than one thread or from an async event loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::calibration::{AxisCalibration, ClickPoint, Geometry};
use crate::config::CalibrationConfig;
use crate::error::{log_calibration_error, CalibrationError};
use crate::session::{CalibrationProgress, CalibrationSession, ClickOutcome, SessionOutcome};

type SharedProgressTx = Arc<Mutex<Option<broadcast::Sender<CalibrationProgress>>>>;

/// Manages one calibration session at a time
///
/// This manager handles:
/// - Starting a session and rejecting a second concurrent one
/// - Forwarding clicks, geometry changes, ticks and cancellation
/// - Broadcasting a progress snapshot after every event
/// - Keeping the last successful calibration for persistence
///
/// # Example
/// ```ignore
/// let manager = CalibrationManager::new();
/// let mut progress = manager.init_progress_channel().subscribe();
/// manager.start(geometry, &config)?;
/// manager.submit_click(100, 75)?;
/// ```
pub struct CalibrationManager {
    session: Arc<Mutex<Option<CalibrationSession>>>,
    /// Bumped by every `start`, only while the session lock is held
    generation: Arc<AtomicU64>,
    result: Arc<RwLock<Option<AxisCalibration>>>,
    progress_tx: SharedProgressTx,
}

impl CalibrationManager {
    /// Create a new CalibrationManager with no session and no stored result
    pub fn new() -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            result: Arc::new(RwLock::new(None)),
            progress_tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Initialize the progress broadcast channel
    ///
    /// Buffer size: 50 messages, ample for four targets plus restarts.
    pub fn init_progress_channel(&self) -> broadcast::Sender<CalibrationProgress> {
        let (tx, _) = broadcast::channel(50);
        if let Ok(mut guard) = self.progress_tx.lock() {
            *guard = Some(tx.clone());
        }
        tx
    }

    /// Subscribe to progress snapshots
    ///
    /// # Errors
    /// `ChannelNotInitialized` if `init_progress_channel` was not called.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<CalibrationProgress>, CalibrationError> {
        let guard = self
            .progress_tx
            .lock()
            .map_err(|_| CalibrationError::StatePoisoned)?;
        guard
            .as_ref()
            .map(|tx| tx.subscribe())
            .ok_or(CalibrationError::ChannelNotInitialized)
    }

    /// Start a calibration session
    ///
    /// A previous session that already finished or aborted is replaced.
    ///
    /// # Errors
    /// - `AlreadyInProgress` while another session is running
    /// - Lock poisoning on the session state
    pub fn start(&self, geometry: Geometry, config: &CalibrationConfig) -> Result<(), CalibrationError> {
        let mut guard = self.lock_session()?;

        if guard.as_ref().is_some_and(|s| !s.state().is_terminal()) {
            let err = CalibrationError::AlreadyInProgress;
            log_calibration_error(&err, "start_calibration");
            return Err(err);
        }

        let result = Arc::clone(&self.result);
        let mut session = CalibrationSession::new().with_timeout(config.timeout());
        session.start(geometry, config.thresholds(), move |outcome| {
            if let Ok(axis) = outcome {
                if let Ok(mut slot) = result.write() {
                    *slot = Some(axis);
                }
            }
        })?;

        let progress = session.progress();
        *guard = Some(session);
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(guard);

        publish(&self.progress_tx, progress);
        Ok(())
    }

    /// Forward a click to the running session
    pub fn submit_click(&self, x: i32, y: i32) -> Result<ClickOutcome, CalibrationError> {
        self.with_session("submit_click", |session| session.submit_click(x, y))
    }

    /// Forward a click tagged with its source device
    pub fn submit_device_click(
        &self,
        device: u32,
        x: i32,
        y: i32,
    ) -> Result<ClickOutcome, CalibrationError> {
        self.with_session("submit_device_click", |session| {
            session.submit_device_click(device, x, y)
        })
    }

    /// Apply a display geometry change; returns the target to re-show
    pub fn update_geometry(
        &self,
        geometry: Geometry,
    ) -> Result<Option<ClickPoint>, CalibrationError> {
        self.with_session("update_geometry", |session| session.update_geometry(geometry))
    }

    /// Advance the session timeout clock; `true` if the session timed out
    pub fn tick(&self, elapsed: Duration) -> Result<bool, CalibrationError> {
        self.with_session("tick", |session| session.tick(elapsed))
    }

    /// Cancel the running session
    pub fn abort(&self) -> Result<(), CalibrationError> {
        self.with_session("abort", |session| session.abort())
    }

    /// Report that the calibration window lost focus
    pub fn focus_lost(&self) -> Result<(), CalibrationError> {
        self.with_session("focus_lost", |session| session.focus_lost())
    }

    /// Current progress snapshot
    pub fn progress(&self) -> Result<CalibrationProgress, CalibrationError> {
        self.with_session("progress", |session| session.progress())
    }

    /// Outcome of the current session, once it ended
    pub fn outcome(&self) -> Result<Option<SessionOutcome>, CalibrationError> {
        self.with_session("outcome", |session| session.outcome().copied())
    }

    /// Last successful calibration, for the persistence collaborator
    pub fn last_result(&self) -> Result<Option<AxisCalibration>, CalibrationError> {
        let guard = self.result.read().map_err(|_| {
            let err = CalibrationError::StatePoisoned;
            log_calibration_error(&err, "last_result");
            err
        })?;
        Ok(*guard)
    }

    /// Restore a calibration loaded from persistent storage
    pub fn load_result(&self, axis: AxisCalibration) -> Result<(), CalibrationError> {
        let mut guard = self.result.write().map_err(|_| {
            let err = CalibrationError::StatePoisoned;
            log_calibration_error(&err, "load_result");
            err
        })?;
        *guard = Some(axis);
        Ok(())
    }

    /// Drive the session timeout from a tokio interval
    ///
    /// Ticks every `tick` until the session finishes, aborts or is removed.
    /// The watchdog is bound to the session current at spawn time and stops
    /// as soon as a later `start` replaces it.
    /// Must be called from within a tokio runtime.
    pub fn spawn_timeout_watchdog(&self, tick: Duration) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let generation = Arc::clone(&self.generation);
        let progress_tx = Arc::clone(&self.progress_tx);
        let watched = self.generation.load(Ordering::SeqCst);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let progress = {
                    let Ok(mut guard) = session.lock() else {
                        tracing::warn!("[CalibrationManager] Session lock poisoned, stopping watchdog");
                        break;
                    };
                    if generation.load(Ordering::SeqCst) != watched {
                        tracing::debug!("[CalibrationManager] Session replaced, stopping watchdog");
                        break;
                    }
                    let Some(active) = guard.as_mut() else {
                        break;
                    };
                    if active.state().is_terminal() {
                        break;
                    }
                    if !active.tick(tick) {
                        continue;
                    }
                    active.progress()
                };

                publish(&progress_tx, progress);
                break;
            }

            tracing::debug!("[CalibrationManager] Timeout watchdog stopped");
        })
    }

    // ========================================================================
    // HELPER METHODS - Lock management
    // ========================================================================

    /// Safely acquire lock on the session slot
    fn lock_session(&self) -> Result<MutexGuard<'_, Option<CalibrationSession>>, CalibrationError> {
        self.session
            .lock()
            .map_err(|_| CalibrationError::StatePoisoned)
    }

    /// Run `op` on the current session and broadcast the resulting progress
    fn with_session<T>(
        &self,
        context: &str,
        op: impl FnOnce(&mut CalibrationSession) -> T,
    ) -> Result<T, CalibrationError> {
        let mut guard = self.lock_session().inspect_err(|err| {
            log_calibration_error(err, context);
        })?;

        let Some(session) = guard.as_mut() else {
            let err = CalibrationError::NotRunning;
            log_calibration_error(&err, context);
            return Err(err);
        };

        let value = op(session);
        let progress = session.progress();
        drop(guard);

        publish(&self.progress_tx, progress);
        Ok(value)
    }
}

impl Default for CalibrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Send a progress snapshot if the channel exists; lagging or absent
/// subscribers are not an error
fn publish(progress_tx: &SharedProgressTx, progress: CalibrationProgress) {
    if let Ok(guard) = progress_tx.lock() {
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(progress);
        }
    }
}
