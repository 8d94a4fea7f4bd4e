// CalibrationStore - locked owner of the persisted calibration state
//
// The store is the only component that touches durable storage. All mutation
// happens under a single write lock that also covers the synchronous save,
// so a reader never observes a profile with a new scale but an old shift,
// and never observes in-memory state that is ahead of what the process has
// attempted to persist.
//
// A failed save is retried once. If it still fails the in-memory state stays
// authoritative for the session and the failure is surfaced to the caller;
// a later reboot may then revert to the last persisted profile. That
// degraded-durability window is an accepted, reported failure mode.

use std::sync::RwLock;

use log::{info, warn};

use crate::channel::Channel;
use crate::error::CalibrationError;
use crate::storage::CalibrationRepository;

use super::profile::{CalibrationProfile, GlobalCalibrationState};

/// Owns the persisted calibration profile for every channel plus the global
/// enable flag.
pub struct CalibrationStore {
    state: RwLock<GlobalCalibrationState>,
    repository: Box<dyn CalibrationRepository>,
}

impl CalibrationStore {
    /// Create a store with default (uncalibrated) state; call [`load`] to
    /// restore persisted profiles.
    ///
    /// [`load`]: CalibrationStore::load
    pub fn new(repository: Box<dyn CalibrationRepository>) -> Self {
        Self {
            state: RwLock::new(GlobalCalibrationState::new_default()),
            repository,
        }
    }

    /// Restore persisted state at boot.
    ///
    /// Missing or corrupt storage degrades to the default uncalibrated state
    /// instead of failing the boot sequence.
    pub fn load(&self) {
        match self.repository.load() {
            Ok(Some(mut state)) => {
                state.normalize();
                let calibrated = state.profiles.values().filter(|p| p.calibrated).count();
                info!(
                    "[CalibrationStore] Restored state: enabled={} calibrated_channels={}",
                    state.enabled, calibrated
                );
                *self.write_state() = state;
            }
            Ok(None) => {
                info!("[CalibrationStore] No persisted state, starting uncalibrated");
            }
            Err(err) => {
                warn!(
                    "[CalibrationStore] Persisted state unreadable, starting uncalibrated: {:#}",
                    err
                );
            }
        }
    }

    /// Profile for one channel.
    pub fn get(&self, channel: Channel) -> CalibrationProfile {
        self.read_state().profile(channel)
    }

    /// Install a new profile for a channel and persist synchronously.
    ///
    /// Used by the calibrator after a successful two-point run. The memory
    /// update and the save happen under one write lock.
    pub fn set(&self, channel: Channel, profile: CalibrationProfile) -> Result<(), CalibrationError> {
        let mut state = self.write_state();
        state.profiles.insert(channel, profile);
        self.persist(&state)
    }

    /// Whether calibration correction is globally active.
    pub fn is_enabled(&self) -> bool {
        self.read_state().enabled
    }

    /// Flip the global switch. Orthogonal to per-channel calibration: stored
    /// profiles are kept either way.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), CalibrationError> {
        let mut state = self.write_state();
        state.enabled = enabled;
        self.persist(&state)
    }

    /// Return a channel to the uncalibrated identity profile.
    pub fn reset(&self, channel: Channel) -> Result<(), CalibrationError> {
        let mut state = self.write_state();
        state.profiles.insert(channel, CalibrationProfile::identity());
        self.persist(&state)
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> GlobalCalibrationState {
        self.read_state().clone()
    }

    /// Replace the entire state atomically (import commit path).
    ///
    /// The caller validates the incoming state; this only swaps and persists.
    pub fn replace(&self, mut new_state: GlobalCalibrationState) -> Result<(), CalibrationError> {
        new_state.normalize();
        let mut state = self.write_state();
        *state = new_state;
        self.persist(&state)
    }

    /// Synchronous save with one immediate retry.
    ///
    /// Called with the write lock held so readers cannot observe state the
    /// process has not yet attempted to persist.
    fn persist(&self, state: &GlobalCalibrationState) -> Result<(), CalibrationError> {
        if let Err(first) = self.repository.store(state) {
            warn!("[CalibrationStore] Save failed, retrying once: {:#}", first);
            if let Err(second) = self.repository.store(state) {
                let err = CalibrationError::PersistenceFailure {
                    reason: format!("{:#}", second),
                };
                crate::error::log_calibration_error(&err, "persist");
                return Err(err);
            }
        }
        Ok(())
    }

    // A panic while the lock is held poisons it, but every mutation installs
    // a complete profile before saving, so the guarded state is still valid.
    // Recover the guard instead of propagating the panic.
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, GlobalCalibrationState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, GlobalCalibrationState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
