// Durable storage for calibration state
//
// The core depends only on the `CalibrationRepository` trait; the concrete
// backend is an implementation detail of the enclosing device firmware.
// `FileRepository` is the on-device JSON backend, `MemoryRepository` backs
// tests and the HTTP smoke setup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::calibration::GlobalCalibrationState;

/// Abstraction over the durable record store holding calibration state.
///
/// `store` must be atomic from the caller's perspective: after a crash the
/// previously persisted state must remain readable, never a torn write.
pub trait CalibrationRepository: Send + Sync {
    /// Read the persisted state. `Ok(None)` means nothing was ever saved.
    fn load(&self) -> anyhow::Result<Option<GlobalCalibrationState>>;

    /// Persist the full state, replacing any previous record.
    fn store(&self, state: &GlobalCalibrationState) -> anyhow::Result<()>;
}

/// JSON-file backend with write-to-temp-then-rename atomicity.
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl CalibrationRepository for FileRepository {
    fn load(&self) -> anyhow::Result<Option<GlobalCalibrationState>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).context(format!("reading calibration state {:?}", self.path))
            }
        };

        let state = serde_json::from_str(&contents)
            .context(format!("parsing calibration state {:?}", self.path))?;
        Ok(Some(state))
    }

    fn store(&self, state: &GlobalCalibrationState) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(state).context("serializing calibration state")?;

        // Rename is atomic on the target filesystem; a crash mid-write leaves
        // the previous file intact.
        let temp = self.temp_path();
        fs::write(&temp, json).context(format!("writing calibration state {:?}", temp))?;
        fs::rename(&temp, &self.path)
            .context(format!("committing calibration state {:?}", self.path))?;
        Ok(())
    }
}

/// In-process backend for tests.
#[derive(Default)]
pub struct MemoryRepository {
    record: Mutex<Option<String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CalibrationRepository for MemoryRepository {
    fn load(&self) -> anyhow::Result<Option<GlobalCalibrationState>> {
        let record = self.record.lock().expect("memory repository poisoned");
        match record.as_deref() {
            Some(json) => Ok(Some(
                serde_json::from_str(json).context("parsing in-memory calibration state")?,
            )),
            None => Ok(None),
        }
    }

    fn store(&self, state: &GlobalCalibrationState) -> anyhow::Result<()> {
        let json = serde_json::to_string(state).context("serializing calibration state")?;
        *self.record.lock().expect("memory repository poisoned") = Some(json);
        Ok(())
    }
}
