//! # Commit Checkpoint Marker
//!
//! Commit is a multi-writer sequence: block files, then cache state, then
//! the score and supporting indexes. A single-byte marker file records
//! how far the sequence got so a restart knows which writers are already
//! consistent. The marker is replaced atomically (write to a temporary
//! file, then rename) so a crash can never leave a torn value.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::errors::SyncError;

const MARKER_FILE: &str = "commit_step.dat";
const MARKER_TMP: &str = "commit_step.tmp";

/// Progress of the ordered commit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommitOperationStep {
    /// Block files are on disk; cache state is not.
    BlocksWritten = 0,
    /// Cache state is committed; supporting indexes may lag.
    StateWritten = 1,
    /// Every writer is consistent.
    AllUpdated = 2,
}

impl TryFrom<u8> for CommitOperationStep {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(Self::BlocksWritten),
            1 => Ok(Self::StateWritten),
            2 => Ok(Self::AllUpdated),
            other => Err(other),
        }
    }
}

/// Sink for commit-step announcements.
pub trait CommitStepObserver: Send + Sync {
    fn on_step(&self, step: CommitOperationStep) -> Result<(), SyncError>;
}

/// Observer that ignores every step.
#[derive(Debug, Default)]
pub struct NoopCommitStepWriter;

impl CommitStepObserver for NoopCommitStepWriter {
    fn on_step(&self, _step: CommitOperationStep) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Persists the commit step as a single byte in `dir`.
#[derive(Debug)]
pub struct FileCommitStepWriter {
    dir: PathBuf,
}

impl FileCommitStepWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The step recorded by the last announcement, if any marker exists.
    pub fn read_step(&self) -> Result<Option<CommitOperationStep>, SyncError> {
        let bytes = match fs::read(self.dir.join(MARKER_FILE)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(checkpoint_error(err)),
        };
        let byte = bytes.first().copied().ok_or_else(|| SyncError::Checkpoint {
            message: "marker file is empty".into(),
        })?;
        let step = CommitOperationStep::try_from(byte).map_err(|value| SyncError::Checkpoint {
            message: format!("unknown commit step {value}"),
        })?;
        Ok(Some(step))
    }

    fn write_marker(&self, dir: &Path, step: CommitOperationStep) -> io::Result<()> {
        let tmp = dir.join(MARKER_TMP);
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&[step as u8])?;
        file.sync_all()?;
        fs::rename(tmp, dir.join(MARKER_FILE))
    }
}

impl CommitStepObserver for FileCommitStepWriter {
    fn on_step(&self, step: CommitOperationStep) -> Result<(), SyncError> {
        self.write_marker(&self.dir, step).map_err(checkpoint_error)
    }
}

fn checkpoint_error(err: io::Error) -> SyncError {
    SyncError::Checkpoint {
        message: err.to_string(),
    }
}
