//! Error type shared by every reshaping helper.
use thiserror::Error;

use crate::cache::{CellSpecimenId, SessionId};
use crate::container::ContainerId;
use crate::session::SessionType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Cre line name not in the known table.
    #[error("Cre line not found: {0:?}")]
    UnknownCreLine(String),

    #[error("unknown session type: {0:?}")]
    UnknownSessionType(String),

    /// The same container id was passed twice in one input list.
    #[error("container {0} listed more than once")]
    DuplicateContainer(ContainerId),

    /// A mapping was expected to hold this container but does not.
    #[error("no entry for container {0}")]
    MissingContainer(ContainerId),

    #[error("container {container} has no {session_type} session")]
    MissingSession {
        container: ContainerId,
        session_type: SessionType,
    },

    #[error("container {container} has more than one {session_type} session")]
    DuplicateSession {
        container: ContainerId,
        session_type: SessionType,
    },

    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    /// Concatenation over zero epochs of this stimulus.
    #[error("stimulus {0:?} does not occur in the epoch table")]
    StimulusNotFound(String),

    #[error("epoch {stimulus:?} [{start}, {end}) out of range for {n_frames} frames")]
    EpochOutOfRange {
        stimulus: String,
        start: usize,
        end: usize,
        n_frames: usize,
    },

    #[error("{ids} cell specimen ids but {indices} cell indices")]
    LengthMismatch { ids: usize, indices: usize },

    #[error("cell specimen {0} listed more than once")]
    DuplicateCellSpecimen(CellSpecimenId),

    #[error("cells {first} and {second} both map to trace row {index}")]
    DuplicateCellIndex {
        index: usize,
        first: CellSpecimenId,
        second: CellSpecimenId,
    },

    #[error("unknown cell specimen {0}")]
    UnknownCellSpecimen(CellSpecimenId),

    /// Trace timestamps and dF/F columns disagree, or similar shape issue.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Malformed safetensors payload.
    #[error("tensor file: {0}")]
    Tensor(String),

    /// Failure reported by a cache implementation.
    #[error("cache: {0}")]
    Cache(String),

    #[error(transparent)]
    Ndarray(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
