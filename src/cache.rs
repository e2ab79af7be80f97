//! The data-cache collaborator.
//!
//! The reshaping helpers never talk to the Brain Observatory directly; they
//! call an injected object implementing [`ObservatoryCache`], which hands out
//! per-session [`ExperimentDataset`]s.  [`crate::local::LocalCache`] is the
//! file-backed implementation shipped with the crate; tests use an in-memory
//! one.
use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::container::ContainerId;
use crate::epoch::EpochTable;
use crate::error::{Error, Result};
use crate::responsivity::CellSpecimen;
use crate::session::SessionRecord;
use crate::stimulus::StimulusTable;

/// Identifier of one recording session (an "ophys experiment").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one cell, stable across the sessions of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellSpecimenId(pub i64);

impl fmt::Display for CellSpecimenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access to experiment listings, session datasets and the cell table.
pub trait ObservatoryCache {
    type Dataset: ExperimentDataset;

    /// Session metadata for every session of the given containers.
    fn ophys_experiments(&self, containers: &[ContainerId]) -> Result<Vec<SessionRecord>>;

    /// Dataset object of one session.
    fn experiment_data(&self, session: SessionId) -> Result<Self::Dataset>;

    /// Per-cell summary statistics for all containers.
    fn cell_specimens(&self) -> Result<Vec<CellSpecimen>>;
}

/// Per-session data retrieval.
pub trait ExperimentDataset {
    fn stimulus_epoch_table(&self) -> Result<EpochTable>;

    fn dff_traces(&self) -> Result<DffTraces>;

    /// Cell specimen ids in trace-row order.
    fn cell_specimen_ids(&self) -> Result<Vec<CellSpecimenId>>;

    /// Trace row of each id in `ids`, in the same order.
    fn cell_specimen_indices(&self, ids: &[CellSpecimenId]) -> Result<Vec<usize>>;

    /// Per-presentation table of one stimulus (e.g. `"natural_scenes"`).
    fn stimulus_table(&self, stimulus: &str) -> Result<StimulusTable>;
}

/// dF/F traces of one session.
///
/// `dff` is `[cells, frames]`; `timestamps` has one entry per frame (seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct DffTraces {
    pub timestamps: Array1<f64>,
    pub dff: Array2<f32>,
}

impl DffTraces {
    /// Pair timestamps with a trace matrix, checking the frame counts agree.
    pub fn new(timestamps: Array1<f64>, dff: Array2<f32>) -> Result<Self> {
        if timestamps.len() != dff.ncols() {
            return Err(Error::Shape(format!(
                "{} timestamps for {} trace frames",
                timestamps.len(),
                dff.ncols()
            )));
        }
        Ok(Self { timestamps, dff })
    }

    pub fn n_cells(&self) -> usize {
        self.dff.nrows()
    }

    pub fn n_frames(&self) -> usize {
        self.dff.ncols()
    }
}
