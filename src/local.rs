//! Directory-backed [`ObservatoryCache`].
//!
//! Layout:
//!
//! ```text
//! <root>/manifest.json
//! <root>/<trace files referenced from the manifest>.safetensors
//! ```
//!
//! `manifest.json`:
//!
//! ```json
//! {
//!   "experiments":    [ { "id": 501, "experiment_container_id": 7,
//!                         "session_type": "three_session_A", ... } ],
//!   "cell_specimens": [ { "cell_specimen_id": 1, "experiment_container_id": 7,
//!                         "p_dg": 0.01, "peak_dff_dg": 4.2, ... } ],
//!   "sessions": {
//!     "501": {
//!       "epoch_table":       [ { "stimulus": "drifting_gratings", "start": 0, "end": 900 } ],
//!       "cell_specimen_ids": [ 1, 2, 3 ],
//!       "stimulus_tables":   { "natural_scenes": [ { "frame": 4, "start": 0, "end": 7 } ] },
//!       "traces":            "traces/501.safetensors"
//!     }
//!   }
//! }
//! ```
//!
//! `cell_specimen_ids` lists the cells in trace-row order.  Trace files are
//! read lazily, on [`ExperimentDataset::dff_traces`].
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::{CellSpecimenId, DffTraces, ExperimentDataset, ObservatoryCache, SessionId};
use crate::container::ContainerId;
use crate::epoch::EpochTable;
use crate::error::{Error, Result};
use crate::io::read_dff_traces;
use crate::responsivity::CellSpecimen;
use crate::session::SessionRecord;
use crate::stimulus::StimulusTable;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub experiments: Vec<SessionRecord>,
    #[serde(default)]
    pub cell_specimens: Vec<CellSpecimen>,
    #[serde(default)]
    pub sessions: BTreeMap<SessionId, SessionEntry>,
}

/// Per-session payload of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    #[serde(default)]
    pub epoch_table: EpochTable,
    #[serde(default)]
    pub cell_specimen_ids: Vec<CellSpecimenId>,
    #[serde(default)]
    pub stimulus_tables: BTreeMap<String, StimulusTable>,
    /// Trace file, relative to the cache root.
    pub traces: PathBuf,
}

pub struct LocalCache {
    root: PathBuf,
    manifest: Manifest,
}

impl LocalCache {
    /// Read `<root>/manifest.json`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let text = std::fs::read_to_string(root.join(MANIFEST_FILE))?;
        let manifest: Manifest = serde_json::from_str(&text)?;
        log::info!(
            "opened cache {}: {} sessions, {} cells",
            root.display(),
            manifest.experiments.len(),
            manifest.cell_specimens.len()
        );
        Ok(Self { root, manifest })
    }

    /// Wrap an in-memory manifest; trace paths resolve against `root`.
    pub fn from_manifest(root: impl AsRef<Path>, manifest: Manifest) -> Self {
        Self { root: root.as_ref().to_path_buf(), manifest }
    }

    /// Write the manifest to `<root>/manifest.json`.
    pub fn save_manifest(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.manifest)?;
        std::fs::write(self.root.join(MANIFEST_FILE), text)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl ObservatoryCache for LocalCache {
    type Dataset = LocalDataset;

    fn ophys_experiments(&self, containers: &[ContainerId]) -> Result<Vec<SessionRecord>> {
        Ok(self
            .manifest
            .experiments
            .iter()
            .filter(|r| containers.contains(&r.experiment_container_id))
            .cloned()
            .collect())
    }

    fn experiment_data(&self, session: SessionId) -> Result<LocalDataset> {
        let entry = self
            .manifest
            .sessions
            .get(&session)
            .ok_or(Error::UnknownSession(session))?;
        Ok(LocalDataset {
            session,
            entry: entry.clone(),
            traces_path: self.root.join(&entry.traces),
        })
    }

    fn cell_specimens(&self) -> Result<Vec<CellSpecimen>> {
        Ok(self.manifest.cell_specimens.clone())
    }
}

/// One session served from a [`LocalCache`].
#[derive(Debug, Clone)]
pub struct LocalDataset {
    session: SessionId,
    entry: SessionEntry,
    traces_path: PathBuf,
}

impl LocalDataset {
    pub fn session_id(&self) -> SessionId {
        self.session
    }
}

impl ExperimentDataset for LocalDataset {
    fn stimulus_epoch_table(&self) -> Result<EpochTable> {
        Ok(self.entry.epoch_table.clone())
    }

    fn dff_traces(&self) -> Result<DffTraces> {
        let traces = read_dff_traces(&self.traces_path)?;
        if traces.n_cells() != self.entry.cell_specimen_ids.len() {
            return Err(Error::Shape(format!(
                "session {}: {} trace rows for {} cell specimen ids",
                self.session,
                traces.n_cells(),
                self.entry.cell_specimen_ids.len()
            )));
        }
        Ok(traces)
    }

    fn cell_specimen_ids(&self) -> Result<Vec<CellSpecimenId>> {
        Ok(self.entry.cell_specimen_ids.clone())
    }

    fn cell_specimen_indices(&self, ids: &[CellSpecimenId]) -> Result<Vec<usize>> {
        let rows: BTreeMap<CellSpecimenId, usize> = self
            .entry
            .cell_specimen_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        ids.iter()
            .map(|id| rows.get(id).copied().ok_or(Error::UnknownCellSpecimen(*id)))
            .collect()
    }

    fn stimulus_table(&self, stimulus: &str) -> Result<StimulusTable> {
        self.entry
            .stimulus_tables
            .get(stimulus)
            .cloned()
            .ok_or_else(|| Error::StimulusNotFound(stimulus.to_string()))
    }
}
