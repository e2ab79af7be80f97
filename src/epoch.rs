//! Stimulus epochs and trace segmentation.
//!
//! A session is one continuous recording; its epoch table says which
//! stimulus was on screen for which frame range.  Segmenting concatenates,
//! per stimulus label, every frame range carrying that label along the time
//! axis:
//!
//! ```text
//! epochs:  [dg 0..100) [ns 100..250) [dg 250..300)
//! dff:     [C, T]
//!   dg  →  dff[:, 0..100] ++ dff[:, 250..300]     [C, 150]
//!   ns  →  dff[:, 100..250]                       [C, 150]
//! ```
//!
//! Timestamps are cut the same way so each segment keeps its frame times.
use std::collections::BTreeMap;

use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::cache::{DffTraces, ExperimentDataset};
use crate::container::ContainerMap;
use crate::error::{Error, Result};
use crate::session::SessionType;
use crate::stimulus::StimulusFamily;

/// One row of the epoch table; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub stimulus: String,
    pub start: usize,
    pub end: usize,
}

impl Epoch {
    pub fn n_frames(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Ordered epochs of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochTable(pub Vec<Epoch>);

impl EpochTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Epoch> {
        self.0.iter()
    }

    /// Distinct stimulus labels in order of first appearance.
    pub fn stimuli(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for e in &self.0 {
            if !out.iter().any(|s| *s == e.stimulus) {
                out.push(e.stimulus.clone());
            }
        }
        out
    }

    pub fn contains(&self, stimulus: &str) -> bool {
        self.0.iter().any(|e| e.stimulus == stimulus)
    }

    pub fn epochs_of<'a>(&'a self, stimulus: &'a str) -> impl Iterator<Item = &'a Epoch> {
        self.0.iter().filter(move |e| e.stimulus == stimulus)
    }

    /// Families of `session_type` whose stimulus never appears in this table.
    pub fn missing_families(&self, session_type: SessionType) -> Vec<StimulusFamily> {
        session_type
            .stimulus_families()
            .iter()
            .copied()
            .filter(|f| !self.contains(f.stimulus_name()))
            .collect()
    }

    /// Total frames shown with `stimulus`.
    pub fn frames_of(&self, stimulus: &str) -> usize {
        self.epochs_of(stimulus).map(Epoch::n_frames).sum()
    }
}

/// Trace and timestamps of one stimulus, concatenated over its epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusSegment {
    pub timestamps: Array1<f64>,
    /// `[cells, frames]`
    pub dff: Array2<f32>,
}

impl StimulusSegment {
    pub fn n_frames(&self) -> usize {
        self.dff.ncols()
    }
}

/// Stimulus label → segment, for one container.
pub type StimulusTraces = BTreeMap<String, StimulusSegment>;

/// Each container's own epoch table.
pub fn epoch_tables<D: ExperimentDataset>(
    datasets: &ContainerMap<D>,
) -> Result<ContainerMap<EpochTable>> {
    datasets.try_map(|container, ds| {
        log::debug!("fetching epoch table for container {container}");
        ds.stimulus_epoch_table()
    })
}

/// Labels that occur in every container's table, ordered as in the first.
///
/// Use this to pre-filter labels before [`segment_stimuli`] across
/// containers whose batteries differ.
pub fn shared_stimuli(tables: &ContainerMap<EpochTable>) -> Vec<String> {
    let mut iter = tables.values();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut labels = first.stimuli();
    for table in iter {
        labels.retain(|l| table.contains(l));
    }
    labels
}

/// Concatenate every epoch of `stimulus` along the time axis.
///
/// Fails with [`Error::StimulusNotFound`] when the table has no such epoch
/// rather than returning an empty segment.
pub fn concat_stimulus(
    traces: &DffTraces,
    table: &EpochTable,
    stimulus: &str,
) -> Result<StimulusSegment> {
    let n_frames = traces.n_frames();
    let mut dff_parts: Vec<ArrayView2<f32>> = Vec::new();
    let mut ts_parts: Vec<ArrayView1<f64>> = Vec::new();

    for e in table.epochs_of(stimulus) {
        if e.start > e.end || e.end > n_frames {
            return Err(Error::EpochOutOfRange {
                stimulus: stimulus.to_string(),
                start: e.start,
                end: e.end,
                n_frames,
            });
        }
        dff_parts.push(traces.dff.slice(s![.., e.start..e.end]));
        ts_parts.push(traces.timestamps.slice(s![e.start..e.end]));
    }

    if dff_parts.is_empty() {
        return Err(Error::StimulusNotFound(stimulus.to_string()));
    }

    Ok(StimulusSegment {
        timestamps: concatenate(Axis(0), &ts_parts)?,
        dff: concatenate(Axis(1), &dff_parts)?,
    })
}

/// Segment the labels in `stimuli`; every label must occur in `table`.
pub fn segment_stimuli<S: AsRef<str>>(
    traces: &DffTraces,
    table: &EpochTable,
    stimuli: &[S],
) -> Result<StimulusTraces> {
    stimuli
        .iter()
        .map(|label| {
            let label = label.as_ref();
            Ok((label.to_string(), concat_stimulus(traces, table, label)?))
        })
        .collect()
}

/// Segment every label observed in `table`.
pub fn segment_by_stimulus(traces: &DffTraces, table: &EpochTable) -> Result<StimulusTraces> {
    segment_stimuli(traces, table, &table.stimuli())
}

/// Per-stimulus dF/F segments of every container.
///
/// Each container is segmented with its own epoch table from `tables`.
pub fn create_delta_traces<D: ExperimentDataset>(
    datasets: &ContainerMap<D>,
    tables: &ContainerMap<EpochTable>,
) -> Result<ContainerMap<StimulusTraces>> {
    let out = datasets.try_map(|container, ds| {
        let table = tables.require(container)?;
        let traces = ds.dff_traces()?;
        log::debug!(
            "segmenting container {container}: {} cells x {} frames, {} epochs",
            traces.n_cells(),
            traces.n_frames(),
            table.len()
        );
        segment_by_stimulus(&traces, table)
    })?;
    log::info!("segmented traces for {} containers", out.len());
    Ok(out)
}
