//! Stimulus names, stimulus families and per-presentation tables.
use serde::{Deserialize, Serialize};

use crate::cache::ExperimentDataset;
use crate::container::ContainerMap;
use crate::error::Result;

pub const DRIFTING_GRATINGS: &str = "drifting_gratings";
pub const STATIC_GRATINGS: &str = "static_gratings";
pub const NATURAL_SCENES: &str = "natural_scenes";
pub const LOCALLY_SPARSE_NOISE: &str = "locally_sparse_noise";
pub const SPONTANEOUS: &str = "spontaneous";

/// Stimulus classes with per-cell significance statistics in the cell table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StimulusFamily {
    DriftingGratings,
    StaticGratings,
    NaturalScenes,
}

impl StimulusFamily {
    pub const ALL: [StimulusFamily; 3] = [
        StimulusFamily::DriftingGratings,
        StimulusFamily::StaticGratings,
        StimulusFamily::NaturalScenes,
    ];

    /// Epoch-table label of this family.
    pub fn stimulus_name(self) -> &'static str {
        match self {
            StimulusFamily::DriftingGratings => DRIFTING_GRATINGS,
            StimulusFamily::StaticGratings => STATIC_GRATINGS,
            StimulusFamily::NaturalScenes => NATURAL_SCENES,
        }
    }
}

/// One presentation within a stimulus block.
///
/// For natural scenes `frame` is the image index (`-1` for a blank sweep).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusPresentation {
    pub frame: i64,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StimulusTable(pub Vec<StimulusPresentation>);

impl StimulusTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StimulusPresentation> {
        self.0.iter()
    }

    /// Presentations of one image / grating condition.
    pub fn presentations_of(&self, frame: i64) -> impl Iterator<Item = &StimulusPresentation> {
        self.0.iter().filter(move |p| p.frame == frame)
    }
}

/// Presentation timing of `stimulus` for each container's dataset.
pub fn stimulus_tables<D: ExperimentDataset>(
    datasets: &ContainerMap<D>,
    stimulus: &str,
) -> Result<ContainerMap<StimulusTable>> {
    datasets.try_map(|container, ds| {
        log::debug!("fetching {stimulus} table for container {container}");
        ds.stimulus_table(stimulus)
    })
}
