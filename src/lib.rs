//! # ophys — reshaping helpers for Brain Observatory calcium imaging
//!
//! `ophys` turns what a Brain Observatory data cache hands out (experiment
//! listings, per-session datasets, the cell-specimen table) into mappings
//! keyed by experiment container, ready for downstream statistics.
//!
//! ## Overview
//!
//! ```text
//! ObservatoryCache
//!   │
//!   ├─ session::resolve_session_ids()    container → (session type → session id)
//!   ├─ session::load_datasets()          container → dataset of one session type
//!   │     │
//!   │     ├─ epoch::epoch_tables()           container → epoch table
//!   │     ├─ epoch::create_delta_traces()    container → (stimulus → dF/F segment)
//!   │     ├─ cells::cell_indices()           container → (cell id ↔ trace row)
//!   │     └─ stimulus::stimulus_tables()     container → presentation table
//!   │
//!   └─ responsivity::classify_responsivity()
//!                                        category → (container → cell ids)
//! ```
//!
//! Every mapping is a [`ContainerMap`] with exactly one entry per requested
//! container; every failure is an [`Error`].
//!
//! ## Quick start
//!
//! ```no_run
//! use ophys::{
//!     container_ids, load_datasets, epoch_tables, create_delta_traces,
//!     responsivity_status, LocalCache, ResponsivityConfig, SessionType,
//! };
//!
//! let cache = LocalCache::open("data/boc").unwrap();
//! let containers = container_ids(&[511498742, 511507650]);
//!
//! let datasets = load_datasets(&cache, &containers, SessionType::B).unwrap();
//! let tables = epoch_tables(&datasets).unwrap();
//! let traces = create_delta_traces(&datasets, &tables).unwrap();
//!
//! let cfg = ResponsivityConfig::default();
//! let categories = responsivity_status(&cache, &containers, SessionType::B, &cfg).unwrap();
//!
//! for (container, by_stim) in &traces {
//!     for (stimulus, seg) in by_stim {
//!         println!("{container} {stimulus}: {:?}", seg.dff.dim());
//!     }
//! }
//! # let _ = categories;
//! ```

pub mod cache;
pub mod cells;
pub mod config;
pub mod container;
pub mod cre;
pub mod epoch;
pub mod error;
pub mod io;
pub mod local;
pub mod responsivity;
pub mod session;
pub mod stimulus;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use cache::{CellSpecimenId, DffTraces, ExperimentDataset, ObservatoryCache, SessionId};
pub use cells::{cell_indices, CellIndexMap};
pub use config::ResponsivityConfig;
pub use container::{container_ids, ContainerId, ContainerMap};
pub use cre::{cre_to_layer, CreLine};
pub use epoch::{
    concat_stimulus, create_delta_traces, epoch_tables, segment_by_stimulus, segment_stimuli,
    shared_stimuli, Epoch, EpochTable, StimulusSegment, StimulusTraces,
};
pub use error::{Error, Result};
pub use io::{read_dff_traces, write_dff_traces, write_segments, StWriter};
pub use local::{LocalCache, LocalDataset, Manifest, SessionEntry};
pub use responsivity::{
    classify_cells, classify_responsivity, responsivity_status, CellCategories, CellSpecimen,
    ResponseCategory,
};
pub use session::{
    container_sessions, load_datasets, resolve_session_ids, SessionIds, SessionRecord, SessionType,
};
pub use stimulus::{stimulus_tables, StimulusFamily, StimulusPresentation, StimulusTable};
