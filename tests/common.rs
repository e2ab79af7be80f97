/// Shared in-memory cache for integration tests.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use ophys::{
    CellSpecimen, CellSpecimenId, ContainerId, DffTraces, Epoch, EpochTable, Error,
    ExperimentDataset, ObservatoryCache, Result, SessionId, SessionRecord, SessionType,
    StimulusPresentation, StimulusTable,
};
use ophys::stimulus::LOCALLY_SPARSE_NOISE;

#[derive(Debug, Clone)]
pub struct FakeDataset {
    pub epochs: EpochTable,
    pub traces: DffTraces,
    pub cell_ids: Vec<CellSpecimenId>,
    /// Overrides the row lookup when set (to model a broken cache).
    pub indices: Option<Vec<usize>>,
    pub stimulus_tables: BTreeMap<String, StimulusTable>,
}

impl ExperimentDataset for FakeDataset {
    fn stimulus_epoch_table(&self) -> Result<EpochTable> {
        Ok(self.epochs.clone())
    }

    fn dff_traces(&self) -> Result<DffTraces> {
        Ok(self.traces.clone())
    }

    fn cell_specimen_ids(&self) -> Result<Vec<CellSpecimenId>> {
        Ok(self.cell_ids.clone())
    }

    fn cell_specimen_indices(&self, ids: &[CellSpecimenId]) -> Result<Vec<usize>> {
        if let Some(indices) = &self.indices {
            return Ok(indices.clone());
        }
        ids.iter()
            .map(|id| {
                self.cell_ids
                    .iter()
                    .position(|c| c == id)
                    .ok_or(Error::UnknownCellSpecimen(*id))
            })
            .collect()
    }

    fn stimulus_table(&self, stimulus: &str) -> Result<StimulusTable> {
        self.stimulus_tables
            .get(stimulus)
            .cloned()
            .ok_or_else(|| Error::StimulusNotFound(stimulus.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct FakeCache {
    pub experiments: Vec<SessionRecord>,
    pub specimens: Vec<CellSpecimen>,
    pub sessions: BTreeMap<SessionId, FakeDataset>,
}

impl ObservatoryCache for FakeCache {
    type Dataset = FakeDataset;

    fn ophys_experiments(&self, containers: &[ContainerId]) -> Result<Vec<SessionRecord>> {
        Ok(self
            .experiments
            .iter()
            .filter(|r| containers.contains(&r.experiment_container_id))
            .cloned()
            .collect())
    }

    fn experiment_data(&self, session: SessionId) -> Result<FakeDataset> {
        self.sessions
            .get(&session)
            .cloned()
            .ok_or(Error::UnknownSession(session))
    }

    fn cell_specimens(&self) -> Result<Vec<CellSpecimen>> {
        Ok(self.specimens.clone())
    }
}

#[allow(unused)]
pub fn record(id: i64, container: i64, session_type: SessionType) -> SessionRecord {
    SessionRecord {
        id: SessionId(id),
        experiment_container_id: ContainerId(container),
        session_type,
        cre_line: Some("Cux2-CreERT2".into()),
        targeted_structure: Some("VISp".into()),
        imaging_depth: Some(175),
    }
}

#[allow(unused)]
/// `dff[c, t] = c * 1000 + t`, timestamps at 30 Hz.
pub fn ramp_traces(n_cells: usize, n_frames: usize) -> DffTraces {
    let dff = Array2::from_shape_fn((n_cells, n_frames), |(c, t)| (c * 1000 + t) as f32);
    let ts = Array1::from_shape_fn(n_frames, |t| t as f64 / 30.0);
    DffTraces::new(ts, dff).unwrap()
}

#[allow(unused)]
pub fn epochs(rows: &[(&str, usize, usize)]) -> EpochTable {
    EpochTable(
        rows.iter()
            .map(|&(s, start, end)| Epoch { stimulus: s.to_string(), start, end })
            .collect(),
    )
}

#[allow(unused)]
pub fn dataset(cell_ids: &[i64], n_frames: usize, table: EpochTable) -> FakeDataset {
    let mut stimulus_tables = BTreeMap::new();
    stimulus_tables.insert(
        "natural_scenes".to_string(),
        StimulusTable(vec![
            StimulusPresentation { frame: 0, start: 10, end: 17 },
            StimulusPresentation { frame: -1, start: 17, end: 24 },
        ]),
    );
    FakeDataset {
        epochs: table,
        traces: ramp_traces(cell_ids.len(), n_frames),
        cell_ids: cell_ids.iter().copied().map(CellSpecimenId).collect(),
        indices: None,
        stimulus_tables,
    }
}

#[allow(unused)]
/// Row of the cell table with the same p-value and peak for every family.
pub fn specimen(id: i64, container: i64, p: f64, peak: f64, rf_chi2: f64) -> CellSpecimen {
    CellSpecimen {
        cell_specimen_id: CellSpecimenId(id),
        experiment_container_id: ContainerId(container),
        p_dg: Some(p),
        peak_dff_dg: Some(peak),
        p_sg: Some(p),
        peak_dff_sg: Some(peak),
        p_ns: Some(p),
        peak_dff_ns: Some(peak),
        rf_chi2_lsn: Some(rf_chi2),
    }
}

#[allow(unused)]
/// Three containers:
///   100: A (1001), B (1002), C (1003)
///   200: A (2001), B (2002), C2 (2003)
///   300: A (3001) only
pub fn standard_cache() -> FakeCache {
    let mut cache = FakeCache::default();
    cache.experiments = vec![
        record(1001, 100, SessionType::A),
        record(1002, 100, SessionType::B),
        record(1003, 100, SessionType::C),
        record(2001, 200, SessionType::A),
        record(2002, 200, SessionType::B),
        record(2003, 200, SessionType::C2),
        record(3001, 300, SessionType::A),
    ];

    let table_a = epochs(&[
        ("drifting_gratings", 0, 40),
        ("spontaneous", 40, 50),
        ("natural_movie_one", 50, 70),
        ("drifting_gratings", 70, 100),
    ]);
    let table_b = epochs(&[
        ("static_gratings", 0, 30),
        ("natural_scenes", 30, 60),
        ("static_gratings", 60, 80),
        ("natural_scenes", 80, 95),
    ]);
    // container 200 sees the A battery in a different order
    let table_a_200 = epochs(&[
        ("spontaneous", 0, 20),
        ("drifting_gratings", 20, 90),
    ]);

    cache.sessions.insert(SessionId(1001), dataset(&[11, 12, 13], 100, table_a.clone()));
    cache.sessions.insert(SessionId(1002), dataset(&[11, 12, 13], 100, table_b.clone()));
    cache.sessions.insert(SessionId(1003), dataset(&[11, 12], 100, epochs(&[(LOCALLY_SPARSE_NOISE, 0, 100)])));
    cache.sessions.insert(SessionId(2001), dataset(&[21, 22], 90, table_a_200));
    cache.sessions.insert(SessionId(2002), dataset(&[21, 22], 100, table_b));
    cache.sessions.insert(SessionId(2003), dataset(&[21], 100, epochs(&[(LOCALLY_SPARSE_NOISE, 0, 100)])));
    cache.sessions.insert(SessionId(3001), dataset(&[31], 100, table_a));

    cache.specimens = vec![
        specimen(11, 100, 0.5, 1.0, 0.5),
        specimen(12, 100, 0.01, 10.0, 0.01),
        specimen(13, 100, 0.5, 10.0, 0.01),
        specimen(21, 200, 0.01, 1.0, 0.3),
        specimen(22, 200, 0.01, 10.0, 0.3),
        specimen(31, 300, 0.2, 2.0, 0.9),
    ];
    cache
}
