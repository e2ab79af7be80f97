mod common;
use std::collections::BTreeSet;

use common::standard_cache;
use ophys::{
    cell_indices, classify_responsivity, container_ids, load_datasets, CellSpecimenId,
    ContainerId, Error, ExperimentDataset, ResponseCategory, ResponsivityConfig, SessionId,
    SessionType,
};

#[test]
fn index_map_is_injective_per_container() {
    let cache = standard_cache();
    let datasets = load_datasets(&cache, &container_ids(&[100, 200, 300]), SessionType::A).unwrap();
    let maps = cell_indices(&datasets).unwrap();
    assert_eq!(maps.len(), 3);
    for (container, map) in &maps {
        let rows: BTreeSet<usize> = map.iter().map(|(_, i)| i).collect();
        assert_eq!(rows.len(), map.len(), "container {container}");
    }
    let c100 = maps.get(ContainerId(100)).unwrap();
    assert_eq!(c100.index_of(CellSpecimenId(13)), Some(2));
}

#[test]
fn colliding_indices_from_cache_rejected() {
    let mut cache = standard_cache();
    cache.sessions.get_mut(&SessionId(1001)).unwrap().indices = Some(vec![0, 1, 1]);
    let datasets = load_datasets(&cache, &container_ids(&[100]), SessionType::A).unwrap();
    let err = cell_indices(&datasets).unwrap_err();
    assert!(matches!(err, Error::DuplicateCellIndex { index: 1, .. }));
}

#[test]
fn select_traces_of_a_category() {
    let cache = standard_cache();
    let containers = container_ids(&[100]);
    let datasets = load_datasets(&cache, &containers, SessionType::A).unwrap();
    let maps = cell_indices(&datasets).unwrap();
    let cats = classify_responsivity(
        &containers,
        &cache.specimens,
        SessionType::A,
        &ResponsivityConfig::default(),
    )
    .unwrap();

    let dg_nor = cats.cells(ResponseCategory::DgNonResponsive, ContainerId(100)).unwrap();
    let traces = datasets.get(ContainerId(100)).unwrap().dff_traces().unwrap();
    let rows = maps.get(ContainerId(100)).unwrap().select_rows(&traces.dff, dg_nor).unwrap();
    assert_eq!(rows.dim(), (1, 100));
    assert_eq!(rows[[0, 5]], 2005.0);
}
