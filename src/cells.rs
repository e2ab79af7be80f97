//! Cell specimen id ↔ trace row mapping.
use std::collections::BTreeMap;

use ndarray::{Array2, Axis};
use serde::Serialize;

use crate::cache::{CellSpecimenId, ExperimentDataset};
use crate::container::ContainerMap;
use crate::error::{Error, Result};

/// Bijection between the cell specimen ids of one session and the rows of its
/// dF/F trace matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CellIndexMap(BTreeMap<CellSpecimenId, usize>);

impl CellIndexMap {
    /// Pair `ids[i]` with `indices[i]`.
    ///
    /// Fails if the lengths differ, an id repeats, or two ids share a row.
    pub fn from_pairs(ids: &[CellSpecimenId], indices: &[usize]) -> Result<Self> {
        if ids.len() != indices.len() {
            return Err(Error::LengthMismatch {
                ids: ids.len(),
                indices: indices.len(),
            });
        }
        let mut map = BTreeMap::new();
        let mut owner: BTreeMap<usize, CellSpecimenId> = BTreeMap::new();
        for (&id, &index) in ids.iter().zip(indices) {
            if let Some(&first) = owner.get(&index) {
                return Err(Error::DuplicateCellIndex { index, first, second: id });
            }
            if map.insert(id, index).is_some() {
                return Err(Error::DuplicateCellSpecimen(id));
            }
            owner.insert(index, id);
        }
        Ok(Self(map))
    }

    pub fn index_of(&self, id: CellSpecimenId) -> Option<usize> {
        self.0.get(&id).copied()
    }

    /// Inverse lookup: which cell sits in trace row `index`.
    pub fn specimen_at(&self, index: usize) -> Option<CellSpecimenId> {
        self.0.iter().find(|(_, &i)| i == index).map(|(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellSpecimenId, usize)> + '_ {
        self.0.iter().map(|(&id, &i)| (id, i))
    }

    /// Trace rows of `ids`, in the order given.
    pub fn rows(&self, ids: &[CellSpecimenId]) -> Result<Vec<usize>> {
        ids.iter()
            .map(|&id| self.index_of(id).ok_or(Error::UnknownCellSpecimen(id)))
            .collect()
    }

    /// Extract the trace rows of `ids` from a `[cells, frames]` matrix.
    pub fn select_rows(&self, dff: &Array2<f32>, ids: &[CellSpecimenId]) -> Result<Array2<f32>> {
        let rows = self.rows(ids)?;
        if let Some(&bad) = rows.iter().find(|&&r| r >= dff.nrows()) {
            return Err(Error::Shape(format!(
                "trace row {bad} out of range for {} cells",
                dff.nrows()
            )));
        }
        Ok(dff.select(Axis(0), &rows))
    }
}

/// Id → trace-row map of each container's dataset.
pub fn cell_indices<D: ExperimentDataset>(
    datasets: &ContainerMap<D>,
) -> Result<ContainerMap<CellIndexMap>> {
    datasets.try_map(|container, ds| {
        let ids = ds.cell_specimen_ids()?;
        let indices = ds.cell_specimen_indices(&ids)?;
        log::debug!("container {container}: {} cell indices", ids.len());
        CellIndexMap::from_pairs(&ids, &indices)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<CellSpecimenId> {
        raw.iter().copied().map(CellSpecimenId).collect()
    }

    #[test]
    fn pairs_map_both_ways() {
        let map = CellIndexMap::from_pairs(&ids(&[517, 42, 900]), &[0, 1, 2]).unwrap();
        assert_eq!(map.index_of(CellSpecimenId(42)), Some(1));
        assert_eq!(map.specimen_at(2), Some(CellSpecimenId(900)));
        assert_eq!(map.specimen_at(3), None);
    }

    #[test]
    fn duplicate_index_rejected() {
        let err = CellIndexMap::from_pairs(&ids(&[1, 2]), &[0, 0]).unwrap_err();
        assert!(matches!(err, Error::DuplicateCellIndex { index: 0, .. }));
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = CellIndexMap::from_pairs(&ids(&[1, 1]), &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::DuplicateCellSpecimen(CellSpecimenId(1))));
    }

    #[test]
    fn length_mismatch_rejected() {
        assert!(matches!(
            CellIndexMap::from_pairs(&ids(&[1, 2, 3]), &[0, 1]),
            Err(Error::LengthMismatch { ids: 3, indices: 2 })
        ));
    }

    #[test]
    fn select_rows_in_requested_order() {
        let map = CellIndexMap::from_pairs(&ids(&[10, 20, 30]), &[0, 1, 2]).unwrap();
        let dff = Array2::from_shape_fn((3, 4), |(c, t)| (c * 10 + t) as f32);
        let sub = map.select_rows(&dff, &ids(&[30, 10])).unwrap();
        assert_eq!(sub.dim(), (2, 4));
        assert_eq!(sub[[0, 0]], 20.0);
        assert_eq!(sub[[1, 3]], 3.0);
        assert!(map.select_rows(&dff, &ids(&[99])).is_err());
    }
}
