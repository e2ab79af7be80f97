//! Experiment containers and the mapping type keyed by them.
//!
//! Every helper in this crate returns a [`ContainerMap`]: one entry per
//! container of the input list, never more, never fewer.  The constructor
//! enforces that by rejecting duplicate ids up front, so a caller can rely on
//! `map.len() == containers.len()`.
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of an experiment container (one imaging subject / field of view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub i64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ContainerId {
    fn from(v: i64) -> Self {
        ContainerId(v)
    }
}

/// Mapping `container id → V` holding exactly one entry per requested container.
///
/// What `V` means is fixed by the function that builds the map:
///
/// | built by                        | `V`                                   |
/// |---------------------------------|---------------------------------------|
/// | `resolve_session_ids`           | session type → session id             |
/// | `load_datasets`                 | dataset object of one session         |
/// | `epoch_tables`                  | that session's own epoch table        |
/// | `create_delta_traces`           | stimulus → concatenated dF/F segment  |
/// | `classify_responsivity`         | cell ids of one responsivity category |
/// | `cell_indices`                  | cell specimen id ↔ trace row          |
/// | `stimulus_tables`               | per-presentation stimulus table       |
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContainerMap<V> {
    entries: BTreeMap<ContainerId, V>,
}

impl<V> ContainerMap<V> {
    /// Build a map by calling `f` once for every container in `containers`.
    ///
    /// Fails with [`Error::DuplicateContainer`] if an id repeats, and
    /// propagates the first error returned by `f`.
    pub fn try_build<F>(containers: &[ContainerId], mut f: F) -> Result<Self>
    where
        F: FnMut(ContainerId) -> Result<V>,
    {
        let mut entries = BTreeMap::new();
        for &id in containers {
            if entries.contains_key(&id) {
                return Err(Error::DuplicateContainer(id));
            }
            let value = f(id)?;
            entries.insert(id, value);
        }
        Ok(Self { entries })
    }

    /// Same keys, values transformed by `f`.
    pub fn try_map<U, F>(&self, mut f: F) -> Result<ContainerMap<U>>
    where
        F: FnMut(ContainerId, &V) -> Result<U>,
    {
        let mut entries = BTreeMap::new();
        for (&id, v) in &self.entries {
            entries.insert(id, f(id, v)?);
        }
        Ok(ContainerMap { entries })
    }

    /// Look up a container, failing with [`Error::MissingContainer`].
    pub fn require(&self, id: ContainerId) -> Result<&V> {
        self.entries.get(&id).ok_or(Error::MissingContainer(id))
    }

    pub fn get(&self, id: ContainerId) -> Option<&V> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ContainerId) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Container ids in ascending order.
    pub fn ids(&self) -> Vec<ContainerId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ContainerId, V> {
        self.entries.iter()
    }

    pub fn values(&self) -> btree_map::Values<'_, ContainerId, V> {
        self.entries.values()
    }

    pub fn into_inner(self) -> BTreeMap<ContainerId, V> {
        self.entries
    }
}

impl<'a, V> IntoIterator for &'a ContainerMap<V> {
    type Item = (&'a ContainerId, &'a V);
    type IntoIter = btree_map::Iter<'a, ContainerId, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<V> IntoIterator for ContainerMap<V> {
    type Item = (ContainerId, V);
    type IntoIter = btree_map::IntoIter<ContainerId, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Convert raw integer ids (as typed in a notebook or on the command line).
pub fn container_ids(raw: &[i64]) -> Vec<ContainerId> {
    raw.iter().copied().map(ContainerId).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_entry_per_container() {
        let ids = container_ids(&[30, 10, 20]);
        let map = ContainerMap::try_build(&ids, |id| Ok(id.0 * 2)).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(ContainerId(20)), Some(&40));
        assert_eq!(map.ids(), container_ids(&[10, 20, 30]));
    }

    #[test]
    fn duplicate_container_rejected() {
        let ids = container_ids(&[1, 2, 1]);
        let err = ContainerMap::try_build(&ids, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::DuplicateContainer(ContainerId(1))));
    }

    #[test]
    fn builder_error_propagates() {
        let ids = container_ids(&[1, 2]);
        let err = ContainerMap::<()>::try_build(&ids, |id| {
            if id.0 == 2 { Err(Error::MissingContainer(id)) } else { Ok(()) }
        })
        .unwrap_err();
        assert!(matches!(err, Error::MissingContainer(ContainerId(2))));
    }

    #[test]
    fn require_missing_is_error() {
        let map = ContainerMap::try_build(&container_ids(&[5]), |_| Ok("x")).unwrap();
        assert_eq!(*map.require(ContainerId(5)).unwrap(), "x");
        assert!(map.require(ContainerId(6)).is_err());
    }

    #[test]
    fn try_map_keeps_keys() {
        let map = ContainerMap::try_build(&container_ids(&[3, 4]), |id| Ok(id.0)).unwrap();
        let mapped = map.try_map(|_, v| Ok(v.to_string())).unwrap();
        assert_eq!(mapped.ids(), map.ids());
        assert_eq!(mapped.get(ContainerId(4)).map(String::as_str), Some("4"));
    }

    #[test]
    fn serializes_as_json_object() {
        let map = ContainerMap::try_build(&container_ids(&[7]), |_| Ok(vec![1, 2])).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"7":[1,2]}"#);
    }
}
