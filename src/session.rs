//! Session types and the session resolver.
//!
//! A container holds one session per stimulus battery:
//!
//! ```text
//! three_session_A   drifting gratings, natural movies
//! three_session_B   static gratings, natural scenes, natural movie
//! three_session_C   locally sparse noise, natural movies
//! three_session_C2  C plus an extra sparse-noise block (subjects from 09/2016)
//! ```
//!
//! C and C2 are mutually exclusive within a container.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{ObservatoryCache, SessionId};
use crate::container::{ContainerId, ContainerMap};
use crate::cre::CreLine;
use crate::error::{Error, Result};
use crate::stimulus::StimulusFamily;

/// Stimulus battery shown during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "three_session_A")]
    A,
    #[serde(rename = "three_session_B")]
    B,
    #[serde(rename = "three_session_C")]
    C,
    #[serde(rename = "three_session_C2")]
    C2,
}

impl SessionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::A => "three_session_A",
            SessionType::B => "three_session_B",
            SessionType::C => "three_session_C",
            SessionType::C2 => "three_session_C2",
        }
    }

    /// Stimulus families whose per-family responsivity is reported for this
    /// session type.
    pub fn stimulus_families(self) -> &'static [StimulusFamily] {
        match self {
            SessionType::A => &[StimulusFamily::DriftingGratings],
            SessionType::B => &[StimulusFamily::NaturalScenes, StimulusFamily::StaticGratings],
            SessionType::C | SessionType::C2 => &[],
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = Error;

    /// Accepts the full name (`three_session_B`) or the short letter (`B`).
    fn from_str(s: &str) -> Result<Self> {
        let short = s.trim().strip_prefix("three_session_").unwrap_or(s.trim());
        match short {
            "A" | "a" => Ok(SessionType::A),
            "B" | "b" => Ok(SessionType::B),
            "C" | "c" => Ok(SessionType::C),
            "C2" | "c2" => Ok(SessionType::C2),
            _ => Err(Error::UnknownSessionType(s.to_string())),
        }
    }
}

/// One row of the experiment listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub experiment_container_id: ContainerId,
    pub session_type: SessionType,
    #[serde(default)]
    pub cre_line: Option<String>,
    #[serde(default)]
    pub targeted_structure: Option<String>,
    #[serde(default)]
    pub imaging_depth: Option<u32>,
}

impl SessionRecord {
    /// Cortical layer targeted by this session's Cre line, if it has one.
    pub fn layer(&self) -> Result<Option<&'static str>> {
        match &self.cre_line {
            Some(name) => Ok(Some(name.parse::<CreLine>()?.layer())),
            None => Ok(None),
        }
    }
}

/// Session type → session id, for one container.
///
/// A type the container was never imaged with is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionIds(BTreeMap<SessionType, SessionId>);

impl SessionIds {
    pub fn get(&self, session_type: SessionType) -> Option<SessionId> {
        self.0.get(&session_type).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SessionType, SessionId)> + '_ {
        self.0.iter().map(|(&t, &id)| (t, id))
    }
}

/// Session ids of every requested container, keyed by container.
///
/// Every container in `containers` is a key, even one the cache knows
/// nothing about (its [`SessionIds`] is then empty).
pub fn resolve_session_ids<C: ObservatoryCache>(
    cache: &C,
    containers: &[ContainerId],
) -> Result<ContainerMap<SessionIds>> {
    let mut ids = ContainerMap::try_build(containers, |_| Ok(SessionIds::default()))?;
    let records = cache.ophys_experiments(containers)?;

    for rec in records {
        let container = rec.experiment_container_id;
        let Some(entry) = ids.get_mut(container) else {
            log::warn!("skipping session {} of unrequested container {container}", rec.id);
            continue;
        };
        if entry.0.insert(rec.session_type, rec.id).is_some() {
            return Err(Error::DuplicateSession {
                container,
                session_type: rec.session_type,
            });
        }
    }

    log::info!("resolved sessions for {} containers", ids.len());
    Ok(ids)
}

/// Full session metadata of one container.
pub fn container_sessions<C: ObservatoryCache>(
    cache: &C,
    container: ContainerId,
) -> Result<Vec<SessionRecord>> {
    let mut records = cache.ophys_experiments(&[container])?;
    records.retain(|r| r.experiment_container_id == container);
    Ok(records)
}

/// Dataset object of the `session_type` session of each container.
///
/// A container without such a session is an error.
pub fn load_datasets<C: ObservatoryCache>(
    cache: &C,
    containers: &[ContainerId],
    session_type: SessionType,
) -> Result<ContainerMap<C::Dataset>> {
    let session_ids = resolve_session_ids(cache, containers)?;
    session_ids.try_map(|container, ids| {
        let session = ids.get(session_type).ok_or(Error::MissingSession {
            container,
            session_type,
        })?;
        log::debug!("loading {session_type} dataset {session} for container {container}");
        cache.experiment_data(session)
    })
}
