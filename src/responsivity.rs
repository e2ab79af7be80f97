//! Responsivity classification of cell specimens.
//!
//! For each stimulus family a cell is *family non-responsive* when
//!
//! ```text
//! p_<fam> > p_value_max  OR  peak_dff_<fam> < min_peak_dff
//! ```
//!
//! and *non-responsive* overall when that holds for drifting gratings, static
//! gratings and natural scenes, and additionally `rf_chi2_lsn > rf_chi2_max`.
//!
//! The per-family sets reported for a session type exclude cells that are
//! already non-responsive overall, so the family sets and the overall set are
//! disjoint.  Whether the family sets should also list the overall
//! non-responsive cells is still open; flip the `continue` in
//! [`classify_cells`] if they should.
//!
//! Missing statistics compare like NaN: a missing value satisfies neither
//! `>` nor `<`.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::{CellSpecimenId, ObservatoryCache};
use crate::config::ResponsivityConfig;
use crate::container::{ContainerId, ContainerMap};
use crate::error::Result;
use crate::session::SessionType;
use crate::stimulus::StimulusFamily;

/// One row of the cell-specimen table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpecimen {
    pub cell_specimen_id: CellSpecimenId,
    pub experiment_container_id: ContainerId,
    #[serde(default)]
    pub p_dg: Option<f64>,
    #[serde(default)]
    pub peak_dff_dg: Option<f64>,
    #[serde(default)]
    pub p_sg: Option<f64>,
    #[serde(default)]
    pub peak_dff_sg: Option<f64>,
    #[serde(default)]
    pub p_ns: Option<f64>,
    #[serde(default)]
    pub peak_dff_ns: Option<f64>,
    #[serde(default)]
    pub rf_chi2_lsn: Option<f64>,
}

impl CellSpecimen {
    /// `(p-value, peak dF/F)` for one family.
    pub fn family_stats(&self, family: StimulusFamily) -> (Option<f64>, Option<f64>) {
        match family {
            StimulusFamily::DriftingGratings => (self.p_dg, self.peak_dff_dg),
            StimulusFamily::StaticGratings => (self.p_sg, self.peak_dff_sg),
            StimulusFamily::NaturalScenes => (self.p_ns, self.peak_dff_ns),
        }
    }
}

impl ResponsivityConfig {
    pub fn is_family_non_responsive(&self, cell: &CellSpecimen, family: StimulusFamily) -> bool {
        let (p, peak) = cell.family_stats(family);
        p.is_some_and(|p| p > self.p_value_max) || peak.is_some_and(|x| x < self.min_peak_dff)
    }

    pub fn is_non_responsive(&self, cell: &CellSpecimen) -> bool {
        StimulusFamily::ALL
            .iter()
            .all(|&fam| self.is_family_non_responsive(cell, fam))
            && cell.rf_chi2_lsn.is_some_and(|chi2| chi2 > self.rf_chi2_max)
    }
}

/// Responsivity category a cell list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCategory {
    /// Non-responsive to every family and without a receptive field.
    NonResponsive,
    /// Every cell of the container.
    All,
    DgNonResponsive,
    SgNonResponsive,
    NsNonResponsive,
}

impl ResponseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseCategory::NonResponsive => "non_responsive",
            ResponseCategory::All => "all",
            ResponseCategory::DgNonResponsive => "dg_non_responsive",
            ResponseCategory::SgNonResponsive => "sg_non_responsive",
            ResponseCategory::NsNonResponsive => "ns_non_responsive",
        }
    }

    pub fn for_family(family: StimulusFamily) -> Self {
        match family {
            StimulusFamily::DriftingGratings => ResponseCategory::DgNonResponsive,
            StimulusFamily::StaticGratings => ResponseCategory::SgNonResponsive,
            StimulusFamily::NaturalScenes => ResponseCategory::NsNonResponsive,
        }
    }

    /// Categories reported for a session type.
    pub fn for_session(session_type: SessionType) -> Vec<Self> {
        let mut out = vec![ResponseCategory::NonResponsive, ResponseCategory::All];
        out.extend(
            session_type
                .stimulus_families()
                .iter()
                .map(|&f| ResponseCategory::for_family(f)),
        );
        out
    }
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category → (container → cell specimen ids).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CellCategories(BTreeMap<ResponseCategory, ContainerMap<Vec<CellSpecimenId>>>);

impl CellCategories {
    pub fn get(&self, category: ResponseCategory) -> Option<&ContainerMap<Vec<CellSpecimenId>>> {
        self.0.get(&category)
    }

    /// Cells of one category in one container.
    pub fn cells(&self, category: ResponseCategory, container: ContainerId) -> Option<&[CellSpecimenId]> {
        self.0.get(&category)?.get(container).map(Vec::as_slice)
    }

    pub fn categories(&self) -> Vec<ResponseCategory> {
        self.0.keys().copied().collect()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&ResponseCategory, &ContainerMap<Vec<CellSpecimenId>>)> {
        self.0.iter()
    }
}

/// Classify the cells of one container into the categories of `session_type`.
pub fn classify_cells<'a, I>(
    cells: I,
    session_type: SessionType,
    cfg: &ResponsivityConfig,
) -> BTreeMap<ResponseCategory, Vec<CellSpecimenId>>
where
    I: IntoIterator<Item = &'a CellSpecimen>,
{
    let mut out: BTreeMap<ResponseCategory, Vec<CellSpecimenId>> = ResponseCategory::for_session(session_type)
        .into_iter()
        .map(|c| (c, Vec::new()))
        .collect();
    let families = session_type.stimulus_families();

    for cell in cells {
        let id = cell.cell_specimen_id;
        if let Some(all) = out.get_mut(&ResponseCategory::All) {
            all.push(id);
        }
        if cfg.is_non_responsive(cell) {
            if let Some(nor) = out.get_mut(&ResponseCategory::NonResponsive) {
                nor.push(id);
            }
            continue;
        }
        for &fam in families {
            if cfg.is_family_non_responsive(cell, fam) {
                if let Some(list) = out.get_mut(&ResponseCategory::for_family(fam)) {
                    list.push(id);
                }
            }
        }
    }
    out
}

/// Responsivity categories of every container in `containers`.
///
/// `specimens` is the full cell table; rows of other containers are ignored.
/// Every category holds an entry for every container, possibly empty.
pub fn classify_responsivity(
    containers: &[ContainerId],
    specimens: &[CellSpecimen],
    session_type: SessionType,
    cfg: &ResponsivityConfig,
) -> Result<CellCategories> {
    let per_container = ContainerMap::try_build(containers, |container| {
        let rows = specimens
            .iter()
            .filter(|c| c.experiment_container_id == container);
        let classes = classify_cells(rows, session_type, cfg);
        log::debug!(
            "container {container}: {} cells, {} non-responsive",
            classes[&ResponseCategory::All].len(),
            classes[&ResponseCategory::NonResponsive].len()
        );
        Ok(classes)
    })?;

    let mut out = BTreeMap::new();
    for category in ResponseCategory::for_session(session_type) {
        let by_container = per_container.try_map(|_, classes| {
            Ok(classes.get(&category).cloned().unwrap_or_default())
        })?;
        out.insert(category, by_container);
    }
    log::info!("classified {} containers for {session_type}", per_container.len());
    Ok(CellCategories(out))
}

/// Classify using the cell table served by `cache`.
pub fn responsivity_status<C: ObservatoryCache>(
    cache: &C,
    containers: &[ContainerId],
    session_type: SessionType,
    cfg: &ResponsivityConfig,
) -> Result<CellCategories> {
    let specimens = cache.cell_specimens()?;
    classify_responsivity(containers, &specimens, session_type, cfg)
}
