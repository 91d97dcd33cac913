//! Observed-history exports: the full series per location and the same
//! series cut into named season windows.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use ens_core::{EngineConfig, LocationId};

use crate::reference::ObservedLookup;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeasonPoint {
    /// 0-based position inside the season.
    pub week: usize,
    pub point: HistoryPoint,
}

pub type TargetHistory = BTreeMap<LocationId, Vec<HistoryPoint>>;
/// Location → season name → points.
pub type SeasonHistory = BTreeMap<LocationId, BTreeMap<String, Vec<SeasonPoint>>>;

fn points_of<'a>(observed: &'a ObservedLookup, id: &'a LocationId) -> impl Iterator<Item = HistoryPoint> + 'a {
    observed.series(id).map(|p| HistoryPoint {
        date: p.date,
        value: p.value,
        rate: p.weekly_rate,
    })
}

/// Date-ordered series for every non-excluded location.
pub fn build_target_history(observed: &ObservedLookup, cfg: &EngineConfig) -> TargetHistory {
    observed
        .locations()
        .filter(|id| !cfg.is_excluded(id))
        .map(|id| (id.clone(), points_of(observed, id).collect()))
        .collect()
}

/// Season windows per location. Seasons without points are omitted; a
/// location with no season points still gets an empty map.
pub fn build_season_history(observed: &ObservedLookup, cfg: &EngineConfig) -> SeasonHistory {
    let mut out = SeasonHistory::new();
    for id in observed.locations().filter(|id| !cfg.is_excluded(id)) {
        let mut seasons = BTreeMap::new();
        for window in &cfg.seasons {
            let points: Vec<SeasonPoint> = points_of(observed, id)
                .filter(|p| window.contains(p.date))
                .enumerate()
                .map(|(week, point)| SeasonPoint { week, point })
                .collect();
            if !points.is_empty() {
                seasons.insert(window.name.clone(), points);
            }
        }
        out.insert(id.clone(), seasons);
    }
    out
}
