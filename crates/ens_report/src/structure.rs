//! crates/ens_report/src/structure.rs
//! Wire documents + mappers from pipeline outputs.
//! No I/O, no recomputation. Rounding is applied here and nowhere else.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use ens_core::entities::Location;
use ens_core::rounding::{places, round_dp, round_opt};
use ens_core::{ActivityCategory, Axis, LocationId, TrendCategory};
use ens_pipeline::forecast::ForecastRecord;
use ens_pipeline::history::HistoryPoint;
use ens_pipeline::trajectories::{ReferenceTrajectories, SampledRun};
use ens_pipeline::{DashboardData, SeasonHistory, TargetHistory, TrajectoryBundle};

// -------------------- dashboard_data.json --------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordDoc {
    pub trend_probs: BTreeMap<&'static str, f64>,
    pub activity_probs: BTreeMap<&'static str, f64>,
    pub trend_most_likely: TrendCategory,
    pub trend_lower: TrendCategory,
    pub trend_upper: TrendCategory,
    pub activity_most_likely: ActivityCategory,
    pub activity_lower: ActivityCategory,
    pub activity_upper: ActivityCategory,
    pub forecast_date: NaiveDate,
    pub median_value: f64,
    pub median_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardDoc {
    pub most_recent_reference_date: Option<NaiveDate>,
    pub reference_dates: Vec<NaiveDate>,
    pub trend_categories: Vec<&'static str>,
    pub activity_categories: Vec<&'static str>,
    /// ref date → location → horizon (as string) → record.
    pub data: BTreeMap<NaiveDate, BTreeMap<LocationId, BTreeMap<String, RecordDoc>>>,
}

// -------------------- locations / history --------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocationEntry {
    pub fips: LocationId,
    pub abbreviation: String,
    pub name: String,
    pub population: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetPointDoc {
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonPointDoc {
    pub week: usize,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub rate: Option<f64>,
}

pub type TargetDataDoc = BTreeMap<LocationId, Vec<TargetPointDoc>>;
pub type SeasonsDoc = BTreeMap<LocationId, BTreeMap<String, Vec<SeasonPointDoc>>>;

// -------------------- trajectories/<fips>.json --------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectoryDoc {
    pub run_id: i64,
    pub values: Vec<f64>,
    /// "h0".."h4" → trend token.
    pub trends: BTreeMap<String, TrendCategory>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceTrajectoriesDoc {
    /// Calendar date per horizon; "" where the first run skips a horizon.
    pub dates: Vec<String>,
    pub trajectories: Vec<TrajectoryDoc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectoryFileDoc {
    pub reference_dates: Vec<NaiveDate>,
    pub data: BTreeMap<NaiveDate, ReferenceTrajectoriesDoc>,
}

// -------------------- mappers --------------------

/// Token → probability, every axis category present.
fn prob_map<C: Axis>(pairs: impl Iterator<Item = (C, f64)>) -> BTreeMap<&'static str, f64> {
    pairs.map(|(c, p)| (c.as_str(), round_dp(p, places::PROBABILITY))).collect()
}

pub fn record_doc(r: &ForecastRecord) -> RecordDoc {
    RecordDoc {
        trend_probs: prob_map(r.trend.iter()),
        activity_probs: prob_map(r.activity.iter()),
        trend_most_likely: r.trend_most_likely,
        trend_lower: r.trend_bands.lower,
        trend_upper: r.trend_bands.upper,
        activity_most_likely: r.activity_most_likely,
        activity_lower: r.activity_bands.lower,
        activity_upper: r.activity_bands.upper,
        forecast_date: r.forecast_date,
        median_value: round_dp(r.median_value, places::VALUE),
        median_rate: round_dp(r.median_rate, places::RATE),
    }
}

pub fn dashboard_doc(d: &DashboardData) -> DashboardDoc {
    let data = d
        .data
        .iter()
        .map(|(reference_date, per_loc)| {
            let locs = per_loc
                .iter()
                .map(|(loc, horizons)| {
                    let hs = horizons.iter().map(|(h, r)| (h.to_string(), record_doc(r))).collect();
                    (loc.clone(), hs)
                })
                .collect();
            (*reference_date, locs)
        })
        .collect();

    DashboardDoc {
        most_recent_reference_date: d.most_recent_reference_date(),
        reference_dates: d.reference_dates.clone(),
        trend_categories: TrendCategory::labels(),
        activity_categories: ActivityCategory::labels(),
        data,
    }
}

pub fn location_entries(locations: &[Location]) -> Vec<LocationEntry> {
    locations
        .iter()
        .map(|l| LocationEntry {
            fips: l.id.clone(),
            abbreviation: l.abbreviation.clone(),
            name: l.name.clone(),
            population: l.population,
        })
        .collect()
}

fn target_point(p: &HistoryPoint) -> TargetPointDoc {
    TargetPointDoc {
        date: p.date,
        value: round_opt(p.value, places::VALUE),
        rate: round_opt(p.rate, places::HISTORY_RATE),
    }
}

pub fn target_data_doc(h: &TargetHistory) -> TargetDataDoc {
    h.iter()
        .map(|(loc, pts)| (loc.clone(), pts.iter().map(target_point).collect()))
        .collect()
}

pub fn seasons_doc(s: &SeasonHistory) -> SeasonsDoc {
    s.iter()
        .map(|(loc, seasons)| {
            let by_name = seasons
                .iter()
                .map(|(name, pts)| {
                    let docs = pts
                        .iter()
                        .map(|sp| {
                            let t = target_point(&sp.point);
                            SeasonPointDoc { week: sp.week, date: t.date, value: t.value, rate: t.rate }
                        })
                        .collect();
                    (name.clone(), docs)
                })
                .collect();
            (loc.clone(), by_name)
        })
        .collect()
}

fn trajectory_doc(run: &SampledRun) -> TrajectoryDoc {
    TrajectoryDoc {
        run_id: run.run_id.get(),
        values: run.values.iter().map(|v| round_dp(*v, places::VALUE)).collect(),
        trends: run.trends.iter().map(|(h, t)| (format!("h{h}"), *t)).collect(),
    }
}

fn reference_doc(r: &ReferenceTrajectories) -> ReferenceTrajectoriesDoc {
    ReferenceTrajectoriesDoc {
        dates: r
            .dates
            .iter()
            .map(|d| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default())
            .collect(),
        trajectories: r.runs.iter().map(trajectory_doc).collect(),
    }
}

pub fn trajectory_file_doc(b: &TrajectoryBundle) -> TrajectoryFileDoc {
    TrajectoryFileDoc {
        reference_dates: b.reference_dates.clone(),
        data: b.data.iter().map(|(d, r)| (*d, reference_doc(r))).collect(),
    }
}
