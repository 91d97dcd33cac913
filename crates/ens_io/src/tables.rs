//! Typed CSV readers for the reference tables and per-location trajectory files.
//!
//! Columns are matched by header name; extra columns are ignored. Empty cells
//! in optional numeric columns read as `None`.

use std::fmt::Display;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use ens_core::entities::{Location, ObservedPoint, TrajectoryRow};
use ens_core::{LocationId, RunId, ThresholdSet};

use crate::{IoError, IoResult};

// ----------------------------- Row shapes -----------------------------

#[derive(Debug, Deserialize)]
struct LocationRow {
    location: String,
    #[serde(default)]
    location_name: String,
    #[serde(default)]
    abbreviation: String,
    #[serde(default)]
    population: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TargetRow {
    location: String,
    date: NaiveDate,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    weekly_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ThresholdRow {
    location: String,
    p25_rate: f64,
    p50_rate: f64,
    p75_rate: f64,
}

#[derive(Debug, Deserialize)]
struct TrajectoryCsvRow {
    run_id: i64,
    horizon: u32,
    date: NaiveDate,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    fips: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

/// Rows of one `loc_*.csv` file.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryTable {
    /// Location of the file's first row (`fips`, falling back to `location`).
    pub location: Option<LocationId>,
    pub rows: Vec<TrajectoryRow>,
    /// Rows dropped for a missing, negative or non-finite value.
    pub dropped: usize,
}

// ----------------------------- Helpers -----------------------------

fn csv_err(path: &Path, e: impl Display) -> IoError {
    IoError::Csv { path: path.display().to_string(), msg: e.to_string() }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> IoResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec.map_err(|e| csv_err(path, e))?);
    }
    Ok(out)
}

fn parse_location(path: &Path, raw: &str) -> IoResult<LocationId> {
    raw.parse::<LocationId>().map_err(|e| csv_err(path, e))
}

/// Population cells may be written as floats ("1234.0"); negatives and
/// non-finite values read as 0 (no population).
fn population_from_cell(cell: Option<f64>) -> u64 {
    match cell {
        Some(p) if p.is_finite() && p >= 0.0 => p.round() as u64,
        _ => 0,
    }
}

// ----------------------------- Readers -----------------------------

/// `location,location_name,abbreviation,population`
pub fn read_locations(path: &Path) -> IoResult<Vec<Location>> {
    let rows: Vec<LocationRow> = read_rows(path)?;
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        out.push(Location {
            id: parse_location(path, &r.location)?,
            name: r.location_name,
            abbreviation: r.abbreviation,
            population: population_from_cell(r.population),
        });
    }
    log::debug!("read {} location rows from {}", out.len(), path.display());
    Ok(out)
}

/// `location,date,value,weekly_rate` (value and weekly_rate may be empty).
pub fn read_observed(path: &Path) -> IoResult<Vec<ObservedPoint>> {
    let rows: Vec<TargetRow> = read_rows(path)?;
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        out.push(ObservedPoint {
            location: parse_location(path, &r.location)?,
            date: r.date,
            value: r.value.filter(|v| v.is_finite()),
            weekly_rate: r.weekly_rate.filter(|v| v.is_finite()),
        });
    }
    log::debug!("read {} observed rows from {}", out.len(), path.display());
    Ok(out)
}

/// `location,p25_rate,p50_rate,p75_rate`. Monotonicity is checked by the caller.
pub fn read_thresholds(path: &Path) -> IoResult<Vec<(LocationId, ThresholdSet)>> {
    let rows: Vec<ThresholdRow> = read_rows(path)?;
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let set = ThresholdSet { p25: r.p25_rate, p50: r.p50_rate, p75: r.p75_rate };
        out.push((parse_location(path, &r.location)?, set));
    }
    log::debug!("read {} threshold rows from {}", out.len(), path.display());
    Ok(out)
}

/// `run_id,horizon,date,value,fips` (or `location` in place of `fips`).
pub fn read_trajectory_file(path: &Path) -> IoResult<TrajectoryTable> {
    let raw: Vec<TrajectoryCsvRow> = read_rows(path)?;

    let location = match raw.first() {
        Some(first) => match first.fips.as_deref().or(first.location.as_deref()) {
            Some(s) if !s.is_empty() => Some(parse_location(path, s)?),
            _ => None,
        },
        None => None,
    };

    let mut rows = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for r in raw {
        match r.value {
            Some(v) if v.is_finite() && v >= 0.0 => rows.push(TrajectoryRow {
                run_id: RunId(r.run_id),
                horizon: r.horizon,
                date: r.date,
                value: v,
            }),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("{}: dropped {dropped} row(s) without a usable value", path.display());
    }
    Ok(TrajectoryTable { location, rows, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let p = dir.join(name);
        fs::write(&p, body).unwrap();
        p
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn locations_with_float_and_missing_population() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "locations.csv",
            "location,location_name,abbreviation,population\n\
             01,Alabama,AL,5024279.0\n\
             US,United States,US,\n",
        );
        let locs = read_locations(&p).unwrap();
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0].id.as_str(), "01");
        assert_eq!(locs[0].population, 5_024_279);
        assert_eq!(locs[1].population, 0);
    }

    #[test]
    fn observed_empty_cells_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "target_data.csv",
            "location,date,value,weekly_rate\n\
             01,2024-12-28,120,2.39\n\
             01,2025-01-04,,\n",
        );
        let obs = read_observed(&p).unwrap();
        assert_eq!(obs[0].value, Some(120.0));
        assert_eq!(obs[0].weekly_rate, Some(2.39));
        assert_eq!(obs[1].date, d("2025-01-04"));
        assert_eq!(obs[1].value, None);
        assert_eq!(obs[1].weekly_rate, None);
    }

    #[test]
    fn thresholds_read_as_sets() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "historical_thresholds.csv",
            "location,p25_rate,p50_rate,p75_rate\n06,0.4,1.1,2.5\n",
        );
        let t = read_thresholds(&p).unwrap();
        assert_eq!(t[0].0.as_str(), "06");
        assert_eq!(t[0].1, ThresholdSet { p25: 0.4, p50: 1.1, p75: 2.5 });
    }

    #[test]
    fn trajectory_file_extra_columns_and_location_alias() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "loc_06.csv",
            "location_id,run_id,date,value,epiweek,reference_date,horizon,location\n\
             x,3,2025-01-04,10.5,1,2025-01-04,0,06\n\
             x,3,2025-01-11,,2,2025-01-04,1,06\n\
             x,4,2025-01-04,-1,1,2025-01-04,0,06\n",
        );
        let t = read_trajectory_file(&p).unwrap();
        assert_eq!(t.location.as_ref().map(|l| l.as_str()), Some("06"));
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.dropped, 2);
        assert_eq!(t.rows[0].run_id, RunId(3));
        assert_eq!(t.rows[0].value, 10.5);
    }

    #[test]
    fn fips_wins_over_location() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "loc_x.csv",
            "run_id,horizon,date,value,fips,location\n1,0,2025-01-04,1,01,ignored\n",
        );
        let t = read_trajectory_file(&p).unwrap();
        assert_eq!(t.location.unwrap().as_str(), "01");
    }

    #[test]
    fn header_only_file_has_no_location() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(dir.path(), "loc_empty.csv", "run_id,horizon,date,value,fips\n");
        let t = read_trajectory_file(&p).unwrap();
        assert!(t.location.is_none());
        assert!(t.rows.is_empty());
    }

    #[test]
    fn bad_rows_report_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "historical_thresholds.csv",
            "location,p25_rate,p50_rate,p75_rate\n01,abc,1,2\n",
        );
        match read_thresholds(&p) {
            Err(IoError::Csv { path, .. }) => assert!(path.ends_with("historical_thresholds.csv")),
            other => panic!("expected csv error, got {other:?}"),
        }
    }
}
