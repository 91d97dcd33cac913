//! Input data-directory discovery.
//!
//! ```text
//! <root>/locations.csv                      required
//! <root>/target_data.csv                    optional (warned when absent)
//! <root>/historical_thresholds.csv          optional (warned when absent)
//! <root>/trajectories/ref_YYYY-MM-DD/loc_*.csv
//! ```
//!
//! Reference directories come back sorted by date, location files sorted by
//! file name. Entries that do not match the naming pattern are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{IoError, IoResult};

pub const LOCATIONS_FILE: &str = "locations.csv";
pub const TARGET_DATA_FILE: &str = "target_data.csv";
pub const THRESHOLDS_FILE: &str = "historical_thresholds.csv";
pub const TRAJECTORIES_DIR: &str = "trajectories";

const REF_DIR_PREFIX: &str = "ref_";
const LOC_FILE_PREFIX: &str = "loc_";
const CSV_EXT: &str = "csv";

/// One `ref_YYYY-MM-DD` directory and the per-location files inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceDir {
    pub reference_date: NaiveDate,
    pub path: PathBuf,
    pub location_files: Vec<PathBuf>,
}

/// Resolved paths of everything the pipeline reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    pub root: PathBuf,
    pub locations: PathBuf,
    pub target_data: Option<PathBuf>,
    pub thresholds: Option<PathBuf>,
    pub reference_dirs: Vec<ReferenceDir>,
}

impl DataLayout {
    pub fn reference_dates(&self) -> Vec<NaiveDate> {
        self.reference_dirs.iter().map(|r| r.reference_date).collect()
    }

    /// Every input file, in a stable order (for hashing).
    pub fn input_files(&self) -> Vec<&Path> {
        let mut out: Vec<&Path> = vec![self.locations.as_path()];
        out.extend(self.target_data.as_deref());
        out.extend(self.thresholds.as_deref());
        for r in &self.reference_dirs {
            out.extend(r.location_files.iter().map(PathBuf::as_path));
        }
        out
    }
}

/// `ref_2025-01-04` → 2025-01-04.
pub fn parse_reference_dir_name(name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix(REF_DIR_PREFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn is_location_file(path: &Path) -> bool {
    let stem_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with(LOC_FILE_PREFIX));
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(CSV_EXT));
    stem_ok && ext_ok && path.is_file()
}

fn optional_file(root: &Path, name: &str) -> Option<PathBuf> {
    let p = root.join(name);
    if p.is_file() {
        Some(p)
    } else {
        log::warn!("{} not found; continuing without it", p.display());
        None
    }
}

fn read_dir_sorted(dir: &Path) -> IoResult<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| IoError::Path(format!("{}: {e}", dir.display())))? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

/// Scan `root` and resolve the input layout.
pub fn scan_data_dir(root: &Path) -> IoResult<DataLayout> {
    if !root.is_dir() {
        return Err(IoError::Layout(format!("data directory not found: {}", root.display())));
    }
    let locations = root.join(LOCATIONS_FILE);
    if !locations.is_file() {
        return Err(IoError::Layout(format!("missing {}", locations.display())));
    }
    let traj_root = root.join(TRAJECTORIES_DIR);
    if !traj_root.is_dir() {
        return Err(IoError::Layout(format!("missing {}/", traj_root.display())));
    }

    let mut reference_dirs = Vec::new();
    for path in read_dir_sorted(&traj_root)? {
        if !path.is_dir() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let Some(reference_date) = parse_reference_dir_name(name) else {
            log::debug!("skipping {}: not a ref_YYYY-MM-DD directory", path.display());
            continue;
        };
        let location_files: Vec<PathBuf> = read_dir_sorted(&path)?
            .into_iter()
            .filter(|p| is_location_file(p))
            .collect();
        reference_dirs.push(ReferenceDir { reference_date, path, location_files });
    }
    reference_dirs.sort_by_key(|r| r.reference_date);

    log::info!(
        "found {} reference date(s) under {}",
        reference_dirs.len(),
        traj_root.display()
    );

    Ok(DataLayout {
        root: root.to_path_buf(),
        locations,
        target_data: optional_file(root, TARGET_DATA_FILE),
        thresholds: optional_file(root, THRESHOLDS_FILE),
        reference_dirs,
    })
}
