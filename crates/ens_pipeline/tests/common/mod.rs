//! Tiny on-disk data directory for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const LOCATIONS: &str = "\
location,location_name,abbreviation,population
US,United States,US,1000000
01,Alabama,AL,1000000
06,California,CA,
72,Puerto Rico,PR,1000
";

pub const TARGET_DATA: &str = "\
location,date,value,weekly_rate
01,2024-12-28,100,10
01,2023-10-07,40,4
72,2024-12-28,5,0.5
";

pub const THRESHOLDS: &str = "\
location,p25_rate,p50_rate,p75_rate
01,5,9,11
";

/// ref 2025-01-04, Alabama: h0 → [S, S, I, D], h1 → [LI, LI, LD, LD].
pub const AL_2025_01_04: &str = "\
run_id,horizon,date,value,fips
1,0,2025-01-04,100,01
1,1,2025-01-11,200,01
2,0,2025-01-04,100,01
2,1,2025-01-11,200,01
3,0,2025-01-04,115,01
3,1,2025-01-11,50,01
4,0,2025-01-04,85,01
4,1,2025-01-11,50,01
";

/// ref 2025-01-11, Alabama: no baseline on 2025-01-04, so 100 cases is a large increase.
pub const AL_2025_01_11: &str = "\
run_id,horizon,date,value,fips
7,0,2025-01-11,100,01
8,0,2025-01-11,100,01
";

pub const CA_2025_01_04: &str = "\
run_id,horizon,date,value,fips
1,0,2025-01-04,10,06
";

pub const PR_2025_01_04: &str = "\
run_id,horizon,date,value,fips
1,0,2025-01-04,10,72
";

fn put(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

/// Write the standard fixture into `root`.
pub fn write_fixture(root: &Path) {
    put(root, "locations.csv", LOCATIONS);
    put(root, "target_data.csv", TARGET_DATA);
    put(root, "historical_thresholds.csv", THRESHOLDS);
    put(root, "trajectories/ref_2025-01-04/loc_01.csv", AL_2025_01_04);
    put(root, "trajectories/ref_2025-01-04/loc_06.csv", CA_2025_01_04);
    put(root, "trajectories/ref_2025-01-04/loc_72.csv", PR_2025_01_04);
    put(root, "trajectories/ref_2025-01-11/loc_01.csv", AL_2025_01_11);
}

pub fn overwrite(root: &Path, rel: &str, body: &str) {
    put(root, rel, body);
}
