//! ens_report/src/lib.rs: Pure wire documents + JSON renderers.
//!
//! Determinism rules:
//! - No filesystem access here. Callers hand in pipeline outputs and write the bytes.
//! - Rounding happens once, while mapping to wire documents.
//! - Maps are ordered; bytes are canonical (sorted keys, compact).

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod render_json;
pub mod structure;

pub use render_json::{render_artifacts, Artifact};
pub use structure::{DashboardDoc, LocationEntry, RecordDoc, TrajectoryFileDoc};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("serialize {artifact}: {msg}")]
    Serialize { artifact: String, msg: String },
    #[error("inconsistent outputs: {0}")]
    Inconsistent(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use assert_json_diff::assert_json_eq;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    use ens_core::entities::Location;
    use ens_core::LocationId;
    use ens_pipeline::forecast::DashboardData;
    use ens_pipeline::trajectories::{ReferenceTrajectories, TrajectoryBundle};
    use ens_pipeline::{PipelineOutputs, RunCounts, ValidationReport};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn id(s: &str) -> LocationId {
        s.parse().unwrap()
    }

    fn outputs() -> PipelineOutputs {
        let mut dash = DashboardData { reference_dates: vec![d("2025-01-04")], data: BTreeMap::new() };
        dash.data.insert(d("2025-01-04"), BTreeMap::new());

        let mut trajectories = BTreeMap::new();
        let mut data = BTreeMap::new();
        data.insert(d("2025-01-04"), ReferenceTrajectories { dates: vec![Some(d("2025-01-04"))], runs: vec![] });
        trajectories.insert(
            id("01"),
            TrajectoryBundle { location: id("01"), reference_dates: vec![d("2025-01-04")], data },
        );

        PipelineOutputs {
            dashboard: dash,
            locations: vec![Location {
                id: id("01"),
                name: "Alabama".into(),
                abbreviation: "AL".into(),
                population: 5_000_000,
            }],
            target_history: BTreeMap::new(),
            season_history: BTreeMap::new(),
            trajectories,
            validation: ValidationReport::default(),
            counts: RunCounts::default(),
            input_digests: BTreeMap::new(),
        }
    }

    fn parse(a: &Artifact) -> Value {
        serde_json::from_slice(&a.bytes).unwrap()
    }

    #[test]
    fn artifact_set_and_order() {
        let arts = render_artifacts(&outputs()).unwrap();
        let paths: Vec<&str> = arts.iter().map(|a| a.rel_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "dashboard_data.json",
                "locations.json",
                "target_data.json",
                "historical_seasons.json",
                "trajectories/01.json",
            ]
        );
    }

    #[test]
    fn documents_match_wire_shape() {
        let arts = render_artifacts(&outputs()).unwrap();
        assert_json_eq!(
            parse(&arts[0]),
            json!({
                "most_recent_reference_date": "2025-01-04",
                "reference_dates": ["2025-01-04"],
                "trend_categories": ["large_decrease", "decrease", "stable", "increase", "large_increase"],
                "activity_categories": ["low", "moderate", "high", "very_high"],
                "data": { "2025-01-04": {} }
            })
        );
        assert_json_eq!(
            parse(&arts[1]),
            json!([{ "fips": "01", "abbreviation": "AL", "name": "Alabama", "population": 5000000 }])
        );
        assert_json_eq!(
            parse(&arts[4]),
            json!({
                "reference_dates": ["2025-01-04"],
                "data": { "2025-01-04": { "dates": ["2025-01-04"], "trajectories": [] } }
            })
        );
    }

    #[test]
    fn rendering_is_byte_stable() {
        let a = render_artifacts(&outputs()).unwrap();
        let b = render_artifacts(&outputs()).unwrap();
        assert_eq!(a, b);
        assert!(!a[0].bytes.ends_with(b"\n"));
    }

    #[test]
    fn mismatched_bundle_key_is_rejected() {
        let mut o = outputs();
        let bundle = o.trajectories.remove(&id("01")).unwrap();
        o.trajectories.insert(id("06"), bundle);
        assert!(matches!(render_artifacts(&o), Err(ReportError::Inconsistent(_))));
    }
}
