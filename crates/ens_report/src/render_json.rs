//! render_json.rs: every artifact as canonical JSON bytes, keyed by its
//! path relative to the output directory.
//!
//! Canonical bytes (sorted keys, compact) come from `ens_io`; two runs over
//! the same pipeline outputs render identical bytes.

use ens_io::canonical_json::to_canonical_bytes;
use ens_pipeline::PipelineOutputs;

use crate::structure::{
    dashboard_doc, location_entries, seasons_doc, target_data_doc, trajectory_file_doc,
};
use crate::ReportError;

pub const DASHBOARD_FILE: &str = "dashboard_data.json";
pub const LOCATIONS_FILE: &str = "locations.json";
pub const TARGET_DATA_FILE: &str = "target_data.json";
pub const SEASONS_FILE: &str = "historical_seasons.json";
pub const TRAJECTORIES_DIR: &str = "trajectories";

/// One rendered file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Forward-slash path relative to the output directory.
    pub rel_path: String,
    pub bytes: Vec<u8>,
}

fn artifact<T: serde::Serialize>(rel_path: String, doc: &T) -> Result<Artifact, ReportError> {
    let bytes = to_canonical_bytes(doc).map_err(|e| ReportError::Serialize {
        artifact: rel_path.clone(),
        msg: e.to_string(),
    })?;
    Ok(Artifact { rel_path, bytes })
}

/// Render all artifacts in a fixed order: the four top-level documents, then
/// one trajectory file per location in location order.
pub fn render_artifacts(outputs: &PipelineOutputs) -> Result<Vec<Artifact>, ReportError> {
    let mut out = Vec::with_capacity(4 + outputs.trajectories.len());

    out.push(artifact(DASHBOARD_FILE.into(), &dashboard_doc(&outputs.dashboard))?);
    out.push(artifact(LOCATIONS_FILE.into(), &location_entries(&outputs.locations))?);
    out.push(artifact(TARGET_DATA_FILE.into(), &target_data_doc(&outputs.target_history))?);
    out.push(artifact(SEASONS_FILE.into(), &seasons_doc(&outputs.season_history))?);

    for (loc, bundle) in &outputs.trajectories {
        if bundle.location != *loc {
            return Err(ReportError::Inconsistent(format!(
                "trajectory bundle keyed {loc} belongs to {}",
                bundle.location
            )));
        }
        let rel = format!("{TRAJECTORIES_DIR}/{loc}.json");
        out.push(artifact(rel, &trajectory_file_doc(bundle))?);
    }

    Ok(out)
}
