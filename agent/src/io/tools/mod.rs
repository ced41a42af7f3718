//! File-backed diagnostic tools.
//!
//! Each tool parses one JSON data file from the scenario directory and
//! computes derived domain metrics. Tools honor the scenario break flags by
//! reporting a simulated missing-data condition, which exercises the same
//! path as a genuinely absent file.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::types::{AdsMode, ToolData, ToolKind};
use crate::io::invoker::{InvokeRequest, ToolError};

pub mod ads_metrics;
pub mod competitor;
pub mod inventory;
pub mod listing_audit;

/// The scenario data file a tool reads.
pub fn data_file(tool: ToolKind, mode: AdsMode) -> &'static str {
    match tool {
        ToolKind::AdsMetrics => match mode {
            AdsMode::Keyword => "ads_keywords.json",
            AdsMode::Campaign => "ads_campaign.json",
        },
        ToolKind::Competitor => "competitor.json",
        ToolKind::ListingAudit => "listing_audit.json",
        ToolKind::Inventory => "inventory.json",
    }
}

/// Dispatch a request to the matching tool.
pub fn run_tool(request: &InvokeRequest) -> Result<ToolData, ToolError> {
    if request.flags.breaks(request.tool) {
        return Err(ToolError::MissingData(format!(
            "Simulated {} data unavailable (test mode)",
            request.tool
        )));
    }
    debug!(tool = %request.tool, dir = %request.scenario_dir.display(), "running tool");
    match request.tool {
        ToolKind::AdsMetrics => ads_metrics::run(&request.scenario_dir, request.ads_mode),
        ToolKind::Competitor => competitor::run(&request.scenario_dir),
        ToolKind::ListingAudit => listing_audit::run(&request.scenario_dir),
        ToolKind::Inventory => inventory::run(&request.scenario_dir),
    }
}

/// Read and parse one JSON data file, classifying absence distinctly.
pub(crate) fn read_data_file<T: DeserializeOwned>(path: &Path) -> Result<T, ToolError> {
    if !path.exists() {
        return Err(ToolError::MissingData(format!(
            "data file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|err| ToolError::Failed(format!("read {}: {err}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|err| ToolError::Failed(format!("parse {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Flags;
    use std::path::PathBuf;

    #[test]
    fn break_flag_reports_simulated_missing_data() {
        let request = InvokeRequest {
            tool: ToolKind::Competitor,
            scenario_dir: PathBuf::from("/nonexistent"),
            flags: Flags {
                break_competitor: true,
                ..Flags::default()
            },
            ads_mode: AdsMode::Keyword,
        };
        let err = run_tool(&request).expect_err("should fail");
        assert!(matches!(err, ToolError::MissingData(_)));
        assert!(err.to_string().contains("Simulated competitor"));
    }

    #[test]
    fn missing_file_is_distinct_from_parse_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing: Result<serde_json::Value, ToolError> =
            read_data_file(&temp.path().join("absent.json"));
        assert!(matches!(missing, Err(ToolError::MissingData(_))));

        let garbled = temp.path().join("garbled.json");
        std::fs::write(&garbled, "{not json").expect("write");
        let parsed: Result<serde_json::Value, ToolError> = read_data_file(&garbled);
        assert!(matches!(parsed, Err(ToolError::Failed(_))));
    }
}
