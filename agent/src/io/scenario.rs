//! Scenario load helpers with schema validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;

use crate::core::types::Scenario;

/// Embedded schema for `scenario.json`.
pub const SCENARIO_SCHEMA: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/scenario.schema.json"));

/// Load and validate a scenario file (schema first, then deserialize).
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read scenario {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse scenario {}", path.display()))?;
    validate_schema(&value)
        .with_context(|| format!("validate scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_value(value)
        .with_context(|| format!("deserialize scenario {}", path.display()))?;
    Ok(scenario)
}

fn validate_schema(scenario: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(SCENARIO_SCHEMA).context("parse embedded scenario schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(scenario) {
        let messages = compiled
            .iter_errors(scenario)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "scenario schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Goal;

    #[test]
    fn valid_scenario_loads() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scenario.json");
        fs::write(
            &path,
            r#"{"asin": "B0EXAMPLE1", "goal": "reduce_acos", "lookback_days": 30, "notes": "spend is up"}"#,
        )
        .expect("write");

        let scenario = load_scenario(&path).expect("load");
        assert_eq!(scenario.asin, "B0EXAMPLE1");
        assert_eq!(scenario.goal, Goal::ReduceAcos);
        assert_eq!(scenario.lookback_days, 30);
        assert_eq!(scenario.notes.as_deref(), Some("spend is up"));
    }

    #[test]
    fn unknown_goal_is_rejected_by_schema() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scenario.json");
        fs::write(
            &path,
            r#"{"asin": "B0EXAMPLE1", "goal": "make_money", "lookback_days": 30}"#,
        )
        .expect("write");

        let err = load_scenario(&path).expect_err("should fail");
        assert!(format!("{err:#}").contains("schema validation failed"));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scenario.json");
        fs::write(&path, r#"{"asin": "B0EXAMPLE1", "goal": "reduce_acos"}"#).expect("write");

        assert!(load_scenario(&path).is_err());
    }

    #[test]
    fn unexpected_fields_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scenario.json");
        fs::write(
            &path,
            r#"{"asin": "B0EXAMPLE1", "goal": "reduce_acos", "lookback_days": 30, "budget": 100}"#,
        )
        .expect("write");

        assert!(load_scenario(&path).is_err());
    }
}
