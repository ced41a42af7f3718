//! Markdown report rendering from a persisted run trace.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::io::trace::RunTrace;

const REPORT_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/report.md"));

#[derive(Debug, Serialize)]
struct RankingRow {
    name: &'static str,
    belief: String,
}

#[derive(Debug, Serialize)]
struct ToolRow {
    name: &'static str,
    outcome: String,
    attempts: u32,
    latency_ms: u64,
}

/// Render the markdown summary for a completed run.
pub fn render_report(trace: &RunTrace) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)
        .expect("report template should be valid");
    let template = env.get_template("report")?;

    let action = &trace.final_state.action;
    let ranking: Vec<RankingRow> = action
        .ranking
        .iter()
        .map(|entry| RankingRow {
            name: entry.hypothesis.display_name(),
            belief: format!("{:.2}", entry.belief),
        })
        .collect();
    let tools: Vec<ToolRow> = trace
        .final_state
        .tool_results
        .values()
        .map(|result| ToolRow {
            name: result.tool.as_str(),
            outcome: if result.ok {
                "ok".to_string()
            } else {
                format!("failed: {}", result.error.as_deref().unwrap_or("unknown"))
            },
            attempts: result.meta.attempts,
            latency_ms: result.meta.latency_ms,
        })
        .collect();

    let rendered = template
        .render(context! {
            asin => &trace.scenario.asin,
            goal => trace.scenario.goal.to_string(),
            run_id => &trace.run_id,
            started_at => &trace.started_at,
            steps => trace.steps,
            stop_reason => &trace.stop_reason,
            primary => action.primary_hypothesis.map(|h| h.display_name()),
            confidence => format!("{:.2}", action.confidence),
            strategy => action.strategy.to_string(),
            risk_level => action.risk_level.to_string(),
            rationale => &action.rationale,
            recommendations => &action.recommendations,
            ranking => ranking,
            tools => tools,
        })
        .context("render report template")?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::decide_action;
    use crate::core::hypothesis::Beliefs;
    use crate::core::types::{Goal, Scenario};
    use crate::io::trace::FinalSnapshot;
    use std::collections::BTreeMap;

    fn trace() -> RunTrace {
        let beliefs = Beliefs::initialize(Goal::ImproveConversion);
        let action = decide_action(&beliefs, 4);
        RunTrace {
            run_id: "20250114_153045".to_string(),
            scenario: Scenario {
                asin: "B0EXAMPLE1".to_string(),
                goal: Goal::ImproveConversion,
                lookback_days: 30,
                notes: None,
            },
            started_at: "2025-01-14T15:30:45Z".to_string(),
            steps: 4,
            stop_reason: Some("max steps".to_string()),
            entries: Vec::new(),
            final_state: FinalSnapshot {
                beliefs,
                tool_results: BTreeMap::new(),
                action,
            },
        }
    }

    #[test]
    fn report_names_the_primary_hypothesis() {
        let report = render_report(&trace()).expect("render");
        assert!(report.starts_with("# Ads Diagnosis Report - B0EXAMPLE1"));
        assert!(report.contains("**Primary hypothesis:** Listing Quality (confidence 0.50)"));
        assert!(report.contains("**Strategy:** targeted_improvement"));
        assert!(report.contains("| Listing Quality | 0.50 |"));
    }

    #[test]
    fn report_lists_recommendations() {
        let report = render_report(&trace()).expect("render");
        assert!(report.contains("- Optimize product title with high-performing keywords"));
    }
}
