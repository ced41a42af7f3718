//! Trace persistence round-trip over a full scripted run.

use std::path::{Path, PathBuf};

use agent::core::types::{Flags, Goal, Scenario, ToolKind};
use agent::io::config::{AgentConfig, ToolConfig};
use agent::io::trace::load_trace;
use agent::report::render_report;
use agent::run::{RunRequest, run_diagnosis};
use agent::sink::NullSink;
use agent::test_support::{ScriptedInvoker, healthy_scenario_payloads, low_impressions_keyword_report};

fn config(trace_dir: &Path) -> AgentConfig {
    AgentConfig {
        trace_dir: trace_dir.to_path_buf(),
        tool: ToolConfig {
            backoff_ms: 0,
            ..ToolConfig::default()
        },
        ..AgentConfig::default()
    }
}

fn request(goal: Goal) -> RunRequest {
    RunRequest {
        scenario: Scenario {
            asin: "B0EXAMPLE1".to_string(),
            goal,
            lookback_days: 30,
            notes: Some("trace me".to_string()),
        },
        scenario_dir: PathBuf::from("mock/test"),
        flags: Flags::default(),
    }
}

#[test]
fn persisted_trace_matches_run_outcome() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut invoker = ScriptedInvoker::new(healthy_scenario_payloads());
    invoker.set(ToolKind::AdsMetrics, Ok(low_impressions_keyword_report()));

    let outcome = run_diagnosis(
        &invoker,
        &request(Goal::IncreaseImpressions),
        &config(temp.path()),
        &mut NullSink,
    )
    .expect("run");

    let trace = load_trace(&outcome.trace_path).expect("load");
    assert_eq!(trace.run_id, outcome.run_id);
    assert_eq!(trace.steps, outcome.steps);
    assert_eq!(trace.final_state.action, outcome.action);
    assert_eq!(trace.scenario.notes.as_deref(), Some("trace me"));

    // The belief log survives persistence: the low-impressions update is
    // attributed to the ads tool with its delta intact.
    let state = trace
        .final_state
        .beliefs
        .get(agent::core::hypothesis::Hypothesis::LowBids)
        .expect("state");
    let update = state.updates.first().expect("update");
    assert_eq!(update.tool, ToolKind::AdsMetrics);
    assert!((update.delta - 0.20).abs() < 1e-9);
    assert!((update.resulting_belief - 0.65).abs() < 1e-9);
}

#[test]
fn report_renders_from_a_persisted_trace() {
    let temp = tempfile::tempdir().expect("tempdir");
    let invoker = ScriptedInvoker::new(healthy_scenario_payloads());

    let outcome = run_diagnosis(
        &invoker,
        &request(Goal::ReduceAcos),
        &config(temp.path()),
        &mut NullSink,
    )
    .expect("run");

    let trace = load_trace(&outcome.trace_path).expect("load");
    let report = render_report(&trace).expect("render");
    assert!(report.contains("# Ads Diagnosis Report - B0EXAMPLE1"));
    assert!(report.contains(&outcome.run_id));
    assert!(report.contains("| ads_metrics | ok |"));
}
