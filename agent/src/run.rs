//! The diagnosis loop: observe, update beliefs, pick the next tool, stop,
//! and synthesize the final action plan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::core::action::{ActionPlan, decide_action};
use crate::core::evidence::extract_evidence;
use crate::core::fallback::recommend_fallback;
use crate::core::selection::select_next_tool;
use crate::core::stopping::{MAX_STEPS, MIN_STEPS, StopReason, should_stop};
use crate::core::types::{Flags, Scenario, ToolKind};
use crate::io::config::AgentConfig;
use crate::io::invoker::{InvokeRequest, Invoker, invoke_with_policy};
use crate::io::trace::{FinalSnapshot, RunTrace, TraceEvent, new_run_id, save_trace};
use crate::memory::WorkingMemory;
use crate::sink::EventSink;

/// Inputs for one diagnosis run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub scenario: Scenario,
    /// Directory holding the scenario's tool data files.
    pub scenario_dir: PathBuf,
    pub flags: Flags,
}

/// Result of one diagnosis run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    /// Steps entered (the last one may have stopped without a tool call).
    pub steps: u32,
    pub stop_reason: Option<StopReason>,
    pub action: ActionPlan,
    pub trace_path: PathBuf,
}

/// Execute the full loop and persist the trace.
///
/// Tool failures never abort the run: the failed tool is marked used, a
/// fallback advisory is recorded, and the loop moves on. Only infrastructure
/// failures (trace persistence) surface as errors.
pub fn run_diagnosis<I: Invoker, S: EventSink>(
    invoker: &I,
    request: &RunRequest,
    config: &AgentConfig,
    sink: &mut S,
) -> Result<RunOutcome> {
    let started_at = Utc::now();
    let run_id = new_run_id(started_at);
    let policy = config.retry_policy();

    let mut memory = WorkingMemory::new(
        request.scenario.clone(),
        request.scenario_dir.clone(),
        request.flags,
    );
    info!(run_id = %run_id, asin = %memory.scenario.asin, goal = %memory.scenario.goal, "run started");

    memory.record_event(
        now(),
        TraceEvent::Initialization {
            goal: memory.scenario.goal,
            beliefs: memory.belief_snapshot(),
        },
    );
    sink.run_started(&memory.scenario, &memory.beliefs);

    let mut stop_reason = None;
    while memory.step < MAX_STEPS {
        memory.advance_step();
        sink.step_started(memory.step, &memory.beliefs);

        // Side-effect-free snapshot of what the loop knows going into the
        // step, before any stop or selection decisions.
        let top = memory.beliefs.top();
        memory.record_event(
            now(),
            TraceEvent::Observe {
                goal: memory.scenario.goal,
                used_tools: memory.used_tools.iter().copied().collect(),
                top_hypothesis: top.map(|(hypothesis, _)| hypothesis),
                top_belief: top.map_or(0.0, |(_, belief)| belief),
            },
        );

        // Stop signals are only honored once the minimum step count is
        // reached, so early high confidence still gets corroborated.
        if memory.step >= MIN_STEPS
            && let Some(reason) = should_stop(&memory.beliefs, memory.step, &memory.used_tools)
        {
            record_stop(&mut memory, sink, &reason);
            stop_reason = Some(reason);
            break;
        }

        let Some(tool) = select_next_tool(&memory.beliefs, &memory.used_tools) else {
            let reason = StopReason::NoInformativeTools;
            record_stop(&mut memory, sink, &reason);
            stop_reason = Some(reason);
            break;
        };

        let reasoning = explain_tool_choice(tool, &memory);
        sink.tool_selected(memory.step, tool, &reasoning);
        memory.record_event(now(), TraceEvent::Decision { tool });

        let result = invoke_with_policy(
            invoker,
            &InvokeRequest {
                tool,
                scenario_dir: memory.scenario_dir.clone(),
                flags: memory.flags,
                ads_mode: config.ads_mode,
            },
            &policy,
        );
        sink.tool_finished(&result);

        let evidence = extract_evidence(&result);
        memory.record_event(
            now(),
            TraceEvent::Action {
                result: result.clone(),
            },
        );
        let failed = !result.ok;
        memory.record_result(result);

        if failed {
            let suggestion = recommend_fallback(tool, &memory.used_tools);
            sink.fallback_suggested(tool, &suggestion);
            memory.record_event(
                now(),
                TraceEvent::Fallback {
                    tool,
                    recommendation: suggestion,
                },
            );
            continue;
        }

        memory.beliefs.apply(&evidence);
        debug!(step = memory.step, tool = %tool, evidence = evidence.len(), "beliefs updated");
        sink.beliefs_updated(&evidence, &memory.beliefs);
        memory.record_event(
            now(),
            TraceEvent::Update {
                beliefs: memory.belief_snapshot(),
            },
        );
    }

    let action = decide_action(&memory.beliefs, config.rationale_depth);
    sink.finished(&action);
    memory.record_event(
        now(),
        TraceEvent::FinalAction {
            strategy: action.strategy.to_string(),
            confidence: action.confidence,
        },
    );

    let trace = RunTrace {
        run_id: run_id.clone(),
        scenario: memory.scenario.clone(),
        started_at: started_at.to_rfc3339(),
        steps: memory.step,
        stop_reason: stop_reason.as_ref().map(ToString::to_string),
        entries: memory.entries,
        final_state: FinalSnapshot {
            beliefs: memory.beliefs,
            tool_results: memory.tool_results,
            action: action.clone(),
        },
    };
    let trace_path = save_trace(&config.trace_dir, &trace)
        .with_context(|| format!("persist trace for run {run_id}"))?;
    info!(run_id = %run_id, steps = trace.steps, strategy = %action.strategy, "run finished");

    Ok(RunOutcome {
        run_id,
        steps: trace.steps,
        stop_reason,
        action,
        trace_path,
    })
}

fn record_stop<S: EventSink>(memory: &mut WorkingMemory, sink: &mut S, reason: &StopReason) {
    sink.stopped(reason);
    memory.record_event(now(), RunTrace::stop_event(reason));
}

/// Why the selected tool is worth firing, phrased against the leading
/// hypothesis.
fn explain_tool_choice(tool: ToolKind, memory: &WorkingMemory) -> String {
    let Some((top, belief)) = memory.beliefs.top() else {
        return format!("Selected {tool} for further investigation");
    };
    let name = top.display_name();
    match tool {
        ToolKind::AdsMetrics => {
            format!("Analyzing advertising data to investigate {name} (belief: {belief:.2})")
        }
        ToolKind::Competitor => {
            format!("Checking competitive landscape for {name} (belief: {belief:.2})")
        }
        ToolKind::ListingAudit => {
            format!("Auditing listing quality related to {name} (belief: {belief:.2})")
        }
        ToolKind::Inventory => {
            format!("Verifying inventory status impact on {name} (belief: {belief:.2})")
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hypothesis::Hypothesis;
    use crate::core::types::Goal;
    use crate::sink::NullSink;
    use crate::test_support::{
        ScriptedInvoker, healthy_scenario_payloads, low_impressions_keyword_report,
        scarce_inventory_report,
    };

    fn request(goal: Goal) -> RunRequest {
        RunRequest {
            scenario: Scenario {
                asin: "B0EXAMPLE1".to_string(),
                goal,
                lookback_days: 30,
                notes: None,
            },
            scenario_dir: PathBuf::from("mock/test"),
            flags: Flags::default(),
        }
    }

    fn config(trace_dir: &std::path::Path) -> AgentConfig {
        AgentConfig {
            trace_dir: trace_dir.to_path_buf(),
            tool: crate::io::config::ToolConfig {
                backoff_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn low_impressions_run_converges_on_low_bids() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut invoker = ScriptedInvoker::new(healthy_scenario_payloads());
        invoker.set(
            ToolKind::AdsMetrics,
            Ok(low_impressions_keyword_report()),
        );

        let outcome = run_diagnosis(
            &invoker,
            &request(Goal::IncreaseImpressions),
            &config(temp.path()),
            &mut NullSink,
        )
        .expect("run");

        // LowBids starts at 0.45; strong low-impressions evidence lands it
        // on 0.65 and no later tool knocks it down.
        assert_eq!(outcome.action.primary_hypothesis, Some(Hypothesis::LowBids));
        assert!(outcome.steps >= MIN_STEPS);
        assert!(outcome.steps <= MAX_STEPS);
        assert!(outcome.trace_path.is_file());
    }

    #[test]
    fn broken_tool_is_marked_used_and_run_still_finishes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let invoker = ScriptedInvoker::failing_for(ToolKind::AdsMetrics);

        let mut run_request = request(Goal::ReduceAcos);
        run_request.flags.break_ads = true;

        let outcome = run_diagnosis(
            &invoker,
            &run_request,
            &config(temp.path()),
            &mut NullSink,
        )
        .expect("run");

        // The failure must not abort the run or produce belief updates from
        // the broken tool.
        let trace = crate::io::trace::load_trace(&outcome.trace_path).expect("load");
        let ads = &trace.final_state.tool_results[&ToolKind::AdsMetrics];
        assert!(!ads.ok);
        let state = trace
            .final_state
            .beliefs
            .get(Hypothesis::BroadMatchWaste)
            .expect("state");
        assert!(state.updates.iter().all(|u| u.tool != ToolKind::AdsMetrics));
    }

    #[test]
    fn configured_rationale_depth_caps_the_update_trail() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut invoker = ScriptedInvoker::new(healthy_scenario_payloads());
        invoker.set(ToolKind::AdsMetrics, Ok(low_impressions_keyword_report()));
        invoker.set(ToolKind::Inventory, Ok(scarce_inventory_report()));

        let config = AgentConfig {
            rationale_depth: 1,
            ..config(temp.path())
        };
        let outcome = run_diagnosis(
            &invoker,
            &request(Goal::IncreaseImpressions),
            &config,
            &mut NullSink,
        )
        .expect("run");

        // LowBids accrues two updates (strong ads, weak inventory); a depth
        // of 1 keeps only the latest in the rendered rationale.
        assert_eq!(outcome.action.primary_hypothesis, Some(Hypothesis::LowBids));
        assert_eq!(outcome.action.rationale.matches("[Updated by").count(), 1);
        assert!(outcome.action.rationale.contains("[Updated by inventory:"));
    }

    #[test]
    fn stop_reason_is_recorded_in_the_trace() {
        let temp = tempfile::tempdir().expect("tempdir");
        let invoker = ScriptedInvoker::new(healthy_scenario_payloads());

        let outcome = run_diagnosis(
            &invoker,
            &request(Goal::ReduceAcos),
            &config(temp.path()),
            &mut NullSink,
        )
        .expect("run");

        let trace = crate::io::trace::load_trace(&outcome.trace_path).expect("load");
        assert_eq!(
            trace.stop_reason,
            outcome.stop_reason.as_ref().map(ToString::to_string)
        );
    }
}
