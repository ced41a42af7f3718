//! Run trace persistence.
//!
//! Each run appends typed events to an in-memory trace and writes the whole
//! thing to `<trace_dir>/trace_<run_id>.json` once the final action is
//! decided. The trace is lossless: loading it back yields the same beliefs,
//! tool results, and action plan the run ended with.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::action::ActionPlan;
use crate::core::hypothesis::{Beliefs, Hypothesis};
use crate::core::stopping::StopReason;
use crate::core::types::{Goal, Scenario, ToolKind, ToolResult};

/// One timestamped event in the run trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Step the event belongs to; 0 for pre-loop events.
    pub step: u32,
    #[serde(flatten)]
    pub event: TraceEvent,
}

/// The typed event vocabulary of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Priors established from the scenario goal.
    Initialization {
        goal: Goal,
        beliefs: BTreeMap<Hypothesis, f64>,
    },
    /// Context snapshot taken at the start of each step, before any
    /// side effects: what the loop knows going in.
    Observe {
        goal: Goal,
        used_tools: Vec<ToolKind>,
        top_hypothesis: Option<Hypothesis>,
        top_belief: f64,
    },
    /// A tool was selected for the step.
    Decision { tool: ToolKind },
    /// A tool completed (successfully or not), with its full result.
    Action { result: ToolResult },
    /// A tool failed and a fallback was recommended.
    Fallback {
        tool: ToolKind,
        recommendation: String,
    },
    /// Beliefs after applying a step's evidence.
    Update {
        beliefs: BTreeMap<Hypothesis, f64>,
    },
    /// The loop decided to stop.
    Stop { reason: String },
    /// The final action plan was synthesized.
    FinalAction {
        strategy: String,
        confidence: f64,
    },
}

/// End-of-run snapshot, sufficient to replay reporting without the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSnapshot {
    pub beliefs: Beliefs,
    pub tool_results: BTreeMap<ToolKind, ToolResult>,
    pub action: ActionPlan,
}

/// Complete persisted record of one diagnosis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTrace {
    pub run_id: String,
    pub scenario: Scenario,
    /// RFC 3339 timestamp of run start.
    pub started_at: String,
    /// Steps executed (tool invocations, including failed ones).
    pub steps: u32,
    pub stop_reason: Option<String>,
    pub entries: Vec<TraceEntry>,
    #[serde(rename = "final")]
    pub final_state: FinalSnapshot,
}

impl RunTrace {
    /// Convenience for trace events derived from a stop decision.
    pub fn stop_event(reason: &StopReason) -> TraceEvent {
        TraceEvent::Stop {
            reason: reason.to_string(),
        }
    }
}

/// Run identifier derived from the start time, e.g. `20250114_153045`.
pub fn new_run_id(started_at: DateTime<Utc>) -> String {
    started_at.format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the trace file for a run.
pub fn trace_path(trace_dir: &Path, run_id: &str) -> PathBuf {
    trace_dir.join(format!("trace_{run_id}.json"))
}

/// Atomically write the trace to disk (temp file + rename).
pub fn save_trace(trace_dir: &Path, trace: &RunTrace) -> Result<PathBuf> {
    let path = trace_path(trace_dir, &trace.run_id);
    debug!(path = %path.display(), steps = trace.steps, "writing run trace");
    let mut buf = serde_json::to_string_pretty(trace)?;
    buf.push('\n');
    fs::create_dir_all(trace_dir)
        .with_context(|| format!("create trace directory {}", trace_dir.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp trace {}", tmp_path.display()))?;
    fs::rename(&tmp_path, &path)
        .with_context(|| format!("replace trace {}", path.display()))?;
    Ok(path)
}

/// Load a trace from disk.
pub fn load_trace(path: &Path) -> Result<RunTrace> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read trace {}", path.display()))?;
    let trace: RunTrace = serde_json::from_str(&contents)
        .with_context(|| format!("parse trace {}", path.display()))?;
    Ok(trace)
}
