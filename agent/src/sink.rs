//! Observer interface for run progress.
//!
//! The orchestrator reports progress through an [`EventSink`] instead of
//! printing directly, so the loop stays renderer-agnostic: the CLI attaches a
//! terminal renderer, tests attach nothing.

use crate::core::action::ActionPlan;
use crate::core::evidence::Evidence;
use crate::core::hypothesis::Beliefs;
use crate::core::stopping::StopReason;
use crate::core::types::{Scenario, ToolKind, ToolResult};

/// Receives run progress events. All methods default to no-ops so sinks only
/// implement what they render.
pub trait EventSink {
    fn run_started(&mut self, _scenario: &Scenario, _beliefs: &Beliefs) {}

    fn step_started(&mut self, _step: u32, _beliefs: &Beliefs) {}

    fn tool_selected(&mut self, _step: u32, _tool: ToolKind, _reasoning: &str) {}

    fn tool_finished(&mut self, _result: &ToolResult) {}

    fn fallback_suggested(&mut self, _failed: ToolKind, _suggestion: &str) {}

    fn beliefs_updated(&mut self, _evidence: &[Evidence], _beliefs: &Beliefs) {}

    fn stopped(&mut self, _reason: &StopReason) {}

    fn finished(&mut self, _plan: &ActionPlan) {}
}

/// Sink that discards everything. Used in tests and headless runs.
pub struct NullSink;

impl EventSink for NullSink {}
