//! Plain-text terminal renderer for run progress.

use std::io::Write;

use crate::core::action::ActionPlan;
use crate::core::evidence::Evidence;
use crate::core::hypothesis::Beliefs;
use crate::core::stopping::StopReason;
use crate::core::types::{Scenario, ToolKind, ToolResult};
use crate::sink::EventSink;

/// Sink that narrates the run to a writer (stdout in the CLI).
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn beliefs_line(&mut self, beliefs: &Beliefs) {
        let parts: Vec<String> = beliefs
            .iter()
            .map(|(h, s)| format!("{}={:.2}", h, s.belief))
            .collect();
        let _ = writeln!(self.out, "  beliefs: {}", parts.join(" "));
    }
}

impl<W: Write> EventSink for TerminalSink<W> {
    fn run_started(&mut self, scenario: &Scenario, beliefs: &Beliefs) {
        let _ = writeln!(
            self.out,
            "== Diagnosing {} (goal: {}, lookback: {} days) ==",
            scenario.asin, scenario.goal, scenario.lookback_days
        );
        if let Some(notes) = &scenario.notes {
            let _ = writeln!(self.out, "note: {notes}");
        }
        self.beliefs_line(beliefs);
    }

    fn step_started(&mut self, step: u32, _beliefs: &Beliefs) {
        let _ = writeln!(self.out, "\n-- step {step} --");
    }

    fn tool_selected(&mut self, _step: u32, tool: ToolKind, reasoning: &str) {
        let _ = writeln!(self.out, "  run {tool}: {reasoning}");
    }

    fn tool_finished(&mut self, result: &ToolResult) {
        if result.ok {
            let _ = writeln!(
                self.out,
                "  {} ok ({} ms, attempt {})",
                result.tool, result.meta.latency_ms, result.meta.attempts
            );
        } else {
            let _ = writeln!(
                self.out,
                "  {} FAILED: {}",
                result.tool,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    fn fallback_suggested(&mut self, _failed: ToolKind, suggestion: &str) {
        let _ = writeln!(self.out, "  fallback: {suggestion}");
    }

    fn beliefs_updated(&mut self, evidence: &[Evidence], beliefs: &Beliefs) {
        for item in evidence {
            let _ = writeln!(
                self.out,
                "  evidence [{:?}] {} -> {}",
                item.strength, item.description, item.hypothesis
            );
        }
        self.beliefs_line(beliefs);
    }

    fn stopped(&mut self, reason: &StopReason) {
        let _ = writeln!(self.out, "  stop: {reason}");
    }

    fn finished(&mut self, plan: &ActionPlan) {
        let _ = writeln!(self.out, "\n== Final action plan ==");
        if let Some(primary) = plan.primary_hypothesis {
            let _ = writeln!(
                self.out,
                "diagnosis: {} (confidence {:.2}, risk {})",
                primary.display_name(),
                plan.confidence,
                plan.risk_level
            );
        }
        let _ = writeln!(self.out, "strategy: {}", plan.strategy);
        for rec in &plan.recommendations {
            let _ = writeln!(self.out, "  - {rec}");
        }
        if !plan.ranking.is_empty() {
            let _ = writeln!(self.out, "ranking:");
            for ranked in &plan.ranking {
                let _ = writeln!(
                    self.out,
                    "  {} {:.2}",
                    ranked.hypothesis.display_name(),
                    ranked.belief
                );
            }
        }
        if !plan.rationale.is_empty() {
            let _ = writeln!(self.out, "rationale: {}", plan.rationale);
        }
    }
}
