//! Working memory accumulated over one diagnosis run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::core::hypothesis::Beliefs;
use crate::core::types::{Flags, Scenario, ToolKind, ToolResult};
use crate::io::trace::{TraceEntry, TraceEvent};

/// Everything the loop knows mid-run: beliefs, tool results, used tools, and
/// the growing trace. Owned by the orchestrator and discarded after the trace
/// is persisted.
#[derive(Debug)]
pub struct WorkingMemory {
    pub scenario: Scenario,
    pub scenario_dir: PathBuf,
    pub flags: Flags,
    /// Current step, 0 before the loop starts.
    pub step: u32,
    pub beliefs: Beliefs,
    /// Results keyed by tool; failures occupy a slot too.
    pub tool_results: BTreeMap<ToolKind, ToolResult>,
    pub used_tools: BTreeSet<ToolKind>,
    pub entries: Vec<TraceEntry>,
}

impl WorkingMemory {
    pub fn new(scenario: Scenario, scenario_dir: PathBuf, flags: Flags) -> Self {
        let beliefs = Beliefs::initialize(scenario.goal);
        Self {
            scenario,
            scenario_dir,
            flags,
            step: 0,
            beliefs,
            tool_results: BTreeMap::new(),
            used_tools: BTreeSet::new(),
            entries: Vec::new(),
        }
    }

    pub fn advance_step(&mut self) {
        self.step += 1;
    }

    /// Record a tool outcome. The tool counts as used whether or not it
    /// succeeded, so it is never re-invoked within the run.
    pub fn record_result(&mut self, result: ToolResult) {
        self.used_tools.insert(result.tool);
        self.tool_results.insert(result.tool, result);
    }

    /// Append a trace event stamped with the current step.
    pub fn record_event(&mut self, timestamp: String, event: TraceEvent) {
        self.entries.push(TraceEntry {
            timestamp,
            step: self.step,
            event,
        });
    }

    /// Current belief values keyed by hypothesis, for trace snapshots.
    pub fn belief_snapshot(&self) -> BTreeMap<crate::core::hypothesis::Hypothesis, f64> {
        self.beliefs.iter().map(|(h, s)| (h, s.belief)).collect()
    }
}
