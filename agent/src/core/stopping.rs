//! Stopping policy for the diagnosis loop.
//!
//! Evaluated at the start of every step; the orchestrator only honors a stop
//! signal once the minimum step count has been reached.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::hypothesis::{Beliefs, Hypothesis};
use crate::core::selection::HIGH_CONFIDENCE;
use crate::core::types::ToolKind;

/// The loop always executes at least this many steps.
pub const MIN_STEPS: u32 = 3;
/// Hard ceiling on loop iterations.
pub const MAX_STEPS: u32 = 5;

/// Top belief below this value counts as low confidence for the
/// all-main-tools-used check.
const LOW_CONFIDENCE: f64 = 0.4;

/// The subset of tools whose exhaustion signals diminishing returns.
/// Inventory is auxiliary and deliberately excluded.
const MAIN_TOOLS: [ToolKind; 3] = [
    ToolKind::AdsMetrics,
    ToolKind::Competitor,
    ToolKind::ListingAudit,
];

/// Why the loop should stop.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// No hypotheses to evaluate.
    NoHypotheses,
    /// Top belief crossed the high-confidence threshold.
    HighConfidence { hypothesis: Hypothesis, belief: f64 },
    /// Step ceiling reached.
    MaxSteps { hypothesis: Hypothesis, belief: f64 },
    /// All main tools used and confidence stayed low.
    MainToolsExhausted { belief: f64 },
    /// Tool selection found nothing left worth firing. Produced by the
    /// orchestrator, never by [`should_stop`].
    NoInformativeTools,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoHypotheses => write!(f, "No hypotheses to evaluate"),
            StopReason::HighConfidence { hypothesis, belief } => write!(
                f,
                "High confidence in {hypothesis} (belief={belief:.2})"
            ),
            StopReason::MaxSteps { hypothesis, belief } => write!(
                f,
                "Maximum iterations reached with top hypothesis {hypothesis} (belief={belief:.2})"
            ),
            StopReason::MainToolsExhausted { belief } => write!(
                f,
                "All main tools used with low confidence (belief={belief:.2})"
            ),
            StopReason::NoInformativeTools => write!(f, "No more informative tools available"),
        }
    }
}

/// Decide whether the loop should terminate at the given step.
pub fn should_stop(
    beliefs: &Beliefs,
    step: u32,
    used: &BTreeSet<ToolKind>,
) -> Option<StopReason> {
    let Some((hypothesis, belief)) = beliefs.top() else {
        return Some(StopReason::NoHypotheses);
    };

    if belief >= HIGH_CONFIDENCE {
        return Some(StopReason::HighConfidence { hypothesis, belief });
    }

    if step >= MAX_STEPS {
        return Some(StopReason::MaxSteps { hypothesis, belief });
    }

    if step >= MIN_STEPS
        && MAIN_TOOLS.iter().all(|tool| used.contains(tool))
        && belief < LOW_CONFIDENCE
    {
        return Some(StopReason::MainToolsExhausted { belief });
    }

    None
}
