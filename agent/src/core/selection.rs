//! Deterministic tool selection driven by current beliefs.

use std::collections::BTreeSet;

use crate::core::hypothesis::{Beliefs, Hypothesis};
use crate::core::types::ToolKind;

/// Beliefs at or above this value end the investigation unconditionally.
pub const VERY_HIGH_CONFIDENCE: f64 = 0.8;
/// Beliefs at or above this value end it unless the top hypothesis still has
/// an unused preferred tool worth firing.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// Tools most informative for a hypothesis, in preference order.
pub fn preferred_tools(hypothesis: Hypothesis) -> &'static [ToolKind] {
    match hypothesis {
        Hypothesis::LowBids => &[ToolKind::AdsMetrics, ToolKind::Inventory],
        Hypothesis::KeywordCoverage => &[ToolKind::AdsMetrics, ToolKind::ListingAudit],
        Hypothesis::CompetitorPressure => &[ToolKind::Competitor, ToolKind::AdsMetrics],
        Hypothesis::ListingQuality => &[ToolKind::ListingAudit, ToolKind::Competitor],
        Hypothesis::BroadMatchWaste => &[ToolKind::AdsMetrics],
    }
}

/// Pick the next tool to invoke, or `None` to signal stop.
///
/// Ranked preference: walk the top two hypotheses by belief, trying each
/// one's preferred tools in order, then fall back to any unused tool in
/// lexical order. Within the [0.7, 0.8) confidence window only the top
/// hypothesis's preferred list is considered.
pub fn select_next_tool(beliefs: &Beliefs, used: &BTreeSet<ToolKind>) -> Option<ToolKind> {
    let (top, top_belief) = beliefs.top()?;

    if top_belief >= VERY_HIGH_CONFIDENCE {
        return None;
    }

    if top_belief >= HIGH_CONFIDENCE {
        // Confident but not certain: only a still-unused preferred tool for
        // the leading hypothesis justifies another step.
        return preferred_tools(top)
            .iter()
            .copied()
            .find(|tool| !used.contains(tool));
    }

    let ranked = beliefs.ranked();
    for (hypothesis, _) in ranked.iter().take(2) {
        for tool in preferred_tools(*hypothesis) {
            if !used.contains(tool) {
                return Some(*tool);
            }
        }
    }

    ToolKind::ALL.iter().copied().find(|tool| !used.contains(tool))
}
