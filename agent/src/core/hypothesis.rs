//! Root-cause hypotheses and their belief scores.
//!
//! Beliefs are informal confidence scores in [0, 1], not probabilities: they
//! are never renormalized to sum to 1 (only a one-time damped rescale after
//! goal skew at initialization). Every update clips back into [0, 1].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::evidence::Evidence;
use crate::core::types::{Goal, ToolKind};

/// The fixed set of candidate root causes. No hypothesis is ever added or
/// removed mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hypothesis {
    LowBids,
    KeywordCoverage,
    CompetitorPressure,
    ListingQuality,
    BroadMatchWaste,
}

impl Hypothesis {
    /// All hypotheses in declaration order. Ties in belief resolve in this
    /// order.
    pub const ALL: [Hypothesis; 5] = [
        Hypothesis::LowBids,
        Hypothesis::KeywordCoverage,
        Hypothesis::CompetitorPressure,
        Hypothesis::ListingQuality,
        Hypothesis::BroadMatchWaste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hypothesis::LowBids => "low_bids",
            Hypothesis::KeywordCoverage => "keyword_coverage",
            Hypothesis::CompetitorPressure => "competitor_pressure",
            Hypothesis::ListingQuality => "listing_quality",
            Hypothesis::BroadMatchWaste => "broad_match_waste",
        }
    }

    /// Human-readable name for rendering.
    pub fn display_name(&self) -> &'static str {
        match self {
            Hypothesis::LowBids => "Low Bid Amounts",
            Hypothesis::KeywordCoverage => "Keyword Coverage",
            Hypothesis::CompetitorPressure => "Competitor Pressure",
            Hypothesis::ListingQuality => "Listing Quality",
            Hypothesis::BroadMatchWaste => "Broad Match Waste",
        }
    }

    /// Prior belief before any goal skew.
    pub fn base_prior(&self) -> f64 {
        match self {
            Hypothesis::LowBids => 0.30,
            Hypothesis::KeywordCoverage => 0.25,
            Hypothesis::CompetitorPressure => 0.20,
            Hypothesis::ListingQuality => 0.25,
            Hypothesis::BroadMatchWaste => 0.15,
        }
    }

    /// Base rationale text; the audit trail of updates is appended on render.
    pub fn base_rationale(&self) -> &'static str {
        match self {
            Hypothesis::LowBids => "Bid amounts may be too low to win competitive auctions",
            Hypothesis::KeywordCoverage => {
                "Keyword coverage may be insufficient for target audience"
            }
            Hypothesis::CompetitorPressure => {
                "Strong competitor presence may be limiting performance"
            }
            Hypothesis::ListingQuality => {
                "Product listing quality may be affecting conversion rates"
            }
            Hypothesis::BroadMatchWaste => {
                "Broad match keywords may be generating irrelevant traffic"
            }
        }
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied belief change. Appended, never mutated, so the full audit
/// trail survives in the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefUpdate {
    pub tool: ToolKind,
    pub description: String,
    pub delta: f64,
    pub resulting_belief: f64,
}

/// Current belief plus the ordered log of updates that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisState {
    pub belief: f64,
    #[serde(default)]
    pub updates: Vec<BeliefUpdate>,
}

/// Belief scores over the fixed hypothesis set.
///
/// Keyed by the `Hypothesis` enum so iteration order is deterministic and
/// the compiler checks coverage wherever dispatch happens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Beliefs {
    states: BTreeMap<Hypothesis, HypothesisState>,
}

/// Rescale priors only when goal skew pushes their sum past this bound.
const RESCALE_TRIGGER: f64 = 1.5;
/// Damped rescale target: deliberately above 1.0 so priors stay informative
/// without pretending to be a probability simplex.
const RESCALE_TARGET: f64 = 1.2;

impl Beliefs {
    /// Build the five hypotheses with goal-skewed priors.
    ///
    /// Overrides apply first; if the resulting sum exceeds 1.5 every belief
    /// is scaled by 1.2/sum.
    pub fn initialize(goal: Goal) -> Self {
        let mut states = BTreeMap::new();
        for hypothesis in Hypothesis::ALL {
            let belief = goal_prior(goal, hypothesis).unwrap_or_else(|| hypothesis.base_prior());
            states.insert(
                hypothesis,
                HypothesisState {
                    belief,
                    updates: Vec::new(),
                },
            );
        }

        let sum: f64 = states.values().map(|s| s.belief).sum();
        if sum > RESCALE_TRIGGER {
            let scale = RESCALE_TARGET / sum;
            for state in states.values_mut() {
                state.belief *= scale;
            }
        }

        Self { states }
    }

    /// Apply evidence items one at a time, in list order.
    ///
    /// Sequential application is load-bearing: two items targeting the same
    /// hypothesis interact with clipping, so order changes the final value.
    pub fn apply(&mut self, evidence: &[Evidence]) {
        for item in evidence {
            let Some(state) = self.states.get_mut(&item.hypothesis) else {
                continue;
            };
            let delta = item.strength.delta();
            state.belief = (state.belief + delta).clamp(0.0, 1.0);
            state.updates.push(BeliefUpdate {
                tool: item.tool,
                description: item.description.clone(),
                delta,
                resulting_belief: state.belief,
            });
        }
    }

    /// Top hypothesis by belief; ties resolve in declaration order.
    pub fn top(&self) -> Option<(Hypothesis, f64)> {
        let mut best: Option<(Hypothesis, f64)> = None;
        for (&hypothesis, state) in &self.states {
            match best {
                Some((_, belief)) if state.belief <= belief => {}
                _ => best = Some((hypothesis, state.belief)),
            }
        }
        best
    }

    /// All hypotheses ranked by descending belief (stable for ties).
    pub fn ranked(&self) -> Vec<(Hypothesis, f64)> {
        let mut ranked: Vec<(Hypothesis, f64)> = self
            .states
            .iter()
            .map(|(&hypothesis, state)| (hypothesis, state.belief))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    pub fn get(&self, hypothesis: Hypothesis) -> Option<&HypothesisState> {
        self.states.get(&hypothesis)
    }

    pub fn belief(&self, hypothesis: Hypothesis) -> f64 {
        self.states.get(&hypothesis).map_or(0.0, |s| s.belief)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hypothesis, &HypothesisState)> {
        self.states.iter().map(|(&h, s)| (h, s))
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.states.values().map(|s| s.belief).sum()
    }

    /// Rationale text: base rationale plus the latest `depth` update entries.
    pub fn rationale(&self, hypothesis: Hypothesis, depth: usize) -> String {
        let mut text = hypothesis.base_rationale().to_string();
        if let Some(state) = self.states.get(&hypothesis) {
            let skip = state.updates.len().saturating_sub(depth);
            for update in state.updates.iter().skip(skip) {
                text.push_str(&format!(
                    " [Updated by {}: {}]",
                    update.tool, update.description
                ));
            }
        }
        text
    }
}

fn goal_prior(goal: Goal, hypothesis: Hypothesis) -> Option<f64> {
    match (goal, hypothesis) {
        (Goal::ReduceAcos, Hypothesis::BroadMatchWaste) => Some(0.40),
        (Goal::ReduceAcos, Hypothesis::ListingQuality) => Some(0.35),
        (Goal::IncreaseImpressions, Hypothesis::LowBids) => Some(0.45),
        (Goal::IncreaseImpressions, Hypothesis::KeywordCoverage) => Some(0.40),
        (Goal::ImproveConversion, Hypothesis::ListingQuality) => Some(0.50),
        (Goal::ImproveConversion, Hypothesis::CompetitorPressure) => Some(0.30),
        _ => None,
    }
}
