//! Final action synthesis from the end-of-run belief state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::hypothesis::{Beliefs, Hypothesis};

/// Confidence at or above this adds the implement-immediately nudge and
/// maps to low risk / focused optimization.
const ACT_NOW_CONFIDENCE: f64 = 0.7;
/// Confidence at or above this maps to medium risk / targeted improvement.
const MODERATE_CONFIDENCE: f64 = 0.5;
/// Confidence below this adds the gather-more-data nudge.
pub const WEAK_CONFIDENCE: f64 = 0.4;

/// How many ranked hypotheses the plan surfaces for transparency.
const RANKING_DEPTH: usize = 3;

/// Coarse strategy label for downstream reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    FocusedOptimization,
    TargetedImprovement,
    DataGathering,
    NoAction,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::FocusedOptimization => "focused_optimization",
            Strategy::TargetedImprovement => "targeted_improvement",
            Strategy::DataGathering => "data_gathering",
            Strategy::NoAction => "no_action",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One ranked hypothesis in the final plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHypothesis {
    pub hypothesis: Hypothesis,
    pub belief: f64,
}

/// The final output of a run: diagnosis plus recommended actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_hypothesis: Option<Hypothesis>,
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    /// Top hypotheses by belief, for transparency.
    pub ranking: Vec<RankedHypothesis>,
    pub rationale: String,
}

/// Static recommendation catalog per hypothesis.
fn recommendations_for(hypothesis: Hypothesis) -> &'static [&'static str] {
    match hypothesis {
        Hypothesis::LowBids => &[
            "Increase bid amounts for high-performing keywords",
            "Implement automated bid adjustments based on performance",
            "Focus budget on keywords with proven conversion potential",
        ],
        Hypothesis::KeywordCoverage => &[
            "Expand keyword list with relevant long-tail terms",
            "Add phrase and exact match variants of performing keywords",
            "Research competitor keywords for expansion opportunities",
        ],
        Hypothesis::CompetitorPressure => &[
            "Differentiate product positioning in ads and listing",
            "Focus on unique value propositions and features",
            "Consider niche keyword targeting to avoid direct competition",
        ],
        Hypothesis::ListingQuality => &[
            "Optimize product title with high-performing keywords",
            "Improve main product images and add lifestyle shots",
            "Enhance product descriptions and bullet points",
            "Add or improve A+ Content",
        ],
        Hypothesis::BroadMatchWaste => &[
            "Convert broad match keywords to phrase or exact match",
            "Add negative keywords to filter irrelevant traffic",
            "Review search term reports and optimize accordingly",
        ],
    }
}

/// Convert the final belief state into an action plan.
///
/// `rationale_depth` caps how many update-log entries feed the rendered
/// rationale. Always produces a plan: with no hypotheses the result is a
/// zero-confidence no-action plan rather than an error.
pub fn decide_action(beliefs: &Beliefs, rationale_depth: usize) -> ActionPlan {
    let Some((primary, confidence)) = beliefs.top() else {
        return ActionPlan {
            strategy: Strategy::NoAction,
            primary_hypothesis: None,
            confidence: 0.0,
            recommendations: vec!["Insufficient data for recommendations".to_string()],
            risk_level: RiskLevel::Unknown,
            ranking: Vec::new(),
            rationale: String::new(),
        };
    };

    let mut recommendations: Vec<String> = recommendations_for(primary)
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    if confidence < WEAK_CONFIDENCE {
        recommendations
            .push("Gather more data before implementing major changes".to_string());
    } else if confidence > ACT_NOW_CONFIDENCE {
        recommendations.push("Implement changes immediately with close monitoring".to_string());
    }

    let risk_level = if confidence >= ACT_NOW_CONFIDENCE {
        RiskLevel::Low
    } else if confidence >= MODERATE_CONFIDENCE {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    let strategy = if confidence >= ACT_NOW_CONFIDENCE {
        Strategy::FocusedOptimization
    } else if confidence >= MODERATE_CONFIDENCE {
        Strategy::TargetedImprovement
    } else {
        Strategy::DataGathering
    };

    let ranking = beliefs
        .ranked()
        .into_iter()
        .take(RANKING_DEPTH)
        .map(|(hypothesis, belief)| RankedHypothesis { hypothesis, belief })
        .collect();

    ActionPlan {
        strategy,
        primary_hypothesis: Some(primary),
        confidence,
        recommendations,
        risk_level,
        ranking,
        rationale: beliefs.rationale(primary, rationale_depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evidence::{DataPoint, Evidence, Strength};
    use crate::core::types::{Goal, ToolKind};

    fn strong(hypothesis: Hypothesis) -> Evidence {
        Evidence {
            tool: ToolKind::AdsMetrics,
            strength: Strength::Strong,
            hypothesis,
            description: "signal".to_string(),
            data_point: DataPoint::Count(0),
        }
    }

    const DEPTH: usize = 4;

    #[test]
    fn no_hypotheses_yield_degraded_plan() {
        let plan = decide_action(&Beliefs::default(), DEPTH);
        assert_eq!(plan.strategy, Strategy::NoAction);
        assert_eq!(plan.confidence, 0.0);
        assert_eq!(plan.risk_level, RiskLevel::Unknown);
        assert!(plan.primary_hypothesis.is_none());
    }

    #[test]
    fn low_confidence_gathers_data_at_high_risk() {
        // ReduceAcos top is BroadMatchWaste at 0.40: not weak enough for the
        // extra nudge, but squarely in the data-gathering band.
        let plan = decide_action(&Beliefs::initialize(Goal::ReduceAcos), DEPTH);
        assert_eq!(plan.strategy, Strategy::DataGathering);
        assert_eq!(plan.risk_level, RiskLevel::High);
        assert_eq!(plan.recommendations.len(), 3);

        // Drag below 0.4 and the gather-more-data line appears.
        let mut beliefs = Beliefs::initialize(Goal::ReduceAcos);
        beliefs.apply(&[Evidence {
            strength: Strength::Counter,
            ..strong(Hypothesis::BroadMatchWaste)
        }]);
        let plan = decide_action(&beliefs, DEPTH);
        assert!(
            plan.recommendations
                .last()
                .expect("recommendation")
                .contains("Gather more data")
        );
    }

    #[test]
    fn high_confidence_acts_immediately_at_low_risk() {
        let mut beliefs = Beliefs::initialize(Goal::ImproveConversion);
        beliefs.apply(&[
            strong(Hypothesis::ListingQuality),
            strong(Hypothesis::ListingQuality),
        ]);
        let plan = decide_action(&beliefs, DEPTH);
        assert_eq!(plan.strategy, Strategy::FocusedOptimization);
        assert_eq!(plan.risk_level, RiskLevel::Low);
        assert_eq!(plan.primary_hypothesis, Some(Hypothesis::ListingQuality));
        // Catalog of 4 plus the implement-immediately nudge.
        assert_eq!(plan.recommendations.len(), 5);
        assert!(
            plan.recommendations
                .last()
                .expect("recommendation")
                .contains("immediately")
        );
    }

    #[test]
    fn ranking_surfaces_top_three() {
        let plan = decide_action(&Beliefs::initialize(Goal::IncreaseImpressions), DEPTH);
        assert_eq!(plan.ranking.len(), 3);
        assert_eq!(plan.ranking[0].hypothesis, Hypothesis::LowBids);
        assert!(plan.ranking[0].belief >= plan.ranking[1].belief);
        assert!(plan.ranking[1].belief >= plan.ranking[2].belief);
    }

    #[test]
    fn moderate_confidence_targets_improvement() {
        let mut beliefs = Beliefs::initialize(Goal::ImproveConversion);
        beliefs.apply(&[Evidence {
            strength: Strength::Weak,
            ..strong(Hypothesis::ListingQuality)
        }]);
        // 0.50 + 0.05 = 0.55.
        let plan = decide_action(&beliefs, DEPTH);
        assert_eq!(plan.strategy, Strategy::TargetedImprovement);
        assert_eq!(plan.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn rationale_depth_caps_the_rendered_update_trail() {
        let mut beliefs = Beliefs::initialize(Goal::ImproveConversion);
        beliefs.apply(&[
            strong(Hypothesis::ListingQuality),
            strong(Hypothesis::ListingQuality),
            strong(Hypothesis::ListingQuality),
        ]);

        let wide = decide_action(&beliefs, DEPTH);
        assert_eq!(wide.rationale.matches("[Updated by").count(), 3);

        let narrow = decide_action(&beliefs, 1);
        assert_eq!(narrow.rationale.matches("[Updated by").count(), 1);
    }
}
