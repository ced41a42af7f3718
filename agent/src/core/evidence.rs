//! Evidence extraction from tool results.
//!
//! Extraction is a pure function of the tool result: the same result always
//! yields the same evidence list, in the same order. Order matters because
//! belief updates apply sequentially.

use serde::{Deserialize, Serialize};

use crate::core::hypothesis::Hypothesis;
use crate::core::types::{PressureLevel, ToolData, ToolKind, ToolResult};

/// Qualitative evidence strength, mapped to a fixed belief delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Medium,
    Weak,
    Counter,
}

impl Strength {
    pub fn delta(&self) -> f64 {
        match self {
            Strength::Strong => 0.20,
            Strength::Medium => 0.10,
            Strength::Weak => 0.05,
            Strength::Counter => -0.10,
        }
    }
}

/// The raw value that triggered an evidence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataPoint {
    Count(u64),
    Ratio(f64),
    Label(String),
}

/// A single observed signal linking one tool finding to one hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub tool: ToolKind,
    pub strength: Strength,
    pub hypothesis: Hypothesis,
    pub description: String,
    pub data_point: DataPoint,
}

// Ads thresholds. The impression checks are independent: both can fire on
// the same result.
const LOW_IMPRESSIONS: u64 = 3_000;
const COVERAGE_IMPRESSIONS: u64 = 5_000;
const LOW_CTR: f64 = 0.015;
const HIGH_ACOS: f64 = 1.0;
const NO_CONVERSION_RATIO: f64 = 0.6;

// Listing audit score bands.
const POOR_QUALITY_SCORE: u32 = 50;
const MODERATE_QUALITY_SCORE: u32 = 70;

// Inventory scarcity threshold in days.
const LOW_INVENTORY_DAYS: u32 = 14;

/// Extract evidence from a tool result. Failed results yield nothing.
pub fn extract_evidence(result: &ToolResult) -> Vec<Evidence> {
    if !result.ok {
        return Vec::new();
    }
    let Some(data) = &result.data else {
        return Vec::new();
    };

    match data {
        ToolData::AdsKeyword(report) => {
            let mut evidence = Vec::new();
            let aggregates = &report.aggregates;

            if aggregates.total_impressions < LOW_IMPRESSIONS {
                evidence.push(Evidence {
                    tool: ToolKind::AdsMetrics,
                    strength: Strength::Strong,
                    hypothesis: Hypothesis::LowBids,
                    description: format!(
                        "Low total impressions ({}) suggests bid issues",
                        aggregates.total_impressions
                    ),
                    data_point: DataPoint::Count(aggregates.total_impressions),
                });
            }
            if aggregates.total_impressions < COVERAGE_IMPRESSIONS {
                evidence.push(Evidence {
                    tool: ToolKind::AdsMetrics,
                    strength: Strength::Medium,
                    hypothesis: Hypothesis::KeywordCoverage,
                    description: "Limited impressions may indicate poor keyword coverage"
                        .to_string(),
                    data_point: DataPoint::Count(aggregates.total_impressions),
                });
            }
            if aggregates.avg_ctr < LOW_CTR {
                evidence.push(Evidence {
                    tool: ToolKind::AdsMetrics,
                    strength: Strength::Medium,
                    hypothesis: Hypothesis::ListingQuality,
                    description: format!(
                        "Low CTR ({:.3}) suggests listing quality issues",
                        aggregates.avg_ctr
                    ),
                    data_point: DataPoint::Ratio(aggregates.avg_ctr),
                });
            }
            if let Some(acos) = aggregates.overall_acos
                && acos > HIGH_ACOS
            {
                evidence.push(Evidence {
                    tool: ToolKind::AdsMetrics,
                    strength: Strength::Strong,
                    hypothesis: Hypothesis::BroadMatchWaste,
                    description: format!("High ACOS ({acos:.2}) indicates inefficient spending"),
                    data_point: DataPoint::Ratio(acos),
                });
            }
            if report.issues.total_keywords > 0 {
                let ratio = report.issues.no_conversion_keywords as f64
                    / report.issues.total_keywords as f64;
                if ratio > NO_CONVERSION_RATIO {
                    evidence.push(Evidence {
                        tool: ToolKind::AdsMetrics,
                        strength: Strength::Strong,
                        hypothesis: Hypothesis::BroadMatchWaste,
                        description: format!(
                            "High ratio of non-converting keywords ({}/{})",
                            report.issues.no_conversion_keywords, report.issues.total_keywords
                        ),
                        data_point: DataPoint::Ratio(ratio),
                    });
                }
            }
            evidence
        }
        // Campaign-level aggregation carries no belief signals.
        ToolData::AdsCampaign(_) => Vec::new(),
        ToolData::Competitor(report) => match report.competitive_pressure {
            PressureLevel::High | PressureLevel::Medium => {
                let strength = if report.competitive_pressure == PressureLevel::High {
                    Strength::Strong
                } else {
                    Strength::Medium
                };
                vec![Evidence {
                    tool: ToolKind::Competitor,
                    strength,
                    hypothesis: Hypothesis::CompetitorPressure,
                    description: format!(
                        "Competitive pressure is {}",
                        report.competitive_pressure
                    ),
                    data_point: DataPoint::Label(report.competitive_pressure.to_string()),
                }]
            }
            PressureLevel::Low => Vec::new(),
        },
        ToolData::ListingAudit(report) => {
            // Score bands are mutually exclusive; at most one item fires.
            let strength = if report.quality_score < POOR_QUALITY_SCORE {
                Some(Strength::Strong)
            } else if report.quality_score < MODERATE_QUALITY_SCORE {
                Some(Strength::Medium)
            } else {
                None
            };
            strength.map_or_else(Vec::new, |strength| {
                let description = if strength == Strength::Strong {
                    format!(
                        "Low quality score ({}/100) with {} issues",
                        report.quality_score,
                        report.quality_issues.len()
                    )
                } else {
                    format!("Moderate quality score ({}/100)", report.quality_score)
                };
                vec![Evidence {
                    tool: ToolKind::ListingAudit,
                    strength,
                    hypothesis: Hypothesis::ListingQuality,
                    description,
                    data_point: DataPoint::Count(u64::from(report.quality_score)),
                }]
            })
        }
        ToolData::Inventory(report) => {
            if report.days_remaining < LOW_INVENTORY_DAYS {
                // Scarcity is only weak, indirect evidence about bid strategy.
                vec![Evidence {
                    tool: ToolKind::Inventory,
                    strength: Strength::Weak,
                    hypothesis: Hypothesis::LowBids,
                    description: format!(
                        "Low inventory ({} days) may justify reduced bids",
                        report.days_remaining
                    ),
                    data_point: DataPoint::Count(u64::from(report.days_remaining)),
                }]
            } else {
                Vec::new()
            }
        }
    }
}
