//! Shared deterministic types for the diagnosis core.
//!
//! These types define stable contracts between core components. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Optimization goal declared by the scenario. Skews the initial priors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    IncreaseImpressions,
    ImproveConversion,
    ReduceAcos,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Goal::IncreaseImpressions => "increase_impressions",
            Goal::ImproveConversion => "improve_conversion",
            Goal::ReduceAcos => "reduce_acos",
        };
        f.write_str(s)
    }
}

/// Scenario definition loaded from `scenario.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub asin: String,
    pub goal: Goal,
    pub lookback_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Ads metrics aggregation level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdsMode {
    #[default]
    Keyword,
    Campaign,
}

/// Per-run flags, mostly for simulating tool failures in tests and demos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub break_ads: bool,
    pub break_competitor: bool,
    pub break_audit: bool,
    pub break_inventory: bool,
}

impl Flags {
    /// True when the break flag for the given tool is set.
    pub fn breaks(&self, tool: ToolKind) -> bool {
        match tool {
            ToolKind::AdsMetrics => self.break_ads,
            ToolKind::Competitor => self.break_competitor,
            ToolKind::ListingAudit => self.break_audit,
            ToolKind::Inventory => self.break_inventory,
        }
    }
}

/// The fixed universe of diagnostic tools. Each fires at most once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    AdsMetrics,
    Competitor,
    ListingAudit,
    Inventory,
}

impl ToolKind {
    /// All tools, in lexical name order. Used as the deterministic
    /// fallback order when no preferred tool applies.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::AdsMetrics,
        ToolKind::Competitor,
        ToolKind::Inventory,
        ToolKind::ListingAudit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::AdsMetrics => "ads_metrics",
            ToolKind::Competitor => "competitor",
            ToolKind::ListingAudit => "listing_audit",
            ToolKind::Inventory => "inventory",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution metadata attached to every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMeta {
    pub latency_ms: u64,
    /// Where the data came from (file path or failure site).
    pub source: String,
    /// 1-indexed attempt that produced this result.
    pub attempts: u32,
}

/// Outcome of a single tool invocation, success or failure.
///
/// Failures are data, not errors: a failed tool still occupies its slot in
/// the used-tools set so it is never retried within the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: ToolKind,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ToolData>,
    pub meta: ToolMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Typed tool payloads, one variant per output shape.
///
/// Evidence extraction matches exhaustively on this enum, so adding a tool
/// output forces the extraction table to be revisited at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolData {
    AdsKeyword(AdsKeywordReport),
    AdsCampaign(AdsCampaignReport),
    Competitor(CompetitorReport),
    ListingAudit(ListingAuditReport),
    Inventory(InventoryReport),
}

/// Aggregated keyword-level ads metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsAggregates {
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_spend: f64,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub avg_ctr: f64,
    pub avg_cvr: f64,
    /// None when there is no revenue to divide by.
    pub overall_acos: Option<f64>,
}

/// Counts of keywords exhibiting known performance problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordIssues {
    pub low_impression_keywords: usize,
    pub high_cpc_keywords: usize,
    pub no_conversion_keywords: usize,
    pub total_keywords: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsKeywordReport {
    pub aggregates: AdsAggregates,
    pub issues: KeywordIssues,
}

/// Campaign-level ads summary. Carries no evidence signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsCampaignReport {
    pub campaign_count: usize,
    pub total_spend: f64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PressureLevel::Low => "low",
            PressureLevel::Medium => "medium",
            PressureLevel::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePositioning {
    Lower,
    Competitive,
    SlightlyHigher,
    SignificantlyHigher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorReport {
    pub competitive_pressure: PressureLevel,
    pub price_positioning: PricePositioning,
    pub market_saturation: PressureLevel,
    pub threats: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingAuditReport {
    /// 0..=100 composite quality score.
    pub quality_score: u32,
    pub quality_grade: char,
    pub quality_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryHealth {
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for InventoryHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InventoryHealth::Healthy => "healthy",
            InventoryHealth::Warning => "warning",
            InventoryHealth::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// How inventory status constrains advertising strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdImpact {
    ReduceAdSpend,
    MonitorClosely,
    NoConstraints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub days_remaining: u32,
    pub restock_eta_days: u32,
    pub stockout_risk: String,
    pub health: InventoryHealth,
    pub concerns: Vec<String>,
    pub ad_impact: AdImpact,
}
