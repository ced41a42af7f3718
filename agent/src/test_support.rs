//! Shared helpers for unit and integration tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::types::{
    AdImpact, AdsAggregates, AdsKeywordReport, CompetitorReport, InventoryHealth, InventoryReport,
    KeywordIssues, ListingAuditReport, PressureLevel, PricePositioning, ToolData, ToolKind,
};
use crate::io::invoker::{InvokeRequest, Invoker, ToolError};

/// Invoker that answers from a fixed per-tool script, no filesystem involved.
pub struct ScriptedInvoker {
    responses: BTreeMap<ToolKind, Result<ToolData, ToolError>>,
}

impl ScriptedInvoker {
    pub fn new(responses: BTreeMap<ToolKind, Result<ToolData, ToolError>>) -> Self {
        Self { responses }
    }

    /// Healthy payloads everywhere except one tool, which reports missing
    /// data.
    pub fn failing_for(tool: ToolKind) -> Self {
        let mut responses = healthy_scenario_payloads();
        responses.insert(
            tool,
            Err(ToolError::MissingData(format!(
                "Simulated {tool} data unavailable (test mode)"
            ))),
        );
        Self::new(responses)
    }

    pub fn set(&mut self, tool: ToolKind, response: Result<ToolData, ToolError>) {
        self.responses.insert(tool, response);
    }
}

impl Invoker for ScriptedInvoker {
    fn invoke(&self, request: &InvokeRequest) -> Result<ToolData, ToolError> {
        match self.responses.get(&request.tool) {
            Some(response) => response.clone(),
            None => Err(ToolError::Failed(format!(
                "unscripted tool {}",
                request.tool
            ))),
        }
    }
}

/// Payloads that trip none of the evidence thresholds.
pub fn healthy_scenario_payloads() -> BTreeMap<ToolKind, Result<ToolData, ToolError>> {
    let mut responses = BTreeMap::new();
    responses.insert(
        ToolKind::AdsMetrics,
        Ok(ToolData::AdsKeyword(healthy_keyword_report())),
    );
    responses.insert(
        ToolKind::Competitor,
        Ok(ToolData::Competitor(CompetitorReport {
            competitive_pressure: PressureLevel::Low,
            price_positioning: PricePositioning::Competitive,
            market_saturation: PressureLevel::Low,
            threats: Vec::new(),
            opportunities: vec!["Low competition enables aggressive expansion".to_string()],
            recommendations: Vec::new(),
        })),
    );
    responses.insert(
        ToolKind::ListingAudit,
        Ok(ToolData::ListingAudit(ListingAuditReport {
            quality_score: 85,
            quality_grade: 'A',
            quality_issues: Vec::new(),
            recommendations: Vec::new(),
        })),
    );
    responses.insert(
        ToolKind::Inventory,
        Ok(ToolData::Inventory(InventoryReport {
            days_remaining: 60,
            restock_eta_days: 10,
            stockout_risk: "low".to_string(),
            health: InventoryHealth::Healthy,
            concerns: Vec::new(),
            ad_impact: AdImpact::NoConstraints,
        })),
    );
    responses
}

/// Keyword report with strong low-impressions signal and nothing else.
pub fn low_impressions_keyword_report() -> ToolData {
    ToolData::AdsKeyword(AdsKeywordReport {
        aggregates: AdsAggregates {
            total_impressions: 2_000,
            total_clicks: 40,
            total_spend: 20.0,
            total_orders: 4,
            total_revenue: 80.0,
            avg_ctr: 0.02,
            avg_cvr: 0.10,
            overall_acos: Some(0.25),
        },
        issues: KeywordIssues {
            low_impression_keywords: 3,
            high_cpc_keywords: 0,
            no_conversion_keywords: 2,
            total_keywords: 5,
        },
    })
}

/// Inventory report below the scarcity threshold: weak bid evidence plus
/// ad-spend pullback advice.
pub fn scarce_inventory_report() -> ToolData {
    ToolData::Inventory(InventoryReport {
        days_remaining: 10,
        restock_eta_days: 21,
        stockout_risk: "high".to_string(),
        health: InventoryHealth::Critical,
        concerns: vec!["Low inventory may limit ad effectiveness".to_string()],
        ad_impact: AdImpact::ReduceAdSpend,
    })
}

fn healthy_keyword_report() -> AdsKeywordReport {
    AdsKeywordReport {
        aggregates: AdsAggregates {
            total_impressions: 12_000,
            total_clicks: 240,
            total_spend: 60.0,
            total_orders: 24,
            total_revenue: 480.0,
            avg_ctr: 0.02,
            avg_cvr: 0.10,
            overall_acos: Some(0.125),
        },
        issues: KeywordIssues {
            low_impression_keywords: 0,
            high_cpc_keywords: 0,
            no_conversion_keywords: 1,
            total_keywords: 8,
        },
    }
}

/// Write a full scenario data directory for tests running the real
/// file-backed tools.
pub fn write_scenario_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    write(dir, "ads_keywords.json", HEALTHY_ADS_KEYWORDS)?;
    write(dir, "ads_campaign.json", HEALTHY_ADS_CAMPAIGN)?;
    write(dir, "competitor.json", HEALTHY_COMPETITOR)?;
    write(dir, "listing_audit.json", HEALTHY_LISTING)?;
    write(dir, "inventory.json", HEALTHY_INVENTORY)?;
    Ok(())
}

/// Write a valid `scenario.json` for the given goal, returning its path.
pub fn write_scenario_file(dir: &Path, goal: &str) -> Result<std::path::PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join("scenario.json");
    let contents = format!(
        "{{\"asin\": \"B0EXAMPLE1\", \"goal\": \"{goal}\", \"lookback_days\": 30}}\n"
    );
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
}

const HEALTHY_ADS_KEYWORDS: &str = r#"{
  "keywords": [
    {"impressions": 6000, "clicks": 120, "spend": 30.0, "orders": 12, "revenue": 240.0, "cpc": 0.25},
    {"impressions": 6000, "clicks": 120, "spend": 30.0, "orders": 12, "revenue": 240.0, "cpc": 0.25}
  ]
}
"#;

const HEALTHY_ADS_CAMPAIGN: &str = r#"{
  "campaigns": [
    {"campaign": "auto", "spend": 40.0, "sales": 200.0},
    {"campaign": "manual", "spend": 20.0, "sales": 280.0}
  ]
}
"#;

const HEALTHY_COMPETITOR: &str = r#"{
  "avg_competitor_price": 20.5,
  "sponsored_share": 0.2,
  "top_competitor_rating": 4.0
}
"#;

const HEALTHY_LISTING: &str = r#"{
  "title_kws_coverage": 0.9,
  "main_image_score": 0.95,
  "a_plus": true,
  "rating": 4.5,
  "reviews": 800
}
"#;

const HEALTHY_INVENTORY: &str = r#"{
  "days_of_inventory": 60,
  "restock_eta_days": 10,
  "stockout_risk": "low"
}
"#;
