//! Advertising metrics analyzer (keyword or campaign level).

use std::path::Path;

use serde::Deserialize;

use crate::core::types::{
    AdsAggregates, AdsCampaignReport, AdsKeywordReport, AdsMode, KeywordIssues, ToolData, ToolKind,
};
use crate::io::invoker::ToolError;
use crate::io::tools::{data_file, read_data_file};

/// Keywords below this many impressions count as low-impression.
const LOW_IMPRESSION_FLOOR: u64 = 500;
/// Keywords above this cost-per-click count as expensive.
const HIGH_CPC_CEILING: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct KeywordFile {
    #[serde(default)]
    keywords: Vec<RawKeyword>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawKeyword {
    impressions: u64,
    clicks: u64,
    spend: f64,
    orders: u64,
    revenue: f64,
    cpc: f64,
}

#[derive(Debug, Deserialize)]
struct CampaignFile {
    #[serde(default)]
    campaigns: Vec<RawCampaign>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCampaign {
    spend: f64,
    sales: f64,
}

pub fn run(scenario_dir: &Path, mode: AdsMode) -> Result<ToolData, ToolError> {
    let path = scenario_dir.join(data_file(ToolKind::AdsMetrics, mode));
    match mode {
        AdsMode::Keyword => {
            let file: KeywordFile = read_data_file(&path)?;
            Ok(ToolData::AdsKeyword(analyze_keywords(&file.keywords)))
        }
        AdsMode::Campaign => {
            let file: CampaignFile = read_data_file(&path)?;
            Ok(ToolData::AdsCampaign(AdsCampaignReport {
                campaign_count: file.campaigns.len(),
                total_spend: file.campaigns.iter().map(|c| c.spend).sum(),
                total_sales: file.campaigns.iter().map(|c| c.sales).sum(),
            }))
        }
    }
}

fn analyze_keywords(keywords: &[RawKeyword]) -> AdsKeywordReport {
    let total_impressions: u64 = keywords.iter().map(|k| k.impressions).sum();
    let total_clicks: u64 = keywords.iter().map(|k| k.clicks).sum();
    let total_spend: f64 = keywords.iter().map(|k| k.spend).sum();
    let total_orders: u64 = keywords.iter().map(|k| k.orders).sum();
    let total_revenue: f64 = keywords.iter().map(|k| k.revenue).sum();

    let avg_ctr = if total_impressions > 0 {
        total_clicks as f64 / total_impressions as f64
    } else {
        0.0
    };
    let avg_cvr = if total_clicks > 0 {
        total_orders as f64 / total_clicks as f64
    } else {
        0.0
    };
    let overall_acos = if total_revenue > 0.0 {
        Some(total_spend / total_revenue)
    } else {
        None
    };

    AdsKeywordReport {
        aggregates: AdsAggregates {
            total_impressions,
            total_clicks,
            total_spend,
            total_orders,
            total_revenue,
            avg_ctr,
            avg_cvr,
            overall_acos,
        },
        issues: KeywordIssues {
            low_impression_keywords: keywords
                .iter()
                .filter(|k| k.impressions < LOW_IMPRESSION_FLOOR)
                .count(),
            high_cpc_keywords: keywords.iter().filter(|k| k.cpc > HIGH_CPC_CEILING).count(),
            no_conversion_keywords: keywords.iter().filter(|k| k.orders == 0).count(),
            total_keywords: keywords.len(),
        },
    }
}
