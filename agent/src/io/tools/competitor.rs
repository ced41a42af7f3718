//! Competitor landscape analyzer.

use std::path::Path;

use serde::Deserialize;

use crate::core::types::{
    AdsMode, CompetitorReport, PressureLevel, PricePositioning, ToolData, ToolKind,
};
use crate::io::invoker::ToolError;
use crate::io::tools::{data_file, read_data_file};

/// Reference price for positioning comparisons, matching the mock catalog.
const OUR_PRICE: f64 = 19.99;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCompetitor {
    avg_competitor_price: f64,
    sponsored_share: f64,
    top_competitor_rating: f64,
}

pub fn run(scenario_dir: &Path) -> Result<ToolData, ToolError> {
    let path = scenario_dir.join(data_file(ToolKind::Competitor, AdsMode::Keyword));
    let raw: RawCompetitor = read_data_file(&path)?;
    Ok(ToolData::Competitor(analyze(&raw)))
}

fn analyze(raw: &RawCompetitor) -> CompetitorReport {
    let competitive_pressure =
        assess_pressure(raw.avg_competitor_price, raw.sponsored_share, raw.top_competitor_rating);
    let price_positioning = price_positioning(raw.avg_competitor_price);
    let market_saturation = market_saturation(raw.sponsored_share);

    let mut threats = Vec::new();
    let mut opportunities = Vec::new();
    let mut recommendations = Vec::new();

    match price_positioning {
        PricePositioning::SignificantlyHigher => {
            threats.push("Price disadvantage vs competitors".to_string());
            recommendations.push("Consider price optimization or value differentiation".to_string());
        }
        PricePositioning::Competitive => {
            opportunities.push("Price parity enables feature-based competition".to_string());
        }
        PricePositioning::SlightlyHigher | PricePositioning::Lower => {}
    }

    match market_saturation {
        PressureLevel::High => {
            threats.push("High advertising competition".to_string());
            recommendations.push("Focus on long-tail keywords and niche targeting".to_string());
        }
        PressureLevel::Medium => {
            opportunities
                .push("Moderate competition allows for strategic positioning".to_string());
        }
        PressureLevel::Low => {
            opportunities.push("Low competition enables aggressive expansion".to_string());
        }
    }

    if raw.top_competitor_rating > 4.5 {
        threats.push("Competitors have superior ratings".to_string());
        recommendations.push("Prioritize product quality improvements".to_string());
    }

    CompetitorReport {
        competitive_pressure,
        price_positioning,
        market_saturation,
        threats,
        opportunities,
        recommendations,
    }
}

fn assess_pressure(price: f64, ad_share: f64, rating: f64) -> PressureLevel {
    let mut score = 0u32;
    if price < 15.0 {
        score += 2;
    } else if price < 18.0 {
        score += 1;
    }
    if ad_share > 0.5 {
        score += 2;
    } else if ad_share > 0.3 {
        score += 1;
    }
    if rating > 4.5 {
        score += 2;
    } else if rating > 4.2 {
        score += 1;
    }

    if score >= 4 {
        PressureLevel::High
    } else if score >= 2 {
        PressureLevel::Medium
    } else {
        PressureLevel::Low
    }
}

fn price_positioning(competitor_price: f64) -> PricePositioning {
    if OUR_PRICE > competitor_price * 1.2 {
        PricePositioning::SignificantlyHigher
    } else if OUR_PRICE > competitor_price * 1.1 {
        PricePositioning::SlightlyHigher
    } else if OUR_PRICE > competitor_price * 0.9 {
        PricePositioning::Competitive
    } else {
        PricePositioning::Lower
    }
}

fn market_saturation(sponsored_share: f64) -> PressureLevel {
    if sponsored_share > 0.6 {
        PressureLevel::High
    } else if sponsored_share > 0.3 {
        PressureLevel::Medium
    } else {
        PressureLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cheap_crowded_high_rated_market_is_high_pressure() {
        let report = analyze(&RawCompetitor {
            avg_competitor_price: 14.0,
            sponsored_share: 0.7,
            top_competitor_rating: 4.7,
        });
        assert_eq!(report.competitive_pressure, PressureLevel::High);
        assert_eq!(report.market_saturation, PressureLevel::High);
        assert_eq!(report.price_positioning, PricePositioning::SignificantlyHigher);
        assert!(report.threats.iter().any(|t| t.contains("superior ratings")));
    }

    #[test]
    fn quiet_market_is_low_pressure_with_opportunities() {
        let report = analyze(&RawCompetitor {
            avg_competitor_price: 21.0,
            sponsored_share: 0.1,
            top_competitor_rating: 3.9,
        });
        assert_eq!(report.competitive_pressure, PressureLevel::Low);
        assert!(
            report
                .opportunities
                .iter()
                .any(|o| o.contains("aggressive expansion"))
        );
        assert!(report.threats.is_empty());
    }

    #[test]
    fn reads_competitor_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join("competitor.json"),
            r#"{"avg_competitor_price": 16.5, "sponsored_share": 0.4, "top_competitor_rating": 4.3}"#,
        )
        .expect("write");

        let data = run(temp.path()).expect("run");
        let ToolData::Competitor(report) = data else {
            panic!("expected competitor report");
        };
        assert_eq!(report.competitive_pressure, PressureLevel::Medium);
    }
}
