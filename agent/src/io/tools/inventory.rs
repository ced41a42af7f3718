//! Inventory status checker.

use std::path::Path;

use serde::Deserialize;

use crate::core::types::{AdImpact, AdsMode, InventoryHealth, InventoryReport, ToolData, ToolKind};
use crate::io::invoker::ToolError;
use crate::io::tools::{data_file, read_data_file};

/// Below this many days of stock the inventory is critical.
const CRITICAL_DAYS: u32 = 14;
/// Below this many days of stock the inventory is a warning.
const WARNING_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawInventory {
    days_of_inventory: u32,
    restock_eta_days: u32,
    stockout_risk: String,
}

impl Default for RawInventory {
    fn default() -> Self {
        Self {
            days_of_inventory: 0,
            restock_eta_days: 0,
            stockout_risk: "unknown".to_string(),
        }
    }
}

pub fn run(scenario_dir: &Path) -> Result<ToolData, ToolError> {
    let path = scenario_dir.join(data_file(ToolKind::Inventory, AdsMode::Keyword));
    let raw: RawInventory = read_data_file(&path)?;
    Ok(ToolData::Inventory(assess(&raw)))
}

fn assess(raw: &RawInventory) -> InventoryReport {
    let mut concerns = Vec::new();

    let health = if raw.days_of_inventory < CRITICAL_DAYS {
        concerns.push("Low inventory may limit ad effectiveness".to_string());
        InventoryHealth::Critical
    } else if raw.days_of_inventory < WARNING_DAYS {
        concerns.push("Inventory levels below optimal range".to_string());
        InventoryHealth::Warning
    } else {
        InventoryHealth::Healthy
    };

    if matches!(raw.stockout_risk.as_str(), "high" | "critical") {
        concerns.push(format!("High stockout risk: {}", raw.stockout_risk));
    }

    if raw.restock_eta_days > raw.days_of_inventory {
        concerns.push("Restock ETA exceeds current inventory duration".to_string());
    }

    InventoryReport {
        days_remaining: raw.days_of_inventory,
        restock_eta_days: raw.restock_eta_days,
        stockout_risk: raw.stockout_risk.clone(),
        health,
        concerns,
        ad_impact: assess_ad_impact(raw.days_of_inventory, &raw.stockout_risk),
    }
}

fn assess_ad_impact(days: u32, risk: &str) -> AdImpact {
    if days < CRITICAL_DAYS || matches!(risk, "high" | "critical") {
        AdImpact::ReduceAdSpend
    } else if days < WARNING_DAYS || risk == "medium" {
        AdImpact::MonitorClosely
    } else {
        AdImpact::NoConstraints
    }
}
