//! Listing quality auditor.

use std::path::Path;

use serde::Deserialize;

use crate::core::types::{AdsMode, ListingAuditReport, ToolData, ToolKind};
use crate::io::invoker::ToolError;
use crate::io::tools::{data_file, read_data_file};

/// Title keyword coverage below this earns no score and flags an issue.
const TITLE_COVERAGE_FLOOR: f64 = 0.7;
/// Main image score below this earns no score and flags an issue.
const IMAGE_SCORE_FLOOR: f64 = 0.8;
/// Rating below this flags a conversion concern.
const RATING_FLOOR: f64 = 4.0;
/// Review counts below this reduce trust; at or above the upper bound they
/// earn the full score.
const REVIEW_TRUST_FLOOR: u64 = 100;
const REVIEW_FULL_SCORE: u64 = 500;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawListing {
    title_kws_coverage: f64,
    main_image_score: f64,
    a_plus: bool,
    rating: f64,
    reviews: u64,
}

pub fn run(scenario_dir: &Path) -> Result<ToolData, ToolError> {
    let path = scenario_dir.join(data_file(ToolKind::ListingAudit, AdsMode::Keyword));
    let raw: RawListing = read_data_file(&path)?;
    Ok(ToolData::ListingAudit(audit(&raw)))
}

fn audit(raw: &RawListing) -> ListingAuditReport {
    let mut quality_issues = Vec::new();
    let mut recommendations = Vec::new();
    let mut score = 0u32;

    if raw.title_kws_coverage < TITLE_COVERAGE_FLOOR {
        quality_issues.push("Poor keyword coverage in title".to_string());
        recommendations.push("Optimize title with relevant keywords".to_string());
    } else {
        score += 20;
    }

    if raw.main_image_score < IMAGE_SCORE_FLOOR {
        quality_issues.push("Main image quality below standards".to_string());
        recommendations.push("Improve main product image quality".to_string());
    } else {
        score += 20;
    }

    if raw.a_plus {
        score += 15;
    } else {
        quality_issues.push("Missing A+ Content".to_string());
        recommendations.push("Add A+ Content to improve conversion".to_string());
    }

    if raw.rating < RATING_FLOOR {
        quality_issues.push("Low product rating affects conversion".to_string());
        recommendations.push("Address quality issues to improve rating".to_string());
    } else {
        score += 15;
    }

    if raw.reviews < REVIEW_TRUST_FLOOR {
        quality_issues.push("Low review count reduces trust".to_string());
        recommendations.push("Implement review generation strategy".to_string());
    } else if raw.reviews >= REVIEW_FULL_SCORE {
        score += 15;
    } else {
        score += 10;
    }

    ListingAuditReport {
        quality_score: score,
        quality_grade: grade(score),
        quality_issues,
        recommendations,
    }
}

fn grade(score: u32) -> char {
    match score {
        80.. => 'A',
        65.. => 'B',
        50.. => 'C',
        35.. => 'D',
        _ => 'F',
    }
}
