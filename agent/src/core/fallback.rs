//! Fallback advisories for failed tools.
//!
//! When a tool fails mid-run the loop keeps going; the advisory names
//! topically-relevant alternatives that have not fired yet so the operator
//! (and the trace) know what the next best signal source is.

use std::collections::BTreeSet;

use crate::core::types::ToolKind;

/// Topically-relevant alternatives per tool, with the angle each one covers.
fn alternatives(tool: ToolKind) -> &'static [(ToolKind, &'static str)] {
    match tool {
        ToolKind::AdsMetrics => &[
            (ToolKind::ListingAudit, "check product appeal"),
            (ToolKind::Inventory, "verify availability"),
        ],
        ToolKind::Competitor => &[
            (ToolKind::ListingAudit, "check competitiveness"),
            (ToolKind::AdsMetrics, "focus on internal performance"),
        ],
        ToolKind::ListingAudit => &[
            (ToolKind::AdsMetrics, "check keyword performance"),
            (ToolKind::Competitor, "assess market position"),
        ],
        ToolKind::Inventory => &[
            (ToolKind::AdsMetrics, "assess external factors"),
            (ToolKind::Competitor, "assess external factors"),
        ],
    }
}

/// Compose a suggestion for a failed tool, aware of what remains unused.
///
/// Degrades from named alternatives, to any remaining tool, to proceeding
/// with whatever data was already collected.
pub fn recommend_fallback(failed: ToolKind, used: &BTreeSet<ToolKind>) -> String {
    let candidates: Vec<(ToolKind, &str)> = alternatives(failed)
        .iter()
        .copied()
        .filter(|(tool, _)| !used.contains(tool))
        .collect();

    if !candidates.is_empty() {
        let parts: Vec<String> = candidates
            .iter()
            .map(|(tool, angle)| format!("{tool} to {angle}"))
            .collect();
        return format!("Consider using {}", parts.join(", or "));
    }

    let remaining: Vec<&str> = ToolKind::ALL
        .iter()
        .filter(|tool| !used.contains(tool) && **tool != failed)
        .map(ToolKind::as_str)
        .collect();
    if !remaining.is_empty() {
        return format!("Use any remaining tool: {}", remaining.join(", "));
    }
    "Proceed with available data".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(tools: &[ToolKind]) -> BTreeSet<ToolKind> {
        tools.iter().copied().collect()
    }

    #[test]
    fn names_unused_alternatives_only() {
        let suggestion = recommend_fallback(ToolKind::AdsMetrics, &used(&[ToolKind::AdsMetrics]));
        assert!(suggestion.contains("listing_audit"));
        assert!(suggestion.contains("inventory"));

        let suggestion = recommend_fallback(
            ToolKind::AdsMetrics,
            &used(&[ToolKind::AdsMetrics, ToolKind::ListingAudit]),
        );
        assert!(!suggestion.contains("listing_audit"));
        assert!(suggestion.contains("inventory to verify availability"));
    }

    #[test]
    fn degrades_to_any_remaining_tool() {
        // Both ads alternatives used, but competitor is still open.
        let spent = used(&[
            ToolKind::AdsMetrics,
            ToolKind::ListingAudit,
            ToolKind::Inventory,
        ]);
        let suggestion = recommend_fallback(ToolKind::AdsMetrics, &spent);
        assert_eq!(suggestion, "Use any remaining tool: competitor");
    }

    #[test]
    fn degrades_to_available_data_when_everything_is_spent() {
        let suggestion = recommend_fallback(ToolKind::Inventory, &used(&ToolKind::ALL));
        assert_eq!(suggestion, "Proceed with available data");
    }
}
