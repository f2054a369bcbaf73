//! Join process-side exchanges with flow metadata

use bwilcd_core::{DatasetDetail, Exchange};
use std::collections::HashMap;
use tracing::debug;

/// Merge dataset exchanges with flow metadata by flow identifier.
///
/// Inner join: exchanges without metadata are dropped. Output keeps the
/// order of `exchanges`. With duplicate metadata identifiers the last
/// record wins.
pub fn enrich(exchanges: &[Exchange], metadata: &[Exchange]) -> Vec<Exchange> {
    let lookup: HashMap<&str, &Exchange> = metadata
        .iter()
        .map(|flow| (flow.flow_identifier.as_str(), flow))
        .collect();

    let enriched: Vec<Exchange> = exchanges
        .iter()
        .filter_map(|exchange| {
            let flow = lookup.get(exchange.flow_identifier.as_str());
            if flow.is_none() {
                debug!(flow = %exchange.flow_identifier, "exchange dropped: no flow metadata");
            }
            flow.map(|flow| exchange.enriched_with(flow))
        })
        .collect();

    debug!(
        before = exchanges.len(),
        after = enriched.len(),
        "enriched exchanges"
    );
    enriched
}

/// Replace the exchanges of `detail` with their enriched form
pub fn enrich_dataset(detail: DatasetDetail, metadata: &[Exchange]) -> DatasetDetail {
    let exchanges = enrich(&detail.exchanges, metadata);
    detail.with_exchanges(exchanges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata(id: &str, unit: &str) -> Exchange {
        Exchange::flow_metadata(id, "ignored", "Product flow", "Metals", unit)
    }

    #[test]
    fn test_inner_join_keeps_order() {
        let exchanges = vec![
            Exchange::new("C", "Output", 3.0, "f-3"),
            Exchange::new("A", "Input", 1.0, "f-1"),
            Exchange::new("B", "Output", 2.0, "f-2").with_reference_flow(true),
        ];
        let flows = vec![metadata("f-2", "kg"), metadata("f-3", "MJ")];

        let enriched = enrich(&exchanges, &flows);
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].flow_name, "C");
        assert_eq!(enriched[0].unit, "MJ");
        assert_eq!(enriched[1].flow_name, "B");
        assert_eq!(enriched[1].direction, "Output");
        assert_eq!(enriched[1].amount, 2.0);
        assert_eq!(enriched[1].flow_type, "Product flow");
        assert_eq!(enriched[1].category, "Metals");
        assert!(enriched[1].is_reference_flow);
    }

    #[test]
    fn test_duplicate_metadata_last_wins() {
        let exchanges = vec![Exchange::new("A", "Input", 1.0, "f-1")];
        let flows = vec![metadata("f-1", "kg"), metadata("f-1", "t")];

        let enriched = enrich(&exchanges, &flows);
        assert_eq!(enriched[0].unit, "t");
    }

    #[test]
    fn test_empty_metadata_drops_everything() {
        let exchanges = vec![Exchange::new("A", "Input", 1.0, "f-1")];
        assert!(enrich(&exchanges, &[]).is_empty());
    }

    #[test]
    fn test_enrich_dataset_can_unmatch_reference() {
        let detail = DatasetDetail {
            name: Some("Steel".into()),
            has_reference_flow: true,
            reference_flow_id: Some(1),
            exchanges: vec![
                Exchange::new("Steel", "Output", 1.0, "f-1").with_reference_flow(true),
                Exchange::new("Ore", "Input", 1.5, "f-2"),
            ],
            ..Default::default()
        };

        let enriched = enrich_dataset(detail, &[metadata("f-2", "kg")]);
        assert_eq!(enriched.name.as_deref(), Some("Steel"));
        assert_eq!(enriched.exchanges.len(), 1);
        assert!(enriched.has_unmatched_reference_flow());
    }
}
