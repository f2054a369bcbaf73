use serde::{Deserialize, Serialize};

use super::Exchange;
use crate::values::{DatasetId, InternalId};

/// Search endpoints only ever yield process datasets
pub const DEFAULT_DATASET_TYPE: &str = "Process";

/// One row of a dataset search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub identifier: DatasetId,
    pub name: String,
    #[serde(default = "default_dataset_type")]
    pub dataset_type: String,
    /// Location code when the server includes one in the listing
    #[serde(default)]
    pub location: Option<String>,
}

fn default_dataset_type() -> String {
    DEFAULT_DATASET_TYPE.to_string()
}

impl DatasetSummary {
    pub fn new(identifier: impl Into<DatasetId>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            dataset_type: default_dataset_type(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns `None` unless both identifier and name are present and non-empty
    pub fn from_parts(
        identifier: Option<String>,
        name: Option<String>,
        location: Option<String>,
    ) -> Option<Self> {
        let identifier = identifier.filter(|s| !s.is_empty())?;
        let name = name.filter(|s| !s.is_empty())?;
        Some(Self {
            identifier,
            name,
            dataset_type: default_dataset_type(),
            location: location.filter(|s| !s.is_empty()),
        })
    }
}

/// One page of a dataset search.
///
/// The paging attributes describe the whole response, not any single
/// record, and are `None` when the server omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub datasets: Vec<DatasetSummary>,
    /// Server-declared number of matches across all pages
    pub total_size: Option<u64>,
    pub start_index: Option<u64>,
    pub page_size: Option<u64>,
}

impl SearchPage {
    pub fn new(datasets: Vec<DatasetSummary>) -> Self {
        Self {
            datasets,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Total used for display: the declared total, else the page length
    pub fn total_or_len(&self) -> u64 {
        self.total_size.unwrap_or(self.datasets.len() as u64)
    }

    /// Whether a page starting at `offset` can still hold results.
    ///
    /// Without a declared total this is unknown, so the caller has to
    /// fetch and look at the page itself.
    pub fn has_results_at(&self, offset: u64) -> Option<bool> {
        self.total_size.map(|total| offset < total)
    }
}

/// Full view of one process dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetDetail {
    pub name: Option<String>,
    pub identifier: Option<DatasetId>,
    pub description: Option<String>,
    pub reference_year: Option<String>,
    pub geography: Option<String>,
    pub technology: Option<String>,
    pub functional_unit: Option<String>,
    /// Whether the document declared a reference-flow pointer at all
    pub has_reference_flow: bool,
    /// The declared pointer (`referenceToReferenceFlow`)
    pub reference_flow_id: Option<InternalId>,
    pub exchanges: Vec<Exchange>,
}

impl DatasetDetail {
    /// True when a reference flow is declared but no exchange carries the flag.
    ///
    /// Happens when the referenced exchange was skipped for missing fields,
    /// dropped by enrichment, or when the pointer is zero.
    pub fn has_unmatched_reference_flow(&self) -> bool {
        self.has_reference_flow && !self.exchanges.iter().any(|e| e.is_reference_flow)
    }

    pub fn reference_exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().filter(|e| e.is_reference_flow)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().filter(|e| e.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().filter(|e| e.is_output())
    }

    /// Replace the exchange list, keeping every other field
    pub fn with_exchanges(mut self, exchanges: Vec<Exchange>) -> Self {
        self.exchanges = exchanges;
        self
    }
}
