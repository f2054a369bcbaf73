use serde::{Deserialize, Serialize};

use crate::values::StockId;

/// A data stock: a named collection of datasets on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub identifier: StockId,
    pub name: String,
    /// Empty when the server sends no (or an empty) description
    #[serde(default)]
    pub description: String,
}

impl Stock {
    pub fn new(identifier: impl Into<StockId>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build a stock from optionally-present fields.
    ///
    /// Returns `None` unless both identifier and name are present and
    /// non-empty; such records are dropped from listings rather than
    /// reported as errors.
    pub fn from_parts(
        identifier: Option<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> Option<Self> {
        let identifier = identifier.filter(|s| !s.is_empty())?;
        let name = name.filter(|s| !s.is_empty())?;
        Some(Self {
            identifier,
            name,
            description: description.unwrap_or_default(),
        })
    }
}
