use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::FlowId;

/// Direction of an exchange as declared by `exchangeDirection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Interpret the literal direction string sent by the server
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Input" => Some(Direction::Input),
            "Output" => Some(Direction::Output),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "Input",
            Direction::Output => "Output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input or output flow of a process dataset.
///
/// Instances are built in two halves: the process endpoint yields name,
/// direction, amount and flow identifier; the flow endpoint yields type,
/// category and unit. Enrichment joins the halves by `flow_identifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub flow_name: String,
    /// Literal direction string from the source document ("Input"/"Output")
    pub direction: String,
    pub amount: f64,
    pub flow_identifier: FlowId,
    #[serde(rename = "type", default)]
    pub flow_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub is_reference_flow: bool,
}

impl Exchange {
    /// Exchange half as read from a process dataset
    pub fn new(
        flow_name: impl Into<String>,
        direction: impl Into<String>,
        amount: f64,
        flow_identifier: impl Into<FlowId>,
    ) -> Self {
        Self {
            flow_name: flow_name.into(),
            direction: direction.into(),
            amount,
            flow_identifier: flow_identifier.into(),
            flow_type: String::new(),
            category: String::new(),
            unit: String::new(),
            is_reference_flow: false,
        }
    }

    /// Exchange half as read from a flow listing.
    ///
    /// Direction and amount are placeholders until enrichment fills them.
    pub fn flow_metadata(
        flow_identifier: impl Into<FlowId>,
        flow_name: impl Into<String>,
        flow_type: impl Into<String>,
        category: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            flow_name: flow_name.into(),
            direction: String::new(),
            amount: 0.0,
            flow_identifier: flow_identifier.into(),
            flow_type: flow_type.into(),
            category: category.into(),
            unit: unit.into(),
            is_reference_flow: false,
        }
    }

    pub fn with_reference_flow(mut self, is_reference_flow: bool) -> Self {
        self.is_reference_flow = is_reference_flow;
        self
    }

    /// Merge this process-side half with the flow-side half.
    ///
    /// Name, direction, amount, identifier and reference flag come from
    /// `self`; type, category and unit come from `metadata`.
    pub fn enriched_with(&self, metadata: &Exchange) -> Exchange {
        Exchange {
            flow_name: self.flow_name.clone(),
            direction: self.direction.clone(),
            amount: self.amount,
            flow_identifier: self.flow_identifier.clone(),
            flow_type: metadata.flow_type.clone(),
            category: metadata.category.clone(),
            unit: metadata.unit.clone(),
            is_reference_flow: self.is_reference_flow,
        }
    }

    /// Parsed direction, `None` for values other than Input/Output
    pub fn direction_kind(&self) -> Option<Direction> {
        Direction::parse(&self.direction)
    }

    pub fn is_input(&self) -> bool {
        self.direction_kind() == Some(Direction::Input)
    }

    pub fn is_output(&self) -> bool {
        self.direction_kind() == Some(Direction::Output)
    }
}
