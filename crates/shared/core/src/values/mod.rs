/// Identifier of a data stock on a SODA4LCA node (a UUID in practice)
pub type StockId = String;

/// Identifier of a process dataset (a UUID in practice)
pub type DatasetId = String;

/// Identifier of a flow dataset referenced by an exchange
pub type FlowId = String;

/// Dataset-internal sequence number of an exchange (`dataSetInternalID`)
pub type InternalId = i64;
