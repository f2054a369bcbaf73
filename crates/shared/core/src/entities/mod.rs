mod dataset;
mod exchange;
mod stock;

pub use dataset::{DatasetDetail, DatasetSummary, SearchPage};
pub use exchange::{Direction, Exchange};
pub use stock::Stock;
