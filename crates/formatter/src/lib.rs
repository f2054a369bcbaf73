//! Human-readable rendering of the bwilcd data model

mod dataset;
mod number;
mod text;

pub use dataset::{SECTION_TEXT_LIMIT, format_dataset};
pub use number::format_amount;
pub use text::{format_size, truncate};
