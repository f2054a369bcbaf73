//! Plain-text dataset report

use bwilcd_core::{DatasetDetail, Exchange};
use std::fmt::Write;

use crate::number::format_amount;
use crate::text::truncate;

/// Characters of a text section shown before it is cut off
pub const SECTION_TEXT_LIMIT: usize = 500;

const RULE_WIDTH: usize = 40;
const NOT_AVAILABLE: &str = "N/A";

/// Render a dataset as the multi-line report shown by the `view` command.
///
/// Exchanges are listed per direction by descending absolute amount;
/// reference-flow outputs are marked with `*`. Inconsistent reference flow
/// declarations produce warning lines instead of errors.
pub fn format_dataset(detail: &DatasetDetail) -> String {
    let mut out = String::new();

    let field = |value: &Option<String>| value.as_deref().unwrap_or(NOT_AVAILABLE).to_string();
    let _ = writeln!(out, "\nDataset: {}", field(&detail.name));
    let _ = writeln!(out, "UUID: {}", field(&detail.identifier));
    let _ = writeln!(out, "Reference Year: {}", field(&detail.reference_year));
    let _ = writeln!(out, "Geography: {}", field(&detail.geography));
    let _ = write!(out, "Functional Unit: {}", field(&detail.functional_unit));

    if !detail.has_reference_flow {
        out.push_str("\n\nWarning: No reference flow defined for this dataset");
    }

    text_section(&mut out, "Description", detail.description.as_deref());
    text_section(&mut out, "Technology Description", detail.technology.as_deref());

    let inputs = sorted_by_magnitude(detail.inputs());
    if !inputs.is_empty() {
        heading(&mut out, "Inputs");
        for exchange in inputs {
            let _ = write!(out, "\n  {}", exchange_line(exchange));
        }
    }

    let outputs = sorted_by_magnitude(detail.outputs());
    if !outputs.is_empty() {
        heading(&mut out, "Outputs");
        for exchange in &outputs {
            let marker = if exchange.is_reference_flow { "* " } else { "  " };
            let _ = write!(out, "\n{}{}", marker, exchange_line(exchange));
        }
    }

    if detail.has_reference_flow && !outputs.iter().any(|e| e.is_reference_flow) {
        out.push_str("\n\nWarning: Reference flow ID found but no matching exchange");
    }

    out
}

fn heading(out: &mut String, title: &str) {
    let _ = write!(out, "\n\n{}:\n{}", title, "-".repeat(RULE_WIDTH));
}

fn text_section(out: &mut String, title: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        heading(out, title);
        let _ = write!(out, "\n{}", truncate(text, SECTION_TEXT_LIMIT));
    }
}

fn exchange_line(exchange: &Exchange) -> String {
    let amount = format_amount(exchange.amount);
    if exchange.unit.is_empty() {
        format!("{}: {}", exchange.flow_name, amount)
    } else {
        format!("{}: {} {}", exchange.flow_name, amount, exchange.unit)
    }
}

fn sorted_by_magnitude<'a>(exchanges: impl Iterator<Item = &'a Exchange>) -> Vec<&'a Exchange> {
    let mut sorted: Vec<&Exchange> = exchanges.collect();
    sorted.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    sorted
}
