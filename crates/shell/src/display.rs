//! Terminal rendering
//!
//! Everything here builds strings; printing is left to the binary so the
//! layout can be tested without a terminal.

use bwilcd_core::{DatasetDetail, SearchPage, Stock};
use bwilcd_formatter::{format_dataset, format_size, truncate};
use bwilcd_gateway::NodeConfig;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

use crate::session::Level;

/// Widest a table cell may get before it is cut with `...`
pub const CELL_LIMIT: usize = 60;

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

struct Column {
    title: &'static str,
    align: Align,
    style: fn(&str) -> ColoredString,
}

impl Column {
    fn new(title: &'static str, align: Align, style: fn(&str) -> ColoredString) -> Self {
        Column { title, align, style }
    }
}

/// Box-drawn table with rounded corners
struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(columns: Vec<Column>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows
            .push(row.iter().map(|cell| truncate(cell, CELL_LIMIT)).collect());
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.title.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn render(&self) -> String {
        let widths = self.widths();
        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{}{}{}\n", left, segments.join(mid), right)
        };

        let mut out = rule("╭", "┬", "╮");

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| {
                pad(column.title, width, Align::Left, |s| s.cyan().bold())
            })
            .collect();
        let _ = writeln!(out, "│ {} │", header.join(" │ "));
        out.push_str(&rule("├", "┼", "┤"));

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (column, &width))| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    pad(cell, width, column.align, column.style)
                })
                .collect();
            let _ = writeln!(out, "│ {} │", cells.join(" │ "));
        }

        out.push_str(&rule("╰", "┴", "╯"));
        out
    }
}

/// Pad on plain text so escape codes do not count towards the width
fn pad(text: &str, width: usize, align: Align, style: fn(&str) -> ColoredString) -> String {
    let fill = width.saturating_sub(text.chars().count());
    let (left, right) = match align {
        Align::Left => (0, fill),
        Align::Right => (fill, 0),
        Align::Center => (fill / 2, fill - fill / 2),
    };
    format!("{}{}{}", " ".repeat(left), style(text), " ".repeat(right))
}

// =============================================================================
// Screens
// =============================================================================

pub fn render_header() -> String {
    let title = "Brightway ILCD Network Interactive Client";
    let inner = 74;
    let line = "═".repeat(inner);
    let body = pad(title, inner, Align::Center, |s| s.cyan().bold());
    format!(
        "{}\n{}{}{}\n{}",
        format!("╔{}╗", line).cyan().bold(),
        "║".cyan().bold(),
        body,
        "║".cyan().bold(),
        format!("╚{}╝", line).cyan().bold()
    )
}

pub fn render_nodes(nodes: &[NodeConfig]) -> String {
    let mut table = Table::new(vec![
        Column::new("#", Align::Right, |s| s.green()),
        Column::new("Name", Align::Left, |s| s.yellow().bold()),
        Column::new("URL", Align::Left, |s| s.blue()),
    ]);
    for (i, node) in nodes.iter().enumerate() {
        let name = if node.has_credentials() {
            format!("{} (auth)", node.name)
        } else {
            node.name.clone()
        };
        table.push(vec![(i + 1).to_string(), name, node.url.clone()]);
    }
    format!("\n{}", table.render())
}

pub fn render_stocks(stocks: &[Stock]) -> String {
    let mut table = Table::new(vec![
        Column::new("#", Align::Right, |s| s.green()),
        Column::new("Name", Align::Left, |s| s.yellow().bold()),
        Column::new("UUID", Align::Left, |s| s.bright_black()),
        Column::new("Description", Align::Left, |s| s.white()),
    ]);
    for (i, stock) in stocks.iter().enumerate() {
        table.push(vec![
            (i + 1).to_string(),
            stock.name.clone(),
            stock.identifier.clone(),
            stock.description.clone(),
        ]);
    }
    format!(
        "\n{}\n{}",
        "📦 Available Data Stocks:".cyan().bold(),
        table.render()
    )
}

/// Number shown for the first row of zero-based page `page`
pub fn first_row_number(page: u64, page_size: u64) -> u64 {
    page * page_size + 1
}

pub fn render_stock_banner(stock: &Stock) -> String {
    format!("\n{}", format!("📂 Current Stock: {}", stock.name).cyan().bold())
}

/// Caption line above the dataset table
pub fn datasets_caption(result: &SearchPage, page: u64, page_size: u64) -> String {
    format!(
        "Datasets (Page {}, showing {} of {} results, starting at #{})",
        page + 1,
        result.len(),
        result.total_or_len(),
        first_row_number(page, page_size)
    )
}

pub fn render_datasets(result: &SearchPage, page: u64, page_size: u64, query: &str) -> String {
    if result.is_empty() {
        let message = if query.is_empty() {
            "No datasets found in this stock"
        } else {
            "No datasets found matching your search"
        };
        return format!("\n{}", format!("❌ {}", message).red());
    }

    let mut table = Table::new(vec![
        Column::new("#", Align::Right, |s| s.normal()),
        Column::new("Name", Align::Left, |s| s.green().bold()),
        Column::new("Type", Align::Left, |s| s.yellow()),
        Column::new("Location", Align::Center, |s| s.blue().bold()),
        Column::new("UUID", Align::Left, |s| s.bright_black()),
    ]);
    let first = first_row_number(page, page_size);
    for (i, dataset) in result.datasets.iter().enumerate() {
        table.push(vec![
            (first + i as u64).to_string(),
            dataset.name.clone(),
            dataset.dataset_type.clone(),
            dataset.location.clone().unwrap_or_default(),
            dataset.identifier.clone(),
        ]);
    }

    let mut out = String::new();
    if !query.is_empty() {
        let _ = writeln!(out, "\n{}", format!("🔍 Search: '{}'", query).yellow());
    }
    let _ = write!(
        out,
        "\n{}\n{}",
        format!("📊 {}", datasets_caption(result, page, page_size))
            .cyan()
            .bold(),
        table.render()
    );
    out
}

pub fn render_dataset(detail: &DatasetDetail) -> String {
    format_dataset(detail)
}

// =============================================================================
// Help
// =============================================================================

fn help_line(out: &mut String, usage: ColoredString, text: &str) {
    let padding = 20usize.saturating_sub(usage.chars().count());
    let _ = writeln!(out, "  {}{} - {}", usage, " ".repeat(padding), text);
}

pub fn render_help(level: Level) -> String {
    let mut out = format!("\n{}\n", "Commands:".cyan().bold());
    match level {
        Level::Nodes => {
            help_line(&mut out, "c|connect <number>".green(), "Connect to a node");
            help_line(&mut out, "url <custom_url>".green(), "Connect to custom URL");
            help_line(&mut out, "q|quit".red(), "Exit the program");
            help_line(&mut out, "h|help".yellow(), "Show this help");
        }
        Level::Stocks => {
            help_line(&mut out, "sl|select <number>".green(), "Select a stock to browse");
            help_line(&mut out, "d|dd <number>".green(), "Download a stock");
            help_line(&mut out, "b|back".yellow(), "Go back to nodes");
            help_line(&mut out, "r|refresh".yellow(), "Refresh stocks");
            help_line(&mut out, "q|quit".red(), "Exit");
            help_line(&mut out, "h|help".yellow(), "Show help");
        }
        Level::Datasets => {
            help_line(&mut out, "s|search <query>".green(), "Search datasets");
            help_line(&mut out, "ll".green(), "List all datasets");
            help_line(&mut out, "v|view <number>".green(), "Show dataset details");
            help_line(&mut out, "n|next".yellow(), "Next page");
            help_line(&mut out, "p|prev".yellow(), "Previous page");
            help_line(&mut out, "b|back".yellow(), "Go back to stocks");
            help_line(&mut out, "d|dd".green(), "Download current stock");
            help_line(&mut out, "q|quit".red(), "Exit");
            help_line(&mut out, "h|help".yellow(), "Show help");
        }
    }
    out
}

// =============================================================================
// Messages
// =============================================================================

pub fn render_error(message: &str) -> String {
    format!("❌ {}", message).red().bold().to_string()
}

pub fn render_notice(message: &str) -> String {
    format!("\n⚠️  {}", message).yellow().bold().to_string()
}

pub fn render_success(message: &str) -> String {
    format!("✓ {}", message).green().to_string()
}

/// Download progress line, rewritten in place; `None` without a known size
pub fn render_progress(received: u64, total: u64) -> Option<String> {
    if total == 0 {
        return None;
    }
    let percentage = received as f64 / total as f64 * 100.0;
    Some(format!("\rProgress: {:.1}%", percentage))
}

pub fn render_download_start(stock: &Stock) -> String {
    format!("\n⬇️  Downloading stock: {}...", stock.name)
        .cyan()
        .to_string()
}

pub fn render_download_done(path: &std::path::Path) -> String {
    let size = std::fs::metadata(path)
        .map(|meta| format!(" ({})", format_size(meta.len())))
        .unwrap_or_default();
    format!(
        "\n✅ Download complete!{}\n{}",
        size,
        format!("📁 Saved to: {}", path.display()).green()
    )
}
