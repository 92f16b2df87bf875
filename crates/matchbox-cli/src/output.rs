//! Command output
//!
//! Results go to stdout, diagnostics to stderr. In JSON mode each command
//! prints one JSON document and informational lines are suppressed.

use matchbox_core::domain::DirectoryEntry;
use matchbox_sync::session::Row;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

/// Formatter for the selected output format
pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

// ============================================================================
// Listing rendering
// ============================================================================

/// Formats a byte count with binary units
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One line of a human listing, prefixed with the row index
pub fn render_row(index: usize, row: &Row) -> String {
    match row {
        Row::Entry(entry) if entry.is_folder() => {
            format!("{:>4}  {:<10}  {}/", index, "<dir>", entry.name)
        }
        Row::Entry(entry) => {
            format!("{:>4}  {:<10}  {}", index, format_size(entry.size_bytes), entry.name)
        }
        Row::LoadMore => format!("{:>4}  {:<10}  (load more)", index, ""),
    }
}

/// JSON object for one entry
pub fn entry_json(index: usize, entry: &DirectoryEntry, thumbnail: bool) -> serde_json::Value {
    serde_json::json!({
        "index": index,
        "id": entry.item_id.as_str(),
        "name": entry.name,
        "path": entry.display_path,
        "kind": entry.kind.as_str(),
        "size": entry.size_bytes,
        "thumbnail": thumbnail,
    })
}
