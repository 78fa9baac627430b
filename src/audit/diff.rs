//! Cell-level diffing for change logging
//!
//! Decides whether an incoming number differs from an existing cell, and
//! renders changes for human-readable output.

use crate::models::CellValue;

/// True when writing `new` over `old` is a real change
///
/// A blank cell is never equal to a number, not even zero. A text cell that
/// does not parse as a number is likewise always different.
pub fn cell_changed(old: &CellValue, new: f64) -> bool {
    if old.is_blank() {
        return true;
    }
    match old.as_number() {
        Some(current) => current != new,
        None => true,
    }
}

/// Render an old -> new pair
pub fn describe_change(old: &CellValue, new: &CellValue) -> String {
    format!("{} -> {}", format_cell(old), format_cell(new))
}

fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Empty => "(blank)".to_string(),
        CellValue::Number(_) => value.to_string(),
        CellValue::Text(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
    }
}
