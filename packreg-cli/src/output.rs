//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use packreg_core::{Outcome, TableView};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Render a table view with its column headers
pub fn render(view: &TableView) -> Table {
    let mut table = create_table();
    table.set_header(view.columns().to_vec());
    for row in view.rows() {
        table.add_row(row.to_vec());
    }
    table
}

/// Print a table view, or `empty` when it has no rows
pub fn print_view(view: &TableView, empty: &str) {
    if view.is_empty() {
        println!("{}", empty.dimmed());
    } else {
        println!("{}", render(view));
    }
}

/// Report an enroll/drop/assign outcome. Returns true if it applied.
pub fn print_outcome<T>(outcome: &Outcome<T>, applied: &str) -> bool {
    match outcome {
        Outcome::Applied(_) => {
            success(applied);
            true
        }
        Outcome::Rejected(reason) => {
            warning(reason);
            false
        }
        Outcome::Invalid(reason) => {
            error(reason);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_has_header_and_rows() {
        let mut view = TableView::new(&["Name", "Section"]);
        view.push_row(vec!["CSC216".to_string(), "001".to_string()]);

        let rendered = render(&view).to_string();
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("CSC216"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_print_outcome_result() {
        assert!(print_outcome(&Outcome::Applied(()), "done"));
        assert!(!print_outcome(&Outcome::<()>::rejected("full"), "done"));
        assert!(!print_outcome(&Outcome::<()>::invalid("bad"), "done"));
    }
}
