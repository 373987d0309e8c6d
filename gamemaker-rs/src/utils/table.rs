//! Report tables for animation data

use prettytable::format::Alignment;
use prettytable::{Cell, Row, Table};

/// Create a table with bold headers and no separators between rows
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    let titles = headers.iter().map(|h| Cell::new(h).style_spec("b")).collect();
    table.set_titles(Row::new(titles));
    table
}

/// Add a row; frame counts, seconds and indices are right-aligned
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells
        .iter()
        .map(|text| Cell::new_align(text, alignment_for(text)))
        .collect();
    table.add_row(Row::new(row_cells));
}

fn alignment_for(text: &str) -> Alignment {
    let number = text.strip_suffix('s').unwrap_or(text);
    if !number.is_empty() && number.parse::<f64>().is_ok() {
        Alignment::RIGHT
    } else {
        Alignment::LEFT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_seconds_align_right() {
        assert_eq!(alignment_for("12"), Alignment::RIGHT);
        assert_eq!(alignment_for("0.250s"), Alignment::RIGHT);
        assert_eq!(alignment_for("-1"), Alignment::RIGHT);
        assert_eq!(alignment_for("raise"), Alignment::LEFT);
        assert_eq!(alignment_for("s"), Alignment::LEFT);
        assert_eq!(alignment_for("(0.000, 1.000, 0.000)"), Alignment::LEFT);
    }

    #[test]
    fn test_rows_render_under_titles() {
        let mut table = create_table(&["Frame", "Clip"]);
        add_table_row(&mut table, vec!["1".to_string(), "wave".to_string()]);
        let rendered = table.to_string();
        assert!(rendered.contains("Frame"), "{rendered}");
        assert!(rendered.contains("wave"), "{rendered}");
        assert_eq!(table.len(), 1);
    }
}
