//! Plain-text tables.

/// Render rows under a header line, optionally with a title above.
///
/// Rows shorter than the header are padded with empty cells.
pub fn render_table(title: Option<&str>, headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));
    let mut widths = vec![0usize; columns];

    for (i, h) in headers.iter().enumerate() {
        widths[i] = widths[i].max(h.chars().count());
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };

    let format_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 1));
            line.push('|');
        }
        line
    };

    let mut out = String::new();
    if let Some(title) = title {
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    if !headers.is_empty() {
        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        out.push_str(&format_row(&header_cells));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
    }
    for row in rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    out
}

/// Fixed-precision number formatting that never prints "-0.0000".
pub fn fmt_num(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![
            vec!["Call".to_string(), "Long".to_string()],
            vec!["Put".to_string(), "Short".to_string()],
        ];
        let out = render_table(Some("Positions"), &["Type", "Hold"], &rows);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Positions");
        assert_eq!(lines[1], "+------+-------+");
        assert_eq!(lines[2], "| Type | Hold  |");
        assert_eq!(lines[4], "| Call | Long  |");
        assert_eq!(lines[5], "| Put  | Short |");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let out = render_table(None, &["A", "B"], &[vec!["1".to_string()]]);
        assert!(out.contains("| 1 |   |"));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.23456, 2), "1.23");
        assert_eq!(fmt_num(-0.00001, 4), "0.0000");
        assert_eq!(fmt_num(-2.5, 1), "-2.5");
    }
}
