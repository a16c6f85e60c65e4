use std::cmp;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

impl<'a> Column<'a> {
    pub const fn left(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Left,
        }
    }

    pub const fn right(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Right,
        }
    }
}

const INDENT: &str = "  ";
const COLUMN_GAP: &str = "  ";
const MIN_COLUMN_WIDTH: usize = 6;

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);
    cmp::max(from_env, 40)
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{label:<label_width$}  {value}"))
        .collect()
}

/// Renders `rows` as an aligned table that fits `max_width`, wrapping long
/// cells onto extra lines. When even the header row cannot fit, each row is
/// printed as a labelled block instead.
pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let Some(widths) = fitted_widths(columns, rows, max_width) else {
        return render_blocks(columns, rows, block_label);
    };

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    let mut output = vec![format_line(columns, &header, &widths)];

    for row in rows {
        let wrapped = widths
            .iter()
            .enumerate()
            .map(|(index, width)| wrap_text(row.get(index).map_or("", String::as_str), *width))
            .collect::<Vec<Vec<String>>>();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        for line_index in 0..height {
            let cells = wrapped
                .iter()
                .map(|chunks| chunks.get(line_index).cloned().unwrap_or_default())
                .collect::<Vec<String>>();
            output.push(format_line(columns, &cells, &widths));
        }
    }

    output
}

/// Natural widths shrunk one character at a time from the widest column
/// until the table fits. `None` when the column minimums alone overflow.
fn fitted_widths(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
) -> Option<Vec<usize>> {
    let minimums = columns
        .iter()
        .map(|column| cmp::max(column.name.chars().count(), MIN_COLUMN_WIDTH))
        .collect::<Vec<usize>>();
    let mut widths = minimums.clone();
    for row in rows {
        for (slot, value) in widths.iter_mut().zip(row.iter()) {
            *slot = cmp::max(*slot, value.chars().count());
        }
    }

    let chrome = INDENT.len() + COLUMN_GAP.len() * columns.len().saturating_sub(1);
    let budget = max_width.checked_sub(chrome)?;
    if minimums.iter().sum::<usize>() > budget {
        return None;
    }

    let mut total = widths.iter().sum::<usize>();
    while total > budget {
        let widest = widths
            .iter()
            .zip(minimums.iter())
            .enumerate()
            .filter(|(_, (width, minimum))| width > minimum)
            .max_by_key(|(_, (width, _))| **width)
            .map(|(index, _)| index)?;
        widths[widest] -= 1;
        total -= 1;
    }

    Some(widths)
}

fn format_line(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(index, (column, width))| {
            let value = cells.get(index).map_or("", String::as_str);
            match column.align {
                Align::Left => format!("{value:<width$}"),
                Align::Right => format!("{value:>width$}"),
            }
        })
        .collect::<Vec<String>>();

    format!("{INDENT}{}", pieces.join(COLUMN_GAP).trim_end())
}

fn wrap_text(value: &str, width: usize) -> Vec<String> {
    if width == 0 || value.chars().count() <= width {
        return vec![value.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in value.split_whitespace() {
        let pending = current.chars().count();
        let word_len = word.chars().count();
        if pending > 0 && pending + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            continue;
        }
        if pending > 0 {
            lines.push(std::mem::take(&mut current));
        }
        if word_len <= width {
            current.push_str(word);
        } else {
            let mut chunks = split_long_token(word, width);
            if let Some(last) = chunks.pop() {
                lines.extend(chunks);
                current = last;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_token(token: &str, width: usize) -> Vec<String> {
    let characters = token.chars().collect::<Vec<char>>();
    characters
        .chunks(cmp::max(width, 1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    let labels = columns
        .iter()
        .map(|column| format!("{}:", column.name))
        .collect::<Vec<String>>();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            output.push(String::new());
        }
        output.push(format!("{INDENT}{block_label} {}:", row_index + 1));
        for (label, value) in labels.iter().zip(row.iter()) {
            output.push(format!("{INDENT}{INDENT}{label:<label_width$}  {value}"));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::{Column, key_value_rows, render_table_or_blocks, split_long_token, wrap_text};

    fn findings_columns() -> [Column<'static>; 3] {
        [
            Column::left("Date"),
            Column::right("Amount"),
            Column::left("Factors"),
        ]
    }

    #[test]
    fn key_value_rows_align_labels() {
        let rows = key_value_rows(
            &[
                ("Rows parsed:", "22".to_string()),
                ("Rows skipped:", "2".to_string()),
            ],
            2,
        );

        assert_eq!(rows, vec!["  Rows parsed:   22", "  Rows skipped:  2"]);
    }

    #[test]
    fn table_fits_natural_widths_when_space_allows() {
        let rows = vec![vec![
            "2024-01-17 03:00".to_string(),
            "-1900.00".to_string(),
            "Unusual hour".to_string(),
        ]];

        let rendered = render_table_or_blocks(&findings_columns(), &rows, 80, "Finding");
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].starts_with("  Date"));
        assert!(rendered[1].contains("-1900.00"));
        assert!(rendered[1].ends_with("Unusual hour"));
    }

    #[test]
    fn table_wraps_long_cells_without_truncating() {
        let rows = vec![vec![
            "2024-01-17 03:00".to_string(),
            "-1900.00".to_string(),
            "Extreme amount deviation (4.36 standard deviations from the batch mean)."
                .to_string(),
        ]];

        let rendered = render_table_or_blocks(&findings_columns(), &rows, 50, "Finding");
        assert!(rendered.len() > 2);
        assert!(rendered.iter().all(|line| line.chars().count() <= 50));
        assert!(rendered.iter().any(|line| line.contains("Extreme")));
        assert!(rendered.iter().any(|line| line.contains("mean).")));
    }

    #[test]
    fn narrow_width_falls_back_to_blocks() {
        let rows = vec![vec![
            "2024-01-17".to_string(),
            "-1900.00".to_string(),
            "Unusual hour".to_string(),
        ]];

        let rendered = render_table_or_blocks(&findings_columns(), &rows, 20, "Finding");
        assert_eq!(rendered[0], "  Finding 1:");
        assert!(rendered[1].contains("Date:"));
        assert!(rendered[2].contains("Amount:"));
        assert!(rendered[3].contains("Factors:"));
    }

    #[test]
    fn wrapping_counts_characters_not_bytes() {
        assert_eq!(split_long_token("₹₹₹₹", 3), vec!["₹₹₹", "₹"]);
        assert_eq!(wrap_text("Café Crème", 5), vec!["Café", "Crème"]);
    }
}
