//! HTML table parsing into a [`TableMatrix`].
//!
//! Backends hand tables over as HTML fragments of varying hygiene. The
//! parser is regex-driven and deliberately forgiving: wrapper markup is
//! ignored, entities are decoded, row/col spans are expanded by
//! duplicating the spanned value, and ragged rows are padded with
//! missing values. Anything without a recognizable `<table>` yields
//! `None`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::alignment::matrix::{Cell, Column, TableMatrix};

static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<table[^>]*>(.*?)</table>").unwrap_or_else(|e| panic!("table regex: {e}"))
});
static ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap_or_else(|e| panic!("row regex: {e}"))
});
static CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(td|th)([^>]*)>(.*?)</(?:td|th)>")
        .unwrap_or_else(|e| panic!("cell regex: {e}"))
});
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap_or_else(|e| panic!("tag regex: {e}")));
static COLSPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)colspan\s*=\s*"?(\d+)"?"#).unwrap_or_else(|e| panic!("colspan regex: {e}"))
});
static ROWSPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)rowspan\s*=\s*"?(\d+)"?"#).unwrap_or_else(|e| panic!("rowspan regex: {e}"))
});

struct RawCell {
    value: Cell,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

fn span(attrs: &str, re: &Regex) -> usize {
    re.captures(attrs)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

fn cell_value(inner: &str) -> Cell {
    let stripped = TAG_RE.replace_all(inner, " ");
    let decoded = html_escape::decode_html_entities(stripped.as_ref());
    let text = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        Cell::Null
    } else if let Some(number) = text.parse::<f64>().ok().filter(|v| v.is_finite()) {
        Cell::Number(number)
    } else {
        Cell::Text(text)
    }
}

/// Parses the first `<table>` in `html` into a matrix.
///
/// When the first row carries `<th>` cells it becomes the column names;
/// otherwise columns are named by position ("0", "1", ...). Returns
/// `None` when no table rows with cells can be found.
pub fn matrix_from_html(html: &str) -> Option<TableMatrix> {
    let inner = TABLE_RE.captures(html)?.get(1)?.as_str();

    let rows: Vec<Vec<RawCell>> = ROW_RE
        .captures_iter(inner)
        .map(|row| {
            CELL_RE
                .captures_iter(row.get(1).map_or("", |m| m.as_str()))
                .map(|cell| RawCell {
                    value: cell_value(cell.get(3).map_or("", |m| m.as_str())),
                    is_header: cell.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("th")),
                    colspan: span(cell.get(2).map_or("", |m| m.as_str()), &COLSPAN_RE),
                    rowspan: span(cell.get(2).map_or("", |m| m.as_str()), &ROWSPAN_RE),
                })
                .collect()
        })
        .filter(|cells: &Vec<RawCell>| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return None;
    }

    // Expand spans into a dense grid, duplicating spanned values.
    let nrows = rows.len();
    let mut grid: Vec<Vec<Option<Cell>>> = vec![Vec::new(); nrows];
    for (r, cells) in rows.iter().enumerate() {
        let mut c = 0;
        for cell in cells {
            while grid[r].get(c).is_some_and(Option::is_some) {
                c += 1;
            }
            for dr in 0..cell.rowspan.min(nrows - r) {
                for dc in 0..cell.colspan {
                    let row = &mut grid[r + dr];
                    if row.len() <= c + dc {
                        row.resize(c + dc + 1, None);
                    }
                    row[c + dc] = Some(cell.value.clone());
                }
            }
            c += cell.colspan;
        }
    }

    let width = grid.iter().map(Vec::len).max()?;
    if width == 0 {
        return None;
    }
    let dense: Vec<Vec<Cell>> = grid
        .into_iter()
        .map(|mut row| {
            row.resize(width, None);
            row.into_iter().map(|c| c.unwrap_or(Cell::Null)).collect()
        })
        .collect();

    let header_row = rows[0].iter().any(|c| c.is_header);
    let (names, data): (Vec<String>, &[Vec<Cell>]) = if header_row {
        let names = dense[0]
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let name = c.display();
                if name.is_empty() { i.to_string() } else { name }
            })
            .collect();
        (names, &dense[1..])
    } else {
        ((0..width).map(|i| i.to_string()).collect(), &dense[..])
    };

    let mut matrix = TableMatrix::new();
    for (i, name) in names.into_iter().enumerate() {
        let values = data.iter().map(|row| row[i].clone()).collect();
        matrix.push_column(Column::new(name, values));
    }
    Some(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headerless_table() {
        let html = "<table><tr><td>a</td><td>1</td></tr><tr><td>b</td><td>2</td></tr></table>";
        let matrix = matrix_from_html(html).unwrap();
        assert_eq!(matrix.column_count(), 2);
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.columns()[0].name, "0");
        assert_eq!(matrix.columns()[1].values[1], Cell::Number(2.0));
    }

    #[test]
    fn th_row_becomes_column_names() {
        let html = "<table>\
            <tr><th>Site</th><th>Count</th></tr>\
            <tr><td>A</td><td>10</td></tr>\
            <tr><td>B</td><td></td></tr>\
            </table>";
        let matrix = matrix_from_html(html).unwrap();
        assert_eq!(
            matrix.column_names().collect::<Vec<_>>(),
            vec!["Site", "Count"]
        );
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.column("Count").unwrap().values[1], Cell::Null);
    }

    #[test]
    fn spans_are_expanded() {
        let html = "<table>\
            <tr><td colspan=\"2\">wide</td><td>x</td></tr>\
            <tr><td rowspan=\"2\">tall</td><td>1</td><td>2</td></tr>\
            <tr><td>3</td><td>4</td></tr>\
            </table>";
        let matrix = matrix_from_html(html).unwrap();
        assert_eq!(matrix.column_count(), 3);
        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.columns()[0].values[0], Cell::Text("wide".into()));
        assert_eq!(matrix.columns()[1].values[0], Cell::Text("wide".into()));
        assert_eq!(matrix.columns()[0].values[1], Cell::Text("tall".into()));
        assert_eq!(matrix.columns()[0].values[2], Cell::Text("tall".into()));
        assert_eq!(matrix.columns()[2].values[2], Cell::Number(4.0));
    }

    #[test]
    fn entities_and_nested_tags_are_cleaned() {
        let html = "<table><tr><td><b>5 &amp; 6</b></td><td> 7 </td></tr>\
            <tr><td>x</td><td>y</td></tr></table>";
        let matrix = matrix_from_html(html).unwrap();
        assert_eq!(matrix.columns()[0].values[0], Cell::Text("5 & 6".into()));
        assert_eq!(matrix.columns()[1].values[0], Cell::Number(7.0));
    }

    #[test]
    fn garbage_yields_none() {
        assert!(matrix_from_html("no table here").is_none());
        assert!(matrix_from_html("<table></table>").is_none());
    }
}
