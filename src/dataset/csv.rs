//! Row-oriented CSV parsing.
//!
//! Format: `label,feature_1,...,feature_n`, comma-separated, UTF-8. The first
//! non-blank row is treated as a header when any of its cells is non-numeric. Blank
//! lines are skipped. Double-quoted fields with embedded commas are accepted.

use std::str::FromStr;

/// One parsed data row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub label: usize,
    pub features: Vec<T>,
}

/// A parse failure with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvError {
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Parses `text` into rows, stopping after `limit` data rows when given.
///
/// Every row must carry the same number of features as the first one.
pub fn parse_rows<T: FromStr>(text: &str, limit: Option<usize>) -> Result<Vec<Row<T>>, CsvError> {
    let mut rows: Vec<Row<T>> = Vec::new();
    let mut width: Option<usize> = None;
    let mut first_content = true;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if std::mem::take(&mut first_content) && is_header(line) {
            log::debug!("skipping header row on line {line_no}");
            continue;
        }
        if limit.map_or(false, |l| rows.len() >= l) {
            break;
        }

        let cells = parse_csv_row(line);
        if cells.len() < 2 {
            return Err(CsvError {
                line: line_no,
                reason: format!("expected a label and at least one feature, got {} column(s)", cells.len()),
            });
        }

        let label = cells[0].trim().parse::<usize>().map_err(|_| CsvError {
            line: line_no,
            reason: format!("label '{}' is not a non-negative integer", cells[0].trim()),
        })?;
        let features = parse_numbers(&cells[1..], line_no)?;

        match width {
            None => width = Some(features.len()),
            Some(w) if w != features.len() => {
                return Err(CsvError {
                    line: line_no,
                    reason: format!("feature count {} does not match first row's {}", features.len(), w),
                });
            }
            Some(_) => {}
        }

        rows.push(Row { label, features });
    }

    Ok(rows)
}

/// Returns `true` if the row looks like a header (any cell non-numeric).
fn is_header(line: &str) -> bool {
    parse_csv_row(line).iter().any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

/// Splits a single CSV row, handling double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // escaped quote
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_numbers<T: FromStr>(cells: &[String], line: usize) -> Result<Vec<T>, CsvError> {
    cells
        .iter()
        .map(|c| {
            c.trim().parse::<T>().map_err(|_| CsvError {
                line,
                reason: format!("'{}' is not a valid number", c.trim()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_first_rows_and_skips_header() {
        let text = "label,pixel1,pixel2\n3,0,255\n\n1,12,7\n";
        let rows: Vec<Row<f64>> = parse_rows(text, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Row { label: 3, features: vec![0.0, 255.0] });
        assert_eq!(rows[1].label, 1);
    }

    #[test]
    fn header_after_leading_blank_lines() {
        let rows: Vec<Row<f64>> = parse_rows("\n  \nlabel,p1\n4,0.5\n", None).unwrap();
        assert_eq!(rows, vec![Row { label: 4, features: vec![0.5] }]);

        let err = parse_rows::<f64>("\nlabel,p1\n4,0.5\nlabel,p1\n", None).unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn headerless_input_keeps_first_row() {
        let rows: Vec<Row<f32>> = parse_rows("0,1,2\n1,3,4", None).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn limit_caps_rows() {
        let rows: Vec<Row<f64>> = parse_rows("a,b\n0,1\n1,2\n2,3\n", Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].label, 1);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_rows::<f64>("0,1,2\n1,3\n", None).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.reason.contains("does not match"));
    }

    #[test]
    fn bad_cells_are_rejected() {
        let err = parse_rows::<f64>("h1,h2\n-1,3\n", None).unwrap_err();
        assert_eq!(err.line, 2);
        let err = parse_rows::<f64>("0,1\n0,x1\n", None).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
        assert!(parse_rows::<f64>("7\n", None).is_err());
    }

    #[test]
    fn quoted_fields() {
        assert_eq!(parse_csv_row(r#"1,"2,5",3"#), vec!["1", "2,5", "3"]);
        assert_eq!(parse_csv_row(r#""a""b",c"#), vec!["a\"b", "c"]);
    }
}
