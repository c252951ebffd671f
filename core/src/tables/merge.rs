use super::Table;
use crate::error::Result;
use std::collections::{HashMap, HashSet};

/// Outer join of two tables on column `on`
///
/// Output columns are the left columns followed by the right columns other
/// than `on`. A non-key column present on both sides is renamed with a `_x`
/// (left) or `_y` (right) suffix. Rows sharing a key are combined (every
/// pairing when a key repeats); rows without a partner keep empty cells for
/// the other side. Rows are ordered by key.
///
/// # Errors
///
/// Returns `ColumnNotFound` if either table lacks `on`.
///
/// # Example
///
/// ```
/// use cxrprep_core::tables::{outer_join, Table};
///
/// let s = |v: &[&str]| v.iter().map(|c| c.to_string()).collect::<Vec<_>>();
/// let cases = Table::new(s(&["ID", "Report"]), vec![s(&["A", "ok"]), s(&["B", "ok"])]);
/// let labels = Table::new(s(&["ID", "asthma"]), vec![s(&["B", "true"]), s(&["C", "false"])]);
///
/// let merged = outer_join(&cases, &labels, "ID").unwrap();
/// assert_eq!(merged.headers(), &["ID", "Report", "asthma"]);
/// assert_eq!(merged.rows()[0], s(&["A", "ok", ""]));
/// assert_eq!(merged.rows()[1], s(&["B", "ok", "true"]));
/// assert_eq!(merged.rows()[2], s(&["C", "", "false"]));
/// ```
pub fn outer_join(left: &Table, right: &Table, on: &str) -> Result<Table> {
    let left_key = left.column_index(on)?;
    let right_key = right.column_index(on)?;

    let left_names: HashSet<&str> = non_key(left.headers(), left_key)
        .map(|i| left.headers()[i].as_str())
        .collect();
    let right_names: HashSet<&str> = non_key(right.headers(), right_key)
        .map(|i| right.headers()[i].as_str())
        .collect();
    let right_columns: Vec<usize> = non_key(right.headers(), right_key).collect();

    let mut headers: Vec<String> = left
        .headers()
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i != left_key && right_names.contains(h.as_str()) {
                format!("{}_x", h)
            } else {
                h.clone()
            }
        })
        .collect();
    headers.extend(right_columns.iter().map(|&i| {
        let h = &right.headers()[i];
        if left_names.contains(h.as_str()) {
            format!("{}_y", h)
        } else {
            h.clone()
        }
    }));

    let mut right_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, row) in right.rows().iter().enumerate() {
        right_by_key.entry(cell(row, right_key)).or_default().push(idx);
    }

    let right_values = |row: &Vec<String>| -> Vec<String> {
        right_columns
            .iter()
            .map(|&i| cell(row, i).to_string())
            .collect()
    };

    let mut matched = vec![false; right.rows().len()];
    let mut merged: Vec<(String, Vec<String>)> = Vec::new();

    for left_row in left.rows() {
        let key = cell(left_row, left_key);
        let mut base: Vec<String> = (0..left.headers().len())
            .map(|i| cell(left_row, i).to_string())
            .collect();

        match right_by_key.get(key) {
            Some(indices) => {
                for &idx in indices {
                    matched[idx] = true;
                    let mut row = base.clone();
                    row.extend(right_values(&right.rows()[idx]));
                    merged.push((key.to_string(), row));
                }
            }
            None => {
                base.extend(std::iter::repeat(String::new()).take(right_columns.len()));
                merged.push((key.to_string(), base));
            }
        }
    }

    for (idx, right_row) in right.rows().iter().enumerate() {
        if matched[idx] {
            continue;
        }
        let key = cell(right_row, right_key);
        let mut row = vec![String::new(); left.headers().len()];
        row[left_key] = key.to_string();
        row.extend(right_values(right_row));
        merged.push((key.to_string(), row));
    }

    merged.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(Table::new(
        headers,
        merged.into_iter().map(|(_, row)| row).collect(),
    ))
}

fn non_key(headers: &[String], key: usize) -> impl Iterator<Item = usize> {
    (0..headers.len()).filter(move |&i| i != key)
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
