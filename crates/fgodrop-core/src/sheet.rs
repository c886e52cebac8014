//! Sheet-grid decoding: header reconciliation and row filtering
//!
//! The sheet is laid out for humans: a banner row, a two-row header
//! (category labels spanning several columns above per-column sub-labels),
//! then one quest per row. This module turns that shape into a flat header
//! and sparse per-row mappings that the entity extractors can key into.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Categories whose columns are gems, pieces or monuments. Their sub-labels
/// repeat per class (剣, 弓, ...), so the category initial is appended to
/// keep the logical names distinct.
static GEM_CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(?:.石|ピース|モニュ)").unwrap());

/// Categories that contribute farmable items at all
static ITEM_CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(?:.素材|.石|ピース|モニュ)").unwrap());

/// Rows whose first cell carries one of these are layout artifacts, not
/// quests: repeated header rows and the end-of-data marker.
const SKIP_LABELS: [&str; 2] = ["エリア", "HOME"];

/// The two raw header rows reconciled into one logical header
#[derive(Debug, Clone)]
pub struct Header {
    /// Forward-filled category labels, one per column
    pub categories: Vec<String>,
    /// Logical column names, one per column
    pub columns: Vec<String>,
}

impl Header {
    /// Iterate (category, logical name) pairs for columns that name
    /// farmable items
    pub fn item_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .zip(&self.columns)
            .filter(|(category, name)| ITEM_CATEGORY.is_match(category) && !name.is_empty())
            .map(|(category, name)| (category.as_str(), name.as_str()))
    }
}

/// Combine one (category, sub-label) pair into a logical column name.
///
/// Material categories are grouping labels only, so the sub-label stands
/// alone. Gem-class categories append the category initial to the sub-label
/// (or vanish when the sub-label is empty). Everything else is a plain
/// single-row header cell.
pub fn merge_header(category: &str, sub: &str) -> String {
    if category.contains("素材") {
        sub.to_string()
    } else if GEM_CATEGORY.is_match(category) {
        if sub.is_empty() {
            String::new()
        } else {
            let initial: String = category.chars().take(1).collect();
            format!("{}{}", sub, initial)
        }
    } else {
        category.to_string()
    }
}

/// Reconcile the two raw header rows into a [`Header`].
///
/// The category row is forward-filled first: an empty cell inherits the
/// nearest non-empty label to its left. API responses drop trailing empty
/// cells, so both rows are padded to the longer one before merging.
pub fn reconcile_header(category_row: &[String], sub_row: &[String]) -> Header {
    let width = category_row.len().max(sub_row.len());
    let cell = |row: &[String], i: usize| row.get(i).cloned().unwrap_or_default();

    let mut categories = Vec::with_capacity(width);
    let mut columns = Vec::with_capacity(width);
    let mut fill = String::new();
    for i in 0..width {
        let raw = cell(category_row, i);
        if !raw.is_empty() {
            fill = raw;
        }
        let sub = cell(sub_row, i);
        columns.push(merge_header(&fill, &sub));
        categories.push(fill.clone());
    }

    Header { categories, columns }
}

/// One surviving data row: a sparse column-name-to-cell mapping
#[derive(Debug, Clone)]
pub struct TableRow {
    /// 1-based row number in the source sheet, for error reporting
    pub line: usize,
    cells: HashMap<String, String>,
}

impl TableRow {
    /// Look up a cell by logical column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Look up a cell that must be present
    pub fn require(&self, column: &str) -> Result<&str> {
        self.get(column).ok_or_else(|| Error::MissingColumn {
            row: self.line,
            column: column.to_string(),
        })
    }
}

/// Build [`TableRow`]s from the raw data rows.
///
/// Rows that are empty, start with an empty cell, or start with a reserved
/// label are dropped. Cells are keyed by logical column name; empty cells
/// are left out of the mapping entirely, and rows shorter than the header
/// are treated as ending in empty cells. `first_line` is the 1-based sheet
/// row number of `rows[0]`.
pub fn build_table(header: &Header, rows: &[Vec<String>], first_line: usize) -> Vec<TableRow> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            let first = row.first().map(String::as_str).unwrap_or("");
            !first.is_empty() && !SKIP_LABELS.contains(&first)
        })
        .map(|(i, row)| {
            let cells = header
                .columns
                .iter()
                .zip(row.iter())
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            TableRow {
                line: first_line + i,
                cells,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_header_material_uses_sub_label() {
        assert_eq!(merge_header("銅素材", "英雄の証"), "英雄の証");
        assert_eq!(merge_header("銅素材", ""), "");
    }

    #[test]
    fn test_merge_header_gem_appends_category_initial() {
        assert_eq!(merge_header("輝石", "剣"), "剣輝");
        assert_eq!(merge_header("ピース", "剣"), "剣ピ");
        assert_eq!(merge_header("モニュメント", "槍"), "槍モ");
        assert_eq!(merge_header("輝石", ""), "");
    }

    #[test]
    fn test_merge_header_other_keeps_category() {
        assert_eq!(merge_header("エリア", ""), "エリア");
        assert_eq!(merge_header("AP", "ignored"), "AP");
    }

    #[test]
    fn test_reconcile_forward_fills_categories() {
        let header = reconcile_header(
            &row(&["エリア", "銅素材", "", "輝石", ""]),
            &row(&["", "証", "骨", "剣", "弓"]),
        );
        assert_eq!(
            header.categories,
            row(&["エリア", "銅素材", "銅素材", "輝石", "輝石"])
        );
        assert_eq!(header.columns, row(&["エリア", "証", "骨", "剣輝", "弓輝"]));
    }

    #[test]
    fn test_reconcile_merges_mixed_category_row() {
        let header = reconcile_header(
            &row(&["A素材", "", "B石", ""]),
            &row(&["", "x", "", "y"]),
        );
        assert_eq!(header.categories, row(&["A素材", "A素材", "B石", "B石"]));
        assert_eq!(header.columns, row(&["", "x", "", "yB"]));
    }

    #[test]
    fn test_reconcile_pads_ragged_header_rows() {
        // trailing empty cells are dropped by the API; the shorter row is
        // padded so every category column still exists
        let header = reconcile_header(&row(&["エリア", "銅素材"]), &row(&[""]));
        assert_eq!(header.columns, row(&["エリア", ""]));

        let header = reconcile_header(&row(&["エリア"]), &row(&["", "QP"]));
        assert_eq!(header.categories, row(&["エリア", "エリア"]));
        assert_eq!(header.columns, row(&["エリア", "エリア"]));
    }

    #[test]
    fn test_item_columns_filters_by_category() {
        let header = reconcile_header(
            &row(&["エリア", "AP", "銅素材", "", "輝石", "", "ピース"]),
            &row(&["", "", "証", "", "剣", "", "剣"]),
        );
        let items: Vec<_> = header.item_columns().collect();
        // the empty material sub-label vanishes, everything else survives
        assert_eq!(
            items,
            vec![("銅素材", "証"), ("輝石", "剣輝"), ("ピース", "剣ピ")]
        );
    }

    #[test]
    fn test_item_columns_requires_prefixed_material() {
        // a bare "素材" category has no class prefix and is not an item column
        let header = reconcile_header(&row(&["素材"]), &row(&["証"]));
        assert_eq!(header.item_columns().count(), 0);
    }

    #[test]
    fn test_build_table_skips_layout_rows() {
        let header = reconcile_header(&row(&["エリア", "クエスト名"]), &row(&["", ""]));
        let rows = vec![
            row(&["冬木", "x"]),
            row(&[]),
            row(&["", "y"]),
            row(&["エリア", "クエスト名"]),
            row(&["HOME"]),
            row(&["オルレアン", "z"]),
        ];
        let table = build_table(&header, &rows, 4);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].get("エリア"), Some("冬木"));
        assert_eq!(table[0].line, 4);
        assert_eq!(table[1].get("エリア"), Some("オルレアン"));
        assert_eq!(table[1].line, 9);
    }

    #[test]
    fn test_build_table_drops_empty_cells() {
        let header = reconcile_header(&row(&["エリア", "AP", "QP"]), &row(&["", "", ""]));
        let table = build_table(&header, &[row(&["冬木", "", "9400"])], 4);
        assert_eq!(table[0].get("AP"), None);
        assert_eq!(table[0].get("QP"), Some("9400"));
    }

    #[test]
    fn test_build_table_tolerates_ragged_rows() {
        let header = reconcile_header(&row(&["エリア", "AP", "QP"]), &row(&["", "", ""]));
        let table = build_table(&header, &[row(&["冬木", "5"])], 4);
        assert_eq!(table[0].get("AP"), Some("5"));
        assert_eq!(table[0].get("QP"), None);

        // cells beyond the header width have no column to land in
        let table = build_table(&header, &[row(&["冬木", "5", "9400", "extra"])], 4);
        assert_eq!(table[0].get("QP"), Some("9400"));
    }

    #[test]
    fn test_require_reports_sheet_row() {
        let header = reconcile_header(&row(&["エリア", "クエスト名"]), &row(&["", ""]));
        let table = build_table(&header, &[row(&["冬木", ""])], 7);
        let err = table[0].require("クエスト名").unwrap_err();
        match err {
            Error::MissingColumn { row, column } => {
                assert_eq!(row, 7);
                assert_eq!(column, "クエスト名");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
