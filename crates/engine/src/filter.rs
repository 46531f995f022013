//! Search and sort - Row View Layer
//!
//! Maps between view space (what the user sees, affected by sort/search)
//! and data space (the sheet's data rows, 0..N-1, header excluded).
//!
//! Key invariants:
//! - visible_mask is indexed by DATA row (not view row)
//! - Sorting never changes visibility and vice versa
//! - Sorts are stable; ties keep data order

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::sheet::Sheet;

// =============================================================================
// RowView: The core view layer mapping
// =============================================================================

/// Row view layer: maps between view space and data space
#[derive(Debug, Clone)]
pub struct RowView {
    /// Maps view_row index -> data_row index
    row_order: Vec<usize>,

    /// Visibility mask indexed by DATA row
    visible_mask: Vec<bool>,

    /// Cached list of visible VIEW row indices
    visible_rows: Vec<usize>,
}

impl Default for RowView {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RowView {
    /// Initialize identity mapping for N rows
    pub fn new(row_count: usize) -> Self {
        Self {
            row_order: (0..row_count).collect(),
            visible_mask: vec![true; row_count],
            visible_rows: (0..row_count).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_order.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn view_to_data(&self, view_row: usize) -> usize {
        self.row_order[view_row]
    }

    pub fn is_data_row_visible(&self, data_row: usize) -> bool {
        data_row < self.visible_mask.len() && self.visible_mask[data_row]
    }

    /// Visible view rows, in display order
    pub fn visible_rows(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Visible data rows, in display order
    pub fn visible_data_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible_rows.iter().map(|&view_row| self.row_order[view_row])
    }

    pub fn is_filtered(&self) -> bool {
        self.visible_count() < self.row_count()
    }

    /// Is the view sorted (non-identity order)?
    pub fn is_sorted(&self) -> bool {
        self.row_order.iter().enumerate().any(|(i, &d)| i != d)
    }

    pub fn row_order(&self) -> &[usize] {
        &self.row_order
    }

    fn rebuild_visible_cache(&mut self) {
        self.visible_rows = self
            .row_order
            .iter()
            .enumerate()
            .filter_map(|(view_row, &data_row)| {
                if data_row < self.visible_mask.len() && self.visible_mask[data_row] {
                    Some(view_row)
                } else {
                    None
                }
            })
            .collect();
    }

    /// Apply a sort permutation mapping new_view_row -> data_row
    pub fn apply_sort(&mut self, permutation: Vec<usize>) {
        debug_assert_eq!(permutation.len(), self.row_order.len());
        self.row_order = permutation;
        self.rebuild_visible_cache();
    }

    pub fn clear_sort(&mut self) {
        self.row_order = (0..self.row_order.len()).collect();
        self.rebuild_visible_cache();
    }

    /// Apply visibility (mask indexed by data row)
    pub fn apply_filter(&mut self, visible_mask: Vec<bool>) {
        debug_assert_eq!(visible_mask.len(), self.row_order.len());
        self.visible_mask = visible_mask;
        self.rebuild_visible_cache();
    }

    pub fn clear_filter(&mut self) {
        self.visible_mask = vec![true; self.row_order.len()];
        self.rebuild_visible_cache();
    }
}

// =============================================================================
// SortKey: typed key for stable, deterministic sorting
// =============================================================================

/// Normalized cell value used for ordering
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Blank,
    Bool(bool),
    Number(OrderedFloat<f64>),
    /// Trimmed + lowercase
    Text(String),
}

/// Key for sorting rows
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    /// Type rank: Numbers(0) < Dates(1) < Text(2) < Bool(3) < Blank(4)
    pub type_rank: u8,
    pub value: SortValue,
}

impl SortKey {
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::Number(n) => Self {
                type_rank: 0,
                value: SortValue::Number(OrderedFloat(*n)),
            },
            CellValue::DateTime(dt) => Self {
                type_rank: 1,
                value: SortValue::Number(OrderedFloat(dt.and_utc().timestamp() as f64)),
            },
            CellValue::Text(s) if !s.trim().is_empty() => Self {
                type_rank: 2,
                value: SortValue::Text(s.trim().to_lowercase()),
            },
            CellValue::Bool(b) => Self {
                type_rank: 3,
                value: SortValue::Bool(*b),
            },
            CellValue::Text(_) | CellValue::Empty => Self {
                type_rank: 4,
                value: SortValue::Blank,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Current sort state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// Stable permutation of `data_rows` ordered by `col`.
///
/// Equal keys keep data order in both directions.
pub fn sort_permutation(data_rows: &[Vec<CellValue>], col: usize, direction: SortDirection) -> Vec<usize> {
    let blank = CellValue::Empty;
    let keys: Vec<SortKey> = data_rows
        .iter()
        .map(|row| SortKey::from_cell(row.get(col).unwrap_or(&blank)))
        .collect();

    let mut order: Vec<usize> = (0..data_rows.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = keys[a].cmp(&keys[b]);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    order
}

/// Data rows containing `term` in any cell's displayed text (case-insensitive).
/// An empty term matches every row.
pub fn search_mask(data_rows: &[Vec<CellValue>], term: &str) -> Vec<bool> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return vec![true; data_rows.len()];
    }
    data_rows
        .iter()
        .map(|row| {
            row.iter()
                .any(|cell| cell.display().to_lowercase().contains(&needle))
        })
        .collect()
}

// =============================================================================
// SheetView: what the grid viewer shows for one sheet
// =============================================================================

/// Searchable, sortable view over a sheet's first `max_rows` data rows.
///
/// A view belongs to one sheet; switching sheets means building a fresh
/// view, which starts with no search and no sort.
#[derive(Debug, Clone)]
pub struct SheetView<'a> {
    sheet: &'a Sheet,
    data_rows: &'a [Vec<CellValue>],
    search: String,
    sort: Option<SortState>,
    row_view: RowView,
}

impl<'a> SheetView<'a> {
    pub fn new(sheet: &'a Sheet, max_rows: usize) -> Self {
        let all = sheet.data_rows();
        let data_rows = &all[..all.len().min(max_rows)];
        Self {
            sheet,
            data_rows,
            search: String::new(),
            sort: None,
            row_view: RowView::new(data_rows.len()),
        }
    }

    pub fn sheet(&self) -> &'a Sheet {
        self.sheet
    }

    pub fn headers(&self) -> &'a [CellValue] {
        self.sheet.header()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        if term.trim().is_empty() {
            self.row_view.clear_filter();
        } else {
            self.row_view.apply_filter(search_mask(self.data_rows, term));
        }
    }

    /// Clicking a column header: the active column flips direction, any
    /// other column starts ascending.
    pub fn toggle_sort(&mut self, column: usize) -> SortState {
        let direction = match self.sort {
            Some(state) if state.column == column => state.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort_by(column, direction)
    }

    pub fn sort_by(&mut self, column: usize, direction: SortDirection) -> SortState {
        let state = SortState { column, direction };
        self.row_view
            .apply_sort(sort_permutation(self.data_rows, column, direction));
        self.sort = Some(state);
        state
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.row_view.clear_sort();
    }

    /// Rows available to the view (after the row cap, before search)
    pub fn row_count(&self) -> usize {
        self.row_view.row_count()
    }

    pub fn visible_count(&self) -> usize {
        self.row_view.visible_count()
    }

    /// Visible rows in display order
    pub fn visible_rows(&self) -> impl Iterator<Item = &'a [CellValue]> + '_ {
        let data_rows = self.data_rows;
        self.row_view
            .visible_data_rows()
            .map(move |data_row| data_rows[data_row].as_slice())
    }
}
