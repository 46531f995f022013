pub mod cell;
pub mod filter;
pub mod sheet;
pub mod workbook;

pub use cell::CellValue;
pub use filter::{RowView, SheetView, SortDirection, SortKey, SortState};
pub use sheet::{Sheet, SheetMeta};
pub use workbook::Workbook;
