//! File I/O for worksync: attendance workbooks (values and fill colours),
//! travel logs, and reconciled record output.

pub mod csv;
pub mod error;
pub mod json;
pub mod xlsx;
pub mod xlsx_styles;

pub use error::IoError;
pub use json::{read_travel_log, write_records};
pub use xlsx::load_workbook;
