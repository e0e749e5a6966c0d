//! `surveykit_io_xlsx` v1:
//! Styled-grid XLSX writer kernel.
//!
//! Modules:
//! - `conf`   : constants and default format presets
//! - `spec`   : sheet grid, style and report models
//! - `util`   : pure helper functions
//! - `writer` : stateful workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_COLOR_HEADER_FILL, C_COLOR_HEADER_FILL_BRAND, C_COLOR_HEADER_FONT_BRAND, EnumFmtKey,
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, EnumHeaderStyle, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecSheetGrid, SpecSheetStyle, SpecSheetSummary, SpecXlsxReport,
};
pub use util::{
    derive_column_widths, derive_unique_sheet_name, estimate_unicode_string_width,
    sanitize_sheet_name, validate_grid_shape,
};
pub use writer::XlsxWriter;
