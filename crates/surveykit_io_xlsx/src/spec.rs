//! Shared XLSX specification models.

use std::collections::BTreeMap;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification with overlay semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Typed cell value in a sheet grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Build a text cell; empty text collapses to a blank cell.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::None
        } else {
            Self::String(value)
        }
    }

    /// Whether the cell renders as empty.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for EnumCellValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl<T> From<Option<T>> for EnumCellValue
where
    T: Into<EnumCellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit (default).
    #[default]
    None,
    /// Infer width from header cells only.
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells.
    All,
}

/// Autofit policy applied to columns without a fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected when body-based inference is active.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::None,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Header row look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumHeaderStyle {
    /// Bold text on light-gray fill.
    #[default]
    Plain,
    /// Bold white text on brand-blue fill, centered.
    Brand,
}

/// Per-sheet style directives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetStyle {
    /// Header row look.
    pub header_style: EnumHeaderStyle,
    /// Header row height in points.
    pub height_header_row: Option<f64>,
    /// Fixed column widths by zero-based column index.
    pub widths_by_col: BTreeMap<usize, f64>,
    /// Body format overrides by zero-based column index.
    pub fmts_by_col: BTreeMap<usize, SpecCellFormat>,
    /// Width inference for columns absent from `widths_by_col`.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Frozen `(rows, cols)`.
    pub freeze_panes: Option<(usize, usize)>,
}

impl SpecSheetStyle {
    /// Set the same width on a contiguous column range.
    pub fn with_width_range(mut self, cols: std::ops::Range<usize>, width: f64) -> Self {
        for n_idx_col in cols {
            self.widths_by_col.insert(n_idx_col, width);
        }
        self
    }

    /// Keep the header row visible while the body scrolls.
    pub fn with_frozen_header(mut self) -> Self {
        self.freeze_panes = Some((1, 0));
        self
    }

    /// Set widths from a slice starting at `col_start`.
    pub fn with_widths(mut self, col_start: usize, widths: &[f64]) -> Self {
        for (n_offset, width) in widths.iter().enumerate() {
            self.widths_by_col.insert(col_start + n_offset, *width);
        }
        self
    }
}

/// One sheet: single header row plus typed body grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetGrid {
    /// Requested sheet name (sanitized at write time).
    pub sheet_name: String,
    /// Header labels; defines the sheet width.
    pub header: Vec<String>,
    /// Body rows; each must be exactly `header.len()` wide.
    pub rows: Vec<Vec<EnumCellValue>>,
    /// Style directives.
    pub style: SpecSheetStyle,
}

impl SpecSheetGrid {
    /// Create an empty grid with the given header.
    pub fn new<I, S>(sheet_name: impl Into<String>, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sheet_name: sheet_name.into(),
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            style: SpecSheetStyle::default(),
        }
    }

    /// Replace style directives.
    pub fn with_style(mut self, style: SpecSheetStyle) -> Self {
        self.style = style;
        self
    }

    /// Append one body row.
    pub fn push_row(&mut self, row: Vec<EnumCellValue>) {
        self.rows.push(row);
    }

    /// Column count.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Body row count.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Body cell at zero-based `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&EnumCellValue> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Position of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|c_name| c_name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One written worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Body rows written.
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the write call.
    pub sheets: Vec<SpecSheetSummary>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
