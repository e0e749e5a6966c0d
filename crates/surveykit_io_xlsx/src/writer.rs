//! XLSX writer kernel that renders styled sheet grids into workbook output.

use std::collections::BTreeSet;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{EnumFmtKey, derive_default_xlsx_format};
use crate::spec::{
    EnumCellValue, EnumHeaderStyle, SpecCellFormat, SpecSheetGrid, SpecSheetSummary,
    SpecXlsxReport,
};
use crate::util::{
    cast_col_num, cast_row_num, derive_column_widths, derive_unique_sheet_name,
    sanitize_sheet_name, validate_grid_shape,
};

/// Stateful workbook writer.
///
/// Sheets are appended in call order, which is the tab order of the output.
pub struct XlsxWriter {
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_number: SpecCellFormat,
    fmt_header: SpecCellFormat,
    fmt_header_brand: SpecCellFormat,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new(
            derive_default_xlsx_format(EnumFmtKey::Text),
            derive_default_xlsx_format(EnumFmtKey::Number),
            derive_default_xlsx_format(EnumFmtKey::Header),
            derive_default_xlsx_format(EnumFmtKey::HeaderBrand),
        )
    }
}

impl XlsxWriter {
    /// Create writer with explicit format presets.
    ///
    /// The workbook is buffered in memory until [`Self::save_to_buffer`] is called.
    pub fn new(
        fmt_text: SpecCellFormat,
        fmt_number: SpecCellFormat,
        fmt_header: SpecCellFormat,
        fmt_header_brand: SpecCellFormat,
    ) -> Self {
        Self {
            workbook: Workbook::new(),
            fmt_text,
            fmt_number,
            fmt_header,
            fmt_header_brand,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Number of sheets written so far.
    pub fn sheet_count(&self) -> usize {
        self.l_reports.iter().map(|report| report.sheets.len()).sum()
    }

    /// Serialize the workbook to `.xlsx` bytes. The writer is closed afterwards.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, String> {
        self.ensure_can_close()?;
        let v_bytes = self
            .workbook
            .save_to_buffer()
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        Ok(v_bytes)
    }

    fn ensure_can_close(&self) -> Result<(), String> {
        if self.if_closed {
            return Err("Workbook already saved.".to_string());
        }
        if self.sheet_count() == 0 {
            return Err("Workbook has no sheets.".to_string());
        }
        Ok(())
    }

    /// Append one sheet.
    pub fn write_sheet(&mut self, grid: &SpecSheetGrid) -> Result<(), String> {
        if self.if_closed {
            return Err("Cannot write after save.".to_string());
        }
        validate_grid_shape(grid)?;

        let mut report = SpecXlsxReport::default();

        let c_sheet_name_clean = sanitize_sheet_name(&grid.sheet_name, "_");
        if c_sheet_name_clean != grid.sheet_name {
            report.warn(format!(
                "Sheet name {:?} sanitized to {c_sheet_name_clean:?}.",
                grid.sheet_name
            ));
        }
        let sheet_name_unique =
            derive_unique_sheet_name(&c_sheet_name_clean, &mut self.set_sheet_names_existing);
        if sheet_name_unique != c_sheet_name_clean {
            report.warn(format!(
                "Sheet name {c_sheet_name_clean:?} already used; wrote {sheet_name_unique:?}."
            ));
        }

        let fmt_header = derive_rust_xlsx_format(match grid.style.header_style {
            EnumHeaderStyle::Plain => &self.fmt_header,
            EnumHeaderStyle::Brand => &self.fmt_header_brand,
        });
        let l_fmt_text_by_col: Vec<Format> = (0..grid.width())
            .map(|n_idx_col| self.derive_column_format(&self.fmt_text, grid, n_idx_col))
            .collect();
        let l_fmt_number_by_col: Vec<Format> = (0..grid.width())
            .map(|n_idx_col| self.derive_column_format(&self.fmt_number, grid, n_idx_col))
            .collect();
        let l_widths = derive_column_widths(grid);

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name_unique)
            .map_err(derive_xlsx_error_text)?;

        write_header(worksheet, &grid.header, &fmt_header)?;
        if let Some(n_height) = grid.style.height_header_row {
            worksheet
                .set_row_height(0, n_height)
                .map_err(derive_xlsx_error_text)?;
        }

        for (n_idx_row, row) in grid.rows.iter().enumerate() {
            for (n_idx_col, value) in row.iter().enumerate() {
                let format = match value {
                    EnumCellValue::Number(_) => &l_fmt_number_by_col[n_idx_col],
                    _ => &l_fmt_text_by_col[n_idx_col],
                };
                write_cell_with_format(worksheet, n_idx_row + 1, n_idx_col, value, format)?;
            }
        }

        for (n_idx_col, width) in l_widths.iter().enumerate() {
            if let Some(n_width) = width {
                worksheet
                    .set_column_width(cast_col_num(n_idx_col)?, *n_width)
                    .map_err(derive_xlsx_error_text)?;
            }
        }

        if let Some((n_row_freeze, n_col_freeze)) = grid.style.freeze_panes {
            worksheet
                .set_freeze_panes(cast_row_num(n_row_freeze)?, cast_col_num(n_col_freeze)?)
                .map_err(derive_xlsx_error_text)?;
        }

        report.sheets.push(SpecSheetSummary {
            sheet_name: sheet_name_unique,
            n_rows: grid.height(),
            n_cols: grid.width(),
        });
        self.l_reports.push(report);
        Ok(())
    }

    fn derive_column_format(
        &self,
        fmt_base: &SpecCellFormat,
        grid: &SpecSheetGrid,
        n_idx_col: usize,
    ) -> Format {
        match grid.style.fmts_by_col.get(&n_idx_col) {
            Some(fmt_override) => derive_rust_xlsx_format(&fmt_base.merge(fmt_override)),
            None => derive_rust_xlsx_format(fmt_base),
        }
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    header: &[String],
    fmt_header: &Format,
) -> Result<(), String> {
    for (col_idx, cell_value) in header.iter().enumerate() {
        if cell_value.is_empty() {
            worksheet
                .write_blank(0, cast_col_num(col_idx)?, fmt_header)
                .map_err(derive_xlsx_error_text)?;
        } else {
            worksheet
                .write_string_with_format(0, cast_col_num(col_idx)?, cell_value, fmt_header)
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecSheetStyle;

    fn build_grid(name: &str) -> SpecSheetGrid {
        let mut grid = SpecSheetGrid::new(name, ["Item", "Value"])
            .with_style(SpecSheetStyle::default().with_widths(0, &[20.0, 40.0]));
        grid.push_row(vec![EnumCellValue::from("count"), EnumCellValue::from(2usize)]);
        grid.push_row(vec![EnumCellValue::from("missing"), EnumCellValue::None]);
        grid
    }

    #[test]
    fn test_save_to_buffer_emits_zip_container() {
        let mut writer = XlsxWriter::default();
        writer.write_sheet(&build_grid("Overview")).unwrap();

        let v_bytes = writer.save_to_buffer().unwrap();
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_report_tracks_sheet_order_and_renames() {
        let mut writer = XlsxWriter::default();
        writer.write_sheet(&build_grid("Overview")).unwrap();
        writer.write_sheet(&build_grid("Stats/2024")).unwrap();
        writer.write_sheet(&build_grid("Overview")).unwrap();

        let l_reports = writer.report();
        let l_names: Vec<&str> = l_reports
            .iter()
            .flat_map(|report| report.sheets.iter().map(|s| s.sheet_name.as_str()))
            .collect();
        assert_eq!(l_names, vec!["Overview", "Stats_2024", "Overview__2"]);
        assert_eq!(l_reports[1].warnings.len(), 1);
        assert_eq!(l_reports[2].warnings.len(), 1);
        assert_eq!(l_reports[0].sheets[0].n_rows, 2);
        assert_eq!(l_reports[0].sheets[0].n_cols, 2);
    }

    #[test]
    fn test_frozen_header_sheet_is_written() {
        let mut grid = build_grid("Responses");
        grid.style = grid.style.with_frozen_header();
        assert_eq!(grid.style.freeze_panes, Some((1, 0)));

        let mut writer = XlsxWriter::default();
        writer.write_sheet(&grid).unwrap();
        assert!(writer.save_to_buffer().unwrap().starts_with(b"PK"));
    }

    #[test]
    fn test_write_after_save_is_rejected() {
        let mut writer = XlsxWriter::default();
        writer.write_sheet(&build_grid("Overview")).unwrap();
        writer.save_to_buffer().unwrap();

        assert!(writer.write_sheet(&build_grid("Late")).is_err());
        assert!(writer.save_to_buffer().is_err());
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let mut writer = XlsxWriter::default();
        let err = writer.save_to_buffer().unwrap_err();
        assert!(err.contains("no sheets"), "{err}");
    }

    #[test]
    fn test_ragged_grid_is_rejected_before_adding_sheet() {
        let mut grid = build_grid("Bad");
        grid.push_row(vec![EnumCellValue::None]);

        let mut writer = XlsxWriter::default();
        assert!(writer.write_sheet(&grid).is_err());
        assert_eq!(writer.sheet_count(), 0);
    }
}
