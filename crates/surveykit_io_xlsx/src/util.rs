//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::BTreeSet;

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecSheetGrid};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `name` if unused, else the first free `name__N` (N >= 2).
///
/// The chosen name is recorded in `existing`.
pub fn derive_unique_sheet_name(name: &str, existing: &mut BTreeSet<String>) -> String {
    if !existing.contains(name) {
        existing.insert(name.to_string());
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if !existing.contains(&candidate) {
            existing.insert(candidate.clone());
            return candidate;
        }
        n_idx += 1;
    }
}

/// Check grid dimensions against its header and Excel limits.
pub fn validate_grid_shape(grid: &SpecSheetGrid) -> Result<(), String> {
    let n_width = grid.width();
    if n_width > N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "Sheet {:?} has {n_width} columns; Excel allows {N_NCOLS_EXCEL_MAX}.",
            grid.sheet_name
        ));
    }
    // One row is taken by the header.
    if grid.height() + 1 > N_NROWS_EXCEL_MAX {
        return Err(format!(
            "Sheet {:?} has {} body rows; Excel allows {}.",
            grid.sheet_name,
            grid.height(),
            N_NROWS_EXCEL_MAX - 1
        ));
    }
    if let Some((n_idx_row, row)) = grid
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != n_width)
    {
        return Err(format!(
            "Sheet {:?} row {n_idx_row} has {} cells; header has {n_width}.",
            grid.sheet_name,
            row.len()
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidths

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                (*n as i64).to_string().len()
            } else {
                n.to_string().len()
            }
        }
    }
}

/// Width of text where non-ASCII (e.g. CJK) glyphs count 1.6 units.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Resolve final widths: fixed widths first, then autofit, else `None`.
pub fn derive_column_widths(grid: &SpecSheetGrid) -> Vec<Option<f64>> {
    let policy = &grid.style.policy_autofit;
    (0..grid.width())
        .map(|n_idx_col| {
            grid.style
                .widths_by_col
                .get(&n_idx_col)
                .copied()
                .or_else(|| derive_autofit_width(grid, n_idx_col, policy))
        })
        .collect()
}

fn derive_autofit_width(
    grid: &SpecSheetGrid,
    n_idx_col: usize,
    policy: &SpecAutofitCellsPolicy,
) -> Option<f64> {
    let (if_use_header, if_use_body) = match policy.rule_columns {
        EnumAutofitColumnsRule::None => return None,
        EnumAutofitColumnsRule::Header => (true, false),
        EnumAutofitColumnsRule::Body => (false, true),
        EnumAutofitColumnsRule::All => (true, true),
    };

    let mut n_width_recorded = 0usize;
    if if_use_header && let Some(c_header) = grid.header.get(n_idx_col) {
        n_width_recorded = estimate_unicode_string_width(c_header);
    }
    if if_use_body {
        let n_rows_inspected = policy
            .height_body_inferred_max
            .map_or(grid.height(), |n_max| usize::min(n_max, grid.height()));
        for row in grid.rows.iter().take(n_rows_inspected) {
            if let Some(value) = row.get(n_idx_col) {
                n_width_recorded = usize::max(n_width_recorded, estimate_width_len(value));
            }
        }
    }

    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    let n_width_final = usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy.width_cell_padding),
    );
    Some(n_width_final as f64)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

/// Convert a zero-based row index to the writer's row type.
pub fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

/// Convert a zero-based column index to the writer's column type.
pub fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
