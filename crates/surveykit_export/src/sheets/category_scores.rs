use surveykit_io_xlsx::{EnumCellValue, EnumHeaderStyle, SpecSheetGrid, SpecSheetStyle};

use super::{SheetKind, StudentField};
use crate::model::{CategoryScore, ResponseRecord, Scalar, scalar_cell};
use crate::schema::ReportSchema;

const L_FIXED_FIELDS: [StudentField; 3] = [StudentField::Name, StudentField::Organization, StudentField::Major];
const L_FIXED_WIDTHS: [f64; 4] = [12.0, 25.0, 15.0, 12.0];
const L_TRIPLE_WIDTHS: [f64; 3] = [12.0, 12.0, 10.0];
const N_HEIGHT_HEADER: f64 = 25.0;

/// `"{value}%"` for a truthy percentage, blank otherwise.
fn percentage_cell(value: Option<&Scalar>) -> EnumCellValue {
    match value {
        Some(scalar) if scalar.is_truthy() => EnumCellValue::text(format!("{scalar}%")),
        _ => EnumCellValue::None,
    }
}

fn category_triple(entry: Option<&CategoryScore>) -> [EnumCellValue; 3] {
    match entry {
        Some(entry) => [
            scalar_cell(entry.score.as_ref()),
            percentage_cell(entry.percentage.as_ref()),
            scalar_cell(entry.level.as_ref()),
        ],
        None => Default::default(),
    }
}

/// Identity and overall score, then one score/percentage/level triple per
/// schema category.
pub fn build_category_scores_sheet(records: &[ResponseRecord], schema: &ReportSchema) -> SpecSheetGrid {
    let header = L_FIXED_FIELDS
        .iter()
        .map(|field| field.label().to_string())
        .chain(std::iter::once("Overall Score".to_string()))
        .chain(schema.categories.iter().flat_map(|c_category| {
            [
                format!("{c_category}_score"),
                format!("{c_category}_percentage"),
                format!("{c_category}_level"),
            ]
        }));

    let mut style = SpecSheetStyle {
        header_style: EnumHeaderStyle::Brand,
        height_header_row: Some(N_HEIGHT_HEADER),
        ..Default::default()
    }
    .with_widths(0, &L_FIXED_WIDTHS)
    .with_frozen_header();
    for n_idx in 0..schema.categories.len() {
        style = style.with_widths(L_FIXED_WIDTHS.len() + n_idx * 3, &L_TRIPLE_WIDTHS);
    }

    let mut grid = SpecSheetGrid::new(SheetKind::CategoryScores.title(), header).with_style(style);
    for record in records {
        let mut row: Vec<_> = L_FIXED_FIELDS.iter().map(|field| field.cell(record)).collect();
        row.push(scalar_cell(record.overall_score()));
        for c_category in &schema.categories {
            let entry = record
                .ai_analysis
                .as_ref()
                .and_then(|analysis| analysis.category(c_category));
            row.extend(category_triple(entry));
        }
        grid.push_row(row);
    }
    grid
}
