use surveykit_io_xlsx::{SpecSheetGrid, SpecSheetStyle};

use super::{SheetKind, StudentField};
use crate::model::{ResponseRecord, answer_cell};
use crate::schema::ReportSchema;

/// Student-info columns followed by one column per schema question.
pub fn build_responses_sheet(records: &[ResponseRecord], schema: &ReportSchema) -> SpecSheetGrid {
    let n_fixed = StudentField::ALL.len();
    let header = StudentField::ALL
        .iter()
        .map(|field| field.label().to_string())
        .chain(schema.question_keys.iter().cloned());

    let mut grid = SpecSheetGrid::new(SheetKind::Responses.title(), header);
    grid.style = SpecSheetStyle::default()
        .with_width_range(0..n_fixed, 15.0)
        .with_width_range(n_fixed..grid.width(), 30.0)
        .with_frozen_header();

    for record in records {
        let row = StudentField::ALL
            .iter()
            .map(|field| field.cell(record))
            .chain(
                schema
                    .question_keys
                    .iter()
                    .map(|c_key| answer_cell(record.answers.get(c_key))),
            )
            .collect();
        grid.push_row(row);
    }
    grid
}
