use surveykit_io_xlsx::{SpecSheetGrid, SpecSheetStyle};

use super::{SheetKind, StudentField, text_cell};
use crate::model::{ResponseRecord, scalar_cell};

const L_TRAILING_HEADER: [&str; 4] = ["Submitted At", "Analysis Status", "Analyzed At", "Overall Score"];

/// One row per record with identity, timestamps, status and score.
pub fn build_respondents_sheet(records: &[ResponseRecord]) -> SpecSheetGrid {
    let header = StudentField::ALL
        .iter()
        .map(StudentField::label)
        .chain(L_TRAILING_HEADER);
    let mut grid = SpecSheetGrid::new(SheetKind::Respondents.title(), header);
    grid.style = SpecSheetStyle::default().with_width_range(0..grid.width(), 15.0);

    for record in records {
        let mut row: Vec<_> = StudentField::ALL.iter().map(|field| field.cell(record)).collect();
        row.push(text_cell(record.submitted_at.as_deref()));
        row.push(text_cell(record.ai_analysis_status.as_deref()));
        row.push(text_cell(
            record
                .ai_analysis
                .as_ref()
                .and_then(|analysis| analysis.analyzed_at.as_deref()),
        ));
        row.push(scalar_cell(record.overall_score()));
        grid.push_row(row);
    }
    grid
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use surveykit_io_xlsx::EnumCellValue;

    use super::*;
    use crate::sheets::testing::record;

    #[test]
    fn renders_ten_columns_with_blanks_for_missing_values() {
        let records = vec![
            record(json!({
                "studentInfo": {"name": "Kim", "age": 24, "email": "kim@example.com"},
                "submittedAt": "2024-05-01T10:00:00Z",
                "aiAnalysisStatus": "completed",
                "aiAnalysis": {"overallScore": 4.2, "analyzedAt": "2024-05-01T10:05:00Z"}
            })),
            record(json!({"studentInfo": {"name": "Lee"}, "aiAnalysisStatus": "pending"})),
        ];

        let grid = build_respondents_sheet(&records);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.header[6], "Submitted At");
        assert_eq!(grid.cell(0, 3), Some(&EnumCellValue::Number(24.0)));
        assert_eq!(grid.cell(0, 8), Some(&EnumCellValue::from("2024-05-01T10:05:00Z")));
        assert_eq!(grid.cell(0, 9), Some(&EnumCellValue::Number(4.2)));
        assert_eq!(grid.cell(1, 1), Some(&EnumCellValue::None));
        assert_eq!(grid.cell(1, 7), Some(&EnumCellValue::from("pending")));
        assert_eq!(grid.cell(1, 9), Some(&EnumCellValue::None));
        assert!(grid.rows.iter().all(|row| row.len() == 10));
        assert_eq!(grid.style.widths_by_col.len(), 10);
    }
}
