use surveykit_io_xlsx::{EnumCellValue, SpecCellFormat, SpecSheetGrid, SpecSheetStyle};

use super::{SheetKind, StudentField, text_cell};
use crate::model::{ResponseRecord, scalar_cell};
use crate::summary::extract_summary_tokens;

const L_HEADER: [&str; 10] = [
    "Name",
    "Organization",
    "Overall Score",
    "Learner Type",
    "Level",
    "Summary",
    "Strengths",
    "Weaknesses",
    "Recommendations",
    "Analyzed At",
];
const L_WIDTHS: [f64; 10] = [12.0, 25.0, 12.0, 18.0, 10.0, 60.0, 40.0, 40.0, 40.0, 20.0];
// Summary through Recommendations.
const L_WRAPPED_COLS: std::ops::Range<usize> = 5..9;

const N_STRENGTHS_SHOWN: usize = 3;
const N_WEAKNESSES_SHOWN: usize = 3;
const N_RECOMMENDATIONS_SHOWN: usize = 2;

fn head_lines(items: &[String], n_take: usize) -> EnumCellValue {
    EnumCellValue::text(
        items
            .iter()
            .take(n_take)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Per-record analysis narrative with summary-derived tokens.
pub fn build_ai_analysis_sheet(records: &[ResponseRecord]) -> SpecSheetGrid {
    let mut style = SpecSheetStyle::default().with_widths(0, &L_WIDTHS);
    let fmt_wrap = SpecCellFormat {
        text_wrap: Some(true),
        valign: Some("top".to_string()),
        ..Default::default()
    };
    for n_idx_col in L_WRAPPED_COLS {
        style.fmts_by_col.insert(n_idx_col, fmt_wrap.clone());
    }

    let mut grid = SpecSheetGrid::new(SheetKind::AiAnalysis.title(), L_HEADER).with_style(style);
    for record in records {
        let mut row = vec![
            StudentField::Name.cell(record),
            StudentField::Organization.cell(record),
            scalar_cell(record.overall_score()),
        ];
        match &record.ai_analysis {
            Some(analysis) => {
                let tokens = analysis
                    .summary
                    .as_deref()
                    .map(extract_summary_tokens)
                    .unwrap_or_default();
                row.extend([
                    EnumCellValue::from(tokens.learner_type),
                    EnumCellValue::from(tokens.level),
                    text_cell(analysis.summary.as_deref()),
                    head_lines(&analysis.strengths, N_STRENGTHS_SHOWN),
                    head_lines(&analysis.weaknesses, N_WEAKNESSES_SHOWN),
                    head_lines(&analysis.recommendations, N_RECOMMENDATIONS_SHOWN),
                    text_cell(analysis.analyzed_at.as_deref()),
                ]);
            }
            None => row.resize(L_HEADER.len(), EnumCellValue::None),
        }
        grid.push_row(row);
    }
    grid
}
