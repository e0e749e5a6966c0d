use surveykit_io_xlsx::{EnumCellValue, SpecSheetGrid, SpecSheetStyle};

use super::{ReportContext, SheetKind};
use crate::model::{AnalysisStatus, ResponseRecord};

const C_FMT_GENERATED_AT: &str = "%Y-%m-%d %H:%M:%S";

/// `completed / total * 100` with one decimal, `"0%"` for an empty batch.
pub fn format_completion_rate(n_completed: usize, n_total: usize) -> String {
    if n_total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", n_completed as f64 / n_total as f64 * 100.0)
}

/// Mean overall score over records with an analysis, two decimals.
pub fn format_average_score(records: &[ResponseRecord]) -> String {
    let l_scores: Vec<f64> = records
        .iter()
        .filter_map(|record| record.ai_analysis.as_ref())
        .map(|analysis| analysis.overall_score_or_zero())
        .collect();

    let n_mean = if l_scores.is_empty() {
        0.0
    } else {
        l_scores.iter().sum::<f64>() / l_scores.len() as f64
    };
    format!("{n_mean:.2}")
}

pub fn build_overview_sheet(records: &[ResponseRecord], context: &ReportContext) -> SpecSheetGrid {
    let n_total = records.len();
    let n_completed = records
        .iter()
        .filter(|record| record.status() == AnalysisStatus::Completed)
        .count();

    let l_items: [(&str, EnumCellValue); 7] = [
        ("Workspace name", EnumCellValue::from(context.workspace_name.as_str())),
        ("Survey name", EnumCellValue::from(context.survey_name.as_str())),
        ("Total respondents", EnumCellValue::from(n_total)),
        ("Completed analyses", EnumCellValue::from(n_completed)),
        ("Completion rate", EnumCellValue::from(format_completion_rate(n_completed, n_total))),
        ("Average score", EnumCellValue::from(format_average_score(records))),
        (
            "Export generated at",
            EnumCellValue::from(context.generated_at.format(C_FMT_GENERATED_AT).to_string()),
        ),
    ];

    let mut grid = SpecSheetGrid::new(SheetKind::Overview.title(), ["Item", "Value"])
        .with_style(SpecSheetStyle::default().with_widths(0, &[20.0, 40.0]));
    for (c_key, value) in l_items {
        grid.push_row(vec![EnumCellValue::from(c_key), value]);
    }
    grid
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::sheets::testing::{context, record};

    fn value_of<'a>(grid: &'a SpecSheetGrid, key: &str) -> &'a EnumCellValue {
        let n_row = grid
            .rows
            .iter()
            .position(|row| row[0] == EnumCellValue::from(key))
            .expect("key row");
        &grid.rows[n_row][1]
    }

    #[rstest]
    #[case(0, 0, "0%")]
    #[case(1, 2, "50.0%")]
    #[case(1, 3, "33.3%")]
    #[case(2, 3, "66.7%")]
    #[case(3, 3, "100.0%")]
    fn completion_rate_cases(#[case] n_completed: usize, #[case] n_total: usize, #[case] expected: &str) {
        assert_eq!(format_completion_rate(n_completed, n_total), expected);
    }

    #[test]
    fn keys_are_listed_in_order() {
        let grid = build_overview_sheet(&[], &context());
        let l_keys: Vec<String> = grid.rows.iter().map(|row| row[0].to_string()).collect();
        assert_eq!(
            l_keys,
            vec![
                "Workspace name",
                "Survey name",
                "Total respondents",
                "Completed analyses",
                "Completion rate",
                "Average score",
                "Export generated at",
            ]
        );
        assert_eq!(grid.header, vec!["Item", "Value"]);
    }

    #[test]
    fn average_ignores_records_without_analysis() {
        let records = vec![
            record(json!({"aiAnalysisStatus": "completed", "aiAnalysis": {"overallScore": 4.2}})),
            record(json!({"aiAnalysisStatus": "pending"})),
        ];
        let grid = build_overview_sheet(&records, &context());

        assert_eq!(value_of(&grid, "Total respondents"), &EnumCellValue::Number(2.0));
        assert_eq!(value_of(&grid, "Completed analyses"), &EnumCellValue::Number(1.0));
        assert_eq!(value_of(&grid, "Completion rate"), &EnumCellValue::from("50.0%"));
        assert_eq!(value_of(&grid, "Average score"), &EnumCellValue::from("4.20"));
        assert_eq!(value_of(&grid, "Export generated at"), &EnumCellValue::from("2024-09-30 14:05:09"));
    }

    #[test]
    fn analysis_without_score_counts_as_zero() {
        let records = vec![
            record(json!({"aiAnalysis": {"overallScore": 4.0}})),
            record(json!({"aiAnalysis": {"summary": "no score"}})),
        ];
        assert_eq!(format_average_score(&records), "2.00");
    }

    #[test]
    fn batch_without_analyses_averages_to_zero() {
        let records = vec![record(json!({"aiAnalysisStatus": "pending"}))];
        assert_eq!(format_average_score(&records), "0.00");
        assert_eq!(format_average_score(&[]), "0.00");
    }
}
