use indexmap::IndexMap;
use surveykit_io_xlsx::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecSheetGrid, SpecSheetStyle,
};

use super::SheetKind;
use crate::model::{ResponseRecord, Scalar};

/// Bucket label for a missing or empty grouping value.
pub const LABEL_NOT_PROVIDED: &str = "not provided";

// Labels read as a 0-100 scale while thresholds compare raw 0-5 scores.
// Kept as-is pending product-owner confirmation.
const L_SCORE_BUCKETS: [(f64, &str); 4] = [(4.5, "90-100"), (4.0, "80-89"), (3.5, "70-79"), (3.0, "60-69")];
const C_BUCKET_LOWEST: &str = "under 60";

/// Histogram bucket for a raw overall score; boundaries fall upward.
pub fn score_bucket(score: f64) -> &'static str {
    L_SCORE_BUCKETS
        .iter()
        .find(|(n_threshold, _)| score >= *n_threshold)
        .map_or(C_BUCKET_LOWEST, |(_, c_label)| *c_label)
}

fn group_label(value: Option<&Scalar>) -> String {
    value
        .map(ToString::to_string)
        .filter(|c_label| !c_label.trim().is_empty())
        .unwrap_or_else(|| LABEL_NOT_PROVIDED.to_string())
}

fn count_by<'a, F>(records: &'a [ResponseRecord], key: F) -> IndexMap<String, usize>
where
    F: Fn(&'a ResponseRecord) -> Option<&'a Scalar>,
{
    let mut counts = IndexMap::new();
    for record in records {
        *counts.entry(group_label(key(record))).or_insert(0) += 1;
    }
    counts
}

fn score_histogram(records: &[ResponseRecord]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = L_SCORE_BUCKETS
        .iter()
        .map(|(_, c_label)| *c_label)
        .chain(std::iter::once(C_BUCKET_LOWEST))
        .map(|c_label| (c_label.to_string(), 0))
        .collect();
    for analysis in records.iter().filter_map(|record| record.ai_analysis.as_ref()) {
        let c_bucket = score_bucket(analysis.overall_score_or_zero());
        if let Some(n_count) = counts.get_mut(c_bucket) {
            *n_count += 1;
        }
    }
    counts
}

/// Stacked group/item/count blocks plus the score histogram.
pub fn build_statistics_sheet(records: &[ResponseRecord]) -> SpecSheetGrid {
    let l_blocks = [
        ("By organization", count_by(records, |record| record.student_info.organization.as_ref())),
        ("By education", count_by(records, |record| record.student_info.education.as_ref())),
        ("By major", count_by(records, |record| record.student_info.major.as_ref())),
        ("Score distribution", score_histogram(records)),
    ];

    let style = SpecSheetStyle {
        policy_autofit: SpecAutofitCellsPolicy {
            rule_columns: EnumAutofitColumnsRule::All,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut grid =
        SpecSheetGrid::new(SheetKind::Statistics.title(), ["Group", "Item", "Count"]).with_style(style);

    for (n_idx_block, (c_group, counts)) in l_blocks.into_iter().enumerate() {
        if n_idx_block > 0 {
            grid.push_row(vec![EnumCellValue::None; 3]);
        }
        for (n_idx_item, (c_item, n_count)) in counts.into_iter().enumerate() {
            let group = if n_idx_item == 0 {
                EnumCellValue::from(c_group)
            } else {
                EnumCellValue::None
            };
            grid.push_row(vec![group, EnumCellValue::from(c_item), EnumCellValue::from(n_count)]);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::sheets::testing::record;

    #[rstest]
    #[case(5.0, "90-100")]
    #[case(4.5, "90-100")]
    #[case(4.49, "80-89")]
    #[case(4.0, "80-89")]
    #[case(3.5, "70-79")]
    #[case(3.0, "60-69")]
    #[case(2.99, "under 60")]
    #[case(0.0, "under 60")]
    fn score_bucket_boundaries(#[case] score: f64, #[case] expected: &str) {
        assert_eq!(score_bucket(score), expected);
    }

    fn rows_as_text(grid: &SpecSheetGrid) -> Vec<[String; 3]> {
        grid.rows
            .iter()
            .map(|row| [row[0].to_string(), row[1].to_string(), row[2].to_string()])
            .collect()
    }

    #[test]
    fn blocks_stack_with_spacer_rows() {
        let records = vec![
            record(json!({
                "studentInfo": {"organization": "Acme", "education": "BSc", "major": "CS"},
                "aiAnalysis": {"overallScore": 4.6}
            })),
            record(json!({
                "studentInfo": {"organization": "Beta", "major": ""},
                "aiAnalysis": {"overallScore": "3.2"}
            })),
            record(json!({"studentInfo": {"organization": "Acme"}})),
        ];

        let grid = build_statistics_sheet(&records);
        let l_expected: Vec<[String; 3]> = [
            ["By organization", "Acme", "2"],
            ["", "Beta", "1"],
            ["", "", ""],
            ["By education", "BSc", "1"],
            ["", "not provided", "2"],
            ["", "", ""],
            ["By major", "CS", "1"],
            ["", "not provided", "2"],
            ["", "", ""],
            ["Score distribution", "90-100", "1"],
            ["", "80-89", "0"],
            ["", "70-79", "0"],
            ["", "60-69", "1"],
            ["", "under 60", "0"],
        ]
        .iter()
        .map(|row| row.map(str::to_string))
        .collect();

        assert_eq!(rows_as_text(&grid), l_expected);
        assert_eq!(grid.header, vec!["Group", "Item", "Count"]);
    }

    #[test]
    fn analysis_without_score_lands_in_lowest_bucket() {
        let records = vec![
            record(json!({"aiAnalysis": {"summary": "no score"}})),
            record(json!({"aiAnalysisStatus": "pending"})),
        ];
        let histogram = score_histogram(&records);
        assert_eq!(histogram.get(C_BUCKET_LOWEST), Some(&1));
        assert_eq!(histogram.values().sum::<usize>(), 1);
    }

    #[test]
    fn empty_batch_lists_only_histogram_buckets() {
        let grid = build_statistics_sheet(&[]);
        assert_eq!(grid.height(), 3 + 5);
        assert_eq!(grid.style.policy_autofit.rule_columns, EnumAutofitColumnsRule::All);
    }
}
