//! Column layout snapshot for variable-width sheets.

use crate::model::ResponseRecord;

/// Variable column sets, derived once from the schema-defining record.
///
/// The first record in fetch order defines both sets. Later records are
/// rendered against this snapshot: keys they lack render blank and keys the
/// snapshot lacks are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSchema {
    /// Question labels in the first record's answer order.
    pub question_keys: Vec<String>,
    /// Category names in the first record's `categoryScores` order.
    pub categories: Vec<String>,
}

impl ReportSchema {
    /// Snapshot the layout from the first record; empty for an empty batch.
    pub fn derive(records: &[ResponseRecord]) -> Self {
        records.first().map(Self::from_record).unwrap_or_default()
    }

    /// Snapshot the layout from one record.
    pub fn from_record(record: &ResponseRecord) -> Self {
        let question_keys = record.answers.keys().cloned().collect();
        let categories = record
            .ai_analysis
            .as_ref()
            .map(|analysis| {
                analysis
                    .category_scores
                    .iter()
                    .map(|entry| entry.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            question_keys,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> ResponseRecord {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn derives_from_first_record_only() {
        let records = vec![
            record(json!({
                "answers": {"Q2": 1, "Q1": 2},
                "aiAnalysis": {"categoryScores": [{"category": "B"}, {"category": "A"}]}
            })),
            record(json!({
                "answers": {"Q9": 1},
                "aiAnalysis": {"categoryScores": [{"category": "Z"}]}
            })),
        ];

        let schema = ReportSchema::derive(&records);
        assert_eq!(schema.question_keys, vec!["Q2", "Q1"]);
        assert_eq!(schema.categories, vec!["B", "A"]);
    }

    #[test]
    fn first_record_without_analysis_yields_no_categories() {
        let records = vec![
            record(json!({"answers": {"Q1": 1}})),
            record(json!({"aiAnalysis": {"categoryScores": [{"category": "A"}]}})),
        ];

        let schema = ReportSchema::derive(&records);
        assert_eq!(schema.question_keys, vec!["Q1"]);
        assert!(schema.categories.is_empty());
    }

    #[test]
    fn empty_batch_yields_empty_schema() {
        assert_eq!(ReportSchema::derive(&[]), ReportSchema::default());
    }
}
