//! Workbook assembly: profile-ordered sheet builders rendered into one `.xlsx`.

use serde::{Deserialize, Serialize};
use surveykit_io_xlsx::{SpecSheetGrid, XlsxWriter};
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::model::ResponseRecord;
use crate::schema::ReportSchema;
use crate::sheets::{ReportContext, SheetKind, build_sheet};

/// Named sheet sets selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportProfileKind {
    /// Overview, Respondents, Responses, Category Scores, Statistics.
    #[default]
    Canonical,
    /// Overview and Category Scores only.
    Compact,
    /// Canonical plus AI Analysis after Category Scores.
    Detailed,
}

/// Ordered sheet list for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportProfile {
    sheets: Vec<SheetKind>,
}

impl ReportProfile {
    /// Custom ordering; an empty list is rejected.
    pub fn new(sheets: Vec<SheetKind>) -> Result<Self, ExportError> {
        if sheets.is_empty() {
            return Err(ExportError::Workbook(
                "report profile must include at least one sheet".to_string(),
            ));
        }
        Ok(Self { sheets })
    }

    pub fn canonical() -> Self {
        Self {
            sheets: vec![
                SheetKind::Overview,
                SheetKind::Respondents,
                SheetKind::Responses,
                SheetKind::CategoryScores,
                SheetKind::Statistics,
            ],
        }
    }

    pub fn compact() -> Self {
        Self {
            sheets: vec![SheetKind::Overview, SheetKind::CategoryScores],
        }
    }

    pub fn detailed() -> Self {
        Self {
            sheets: vec![
                SheetKind::Overview,
                SheetKind::Respondents,
                SheetKind::Responses,
                SheetKind::CategoryScores,
                SheetKind::AiAnalysis,
                SheetKind::Statistics,
            ],
        }
    }

    /// Sheets in tab order.
    pub fn sheets(&self) -> &[SheetKind] {
        &self.sheets
    }
}

impl Default for ReportProfile {
    fn default() -> Self {
        Self::canonical()
    }
}

impl From<ReportProfileKind> for ReportProfile {
    fn from(kind: ReportProfileKind) -> Self {
        match kind {
            ReportProfileKind::Canonical => Self::canonical(),
            ReportProfileKind::Compact => Self::compact(),
            ReportProfileKind::Detailed => Self::detailed(),
        }
    }
}

/// Build every profile sheet against one schema snapshot.
pub fn assemble_workbook(
    records: &[ResponseRecord],
    context: &ReportContext,
    profile: &ReportProfile,
) -> Vec<SpecSheetGrid> {
    let schema = ReportSchema::derive(records);
    debug!(
        n_questions = schema.question_keys.len(),
        n_categories = schema.categories.len(),
        "derived report schema"
    );

    profile
        .sheets()
        .iter()
        .map(|kind| build_sheet(*kind, records, &schema, context))
        .collect()
}

/// Serialize grids, in order, to `.xlsx` bytes.
pub fn render_workbook(grids: &[SpecSheetGrid]) -> Result<Vec<u8>, ExportError> {
    let mut writer = XlsxWriter::default();
    for grid in grids {
        writer.write_sheet(grid).map_err(ExportError::Workbook)?;
    }
    for c_warning in writer.report().iter().flat_map(|report| report.warnings.iter()) {
        warn!(warning = %c_warning, "workbook writer");
    }
    writer.save_to_buffer().map_err(ExportError::Workbook)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::sheets::testing::{context, record};

    fn titles(grids: &[SpecSheetGrid]) -> Vec<&str> {
        grids.iter().map(|grid| grid.sheet_name.as_str()).collect()
    }

    #[test]
    fn canonical_profile_fixes_tab_order() {
        let records = vec![record(json!({"aiAnalysisStatus": "completed"}))];
        let grids = assemble_workbook(&records, &context(), &ReportProfile::default());
        assert_eq!(
            titles(&grids),
            vec!["Overview", "Respondents", "Responses", "Category Scores", "Statistics"]
        );
    }

    #[test]
    fn profile_kinds_select_sheet_sets() {
        let compact = ReportProfile::from(ReportProfileKind::Compact);
        assert_eq!(compact.sheets(), &[SheetKind::Overview, SheetKind::CategoryScores]);

        let detailed = ReportProfile::from(ReportProfileKind::Detailed);
        assert_eq!(detailed.sheets()[4], SheetKind::AiAnalysis);
        assert_eq!(detailed.sheets().len(), 6);
    }

    #[test]
    fn empty_profile_is_rejected() {
        assert!(matches!(ReportProfile::new(Vec::new()), Err(ExportError::Workbook(_))));
        assert!(ReportProfile::new(vec![SheetKind::Statistics]).is_ok());
    }

    #[test]
    fn render_produces_xlsx_container() {
        let records = vec![
            record(json!({
                "studentInfo": {"name": "Kim", "organization": "Acme"},
                "answers": {"Q1": 5},
                "aiAnalysisStatus": "completed",
                "aiAnalysis": {
                    "overallScore": 4.2,
                    "summary": "'Explorer' at Level 2",
                    "categoryScores": [{"category": "Data", "score": 4, "percentage": 80, "level": "good"}]
                }
            })),
            record(json!({"studentInfo": {"name": "Lee"}, "aiAnalysisStatus": "pending"})),
        ];
        let grids = assemble_workbook(&records, &context(), &ReportProfile::detailed());

        let v_bytes = render_workbook(&grids).expect("renders");
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn render_rejects_empty_sheet_list() {
        assert!(matches!(render_workbook(&[]), Err(ExportError::Workbook(_))));
    }
}
