//! Sheet builders: pure `(records, schema, context) -> SpecSheetGrid` functions.

mod ai_analysis;
mod category_scores;
mod overview;
mod respondents;
mod responses;
mod statistics;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use surveykit_io_xlsx::{EnumCellValue, SpecSheetGrid};

use crate::model::{ResponseRecord, scalar_cell};
use crate::schema::ReportSchema;

pub use ai_analysis::build_ai_analysis_sheet;
pub use category_scores::build_category_scores_sheet;
pub use overview::{build_overview_sheet, format_average_score, format_completion_rate};
pub use respondents::build_respondents_sheet;
pub use responses::build_responses_sheet;
pub use statistics::{LABEL_NOT_PROVIDED, build_statistics_sheet, score_bucket};

/// Identity of one report sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Overview,
    Respondents,
    Responses,
    CategoryScores,
    AiAnalysis,
    Statistics,
}

impl SheetKind {
    /// Tab title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Respondents => "Respondents",
            Self::Responses => "Responses",
            Self::CategoryScores => "Category Scores",
            Self::AiAnalysis => "AI Analysis",
            Self::Statistics => "Statistics",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Invocation-scoped values shared by every builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub workspace_name: String,
    pub survey_name: String,
    /// Export generation time, also used for the upload key.
    pub generated_at: NaiveDateTime,
}

/// Dispatch to the builder for `kind`.
pub fn build_sheet(
    kind: SheetKind,
    records: &[ResponseRecord],
    schema: &ReportSchema,
    context: &ReportContext,
) -> SpecSheetGrid {
    match kind {
        SheetKind::Overview => build_overview_sheet(records, context),
        SheetKind::Respondents => build_respondents_sheet(records),
        SheetKind::Responses => build_responses_sheet(records, schema),
        SheetKind::CategoryScores => build_category_scores_sheet(records, schema),
        SheetKind::AiAnalysis => build_ai_analysis_sheet(records),
        SheetKind::Statistics => build_statistics_sheet(records),
    }
}

/// Student-info fields shared by several sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StudentField {
    Name,
    Organization,
    Major,
    Age,
    Email,
    Education,
}

impl StudentField {
    /// The six identity columns, in sheet order.
    pub(crate) const ALL: [Self; 6] = [
        Self::Name,
        Self::Organization,
        Self::Major,
        Self::Age,
        Self::Email,
        Self::Education,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Organization => "Organization",
            Self::Major => "Major",
            Self::Age => "Age",
            Self::Email => "Email",
            Self::Education => "Education",
        }
    }

    pub(crate) fn cell(&self, record: &ResponseRecord) -> EnumCellValue {
        let info = &record.student_info;
        scalar_cell(match self {
            Self::Name => info.name.as_ref(),
            Self::Organization => info.organization.as_ref(),
            Self::Major => info.major.as_ref(),
            Self::Age => info.age.as_ref(),
            Self::Email => info.email.as_ref(),
            Self::Education => info.education.as_ref(),
        })
    }
}

/// Text of an optional string as a cell.
pub(crate) fn text_cell(value: Option<&str>) -> EnumCellValue {
    EnumCellValue::from(value)
}
