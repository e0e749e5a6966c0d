//! One export run: fetch, assemble, render, publish.

use chrono::NaiveDateTime;
use tracing::info;

use crate::assemble::{ReportProfile, assemble_workbook, render_workbook};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::fetch::fetch_survey_records;
use crate::publish::{PublishedReport, export_key, publish_workbook};
use crate::sheets::ReportContext;
use crate::storage::ReportStore;

/// Validated identifying parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub workspace_name: String,
    pub survey_name: String,
}

impl ExportRequest {
    /// Both names must be present, non-empty, and usable as one key segment.
    pub fn new(workspace_name: Option<&str>, survey_name: Option<&str>) -> Result<Self, ExportError> {
        let (Some(workspace_name), Some(survey_name)) = (workspace_name, survey_name) else {
            return Err(missing_names());
        };
        if workspace_name.is_empty() || survey_name.is_empty() {
            return Err(missing_names());
        }
        for name in [workspace_name, survey_name] {
            if !is_key_segment(name) {
                return Err(ExportError::BadRequest(format!(
                    "Name {name:?} cannot contain '/', control characters, or be '.' or '..'."
                )));
            }
        }
        Ok(Self {
            workspace_name: workspace_name.to_string(),
            survey_name: survey_name.to_string(),
        })
    }
}

fn missing_names() -> ExportError {
    ExportError::BadRequest("Workspace name and survey name are required.".to_string())
}

/// Names are embedded verbatim in storage keys, so each must form exactly one segment.
fn is_key_segment(name: &str) -> bool {
    name != "." && name != ".." && !name.contains('/') && !name.chars().any(char::is_control)
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub request: ExportRequest,
    pub published: PublishedReport,
    pub total_responses: usize,
}

/// Run one export end to end; `generated_at` stamps both the sheet and the key.
pub async fn export_survey_report<R: ReportStore>(
    store: &R,
    config: &ExportConfig,
    request: ExportRequest,
    generated_at: NaiveDateTime,
) -> Result<ExportOutcome, ExportError> {
    info!(
        workspace = %request.workspace_name,
        survey = %request.survey_name,
        "starting export"
    );

    let records = fetch_survey_records(store, &request.workspace_name, &request.survey_name).await?;
    if records.is_empty() {
        return Err(ExportError::NotFound {
            workspace_name: request.workspace_name,
            survey_name: request.survey_name,
        });
    }

    let context = ReportContext {
        workspace_name: request.workspace_name.clone(),
        survey_name: request.survey_name.clone(),
        generated_at,
    };
    let profile = ReportProfile::from(config.profile);
    let grids = assemble_workbook(&records, &context, &profile);
    let v_bytes = render_workbook(&grids)?;

    let key = export_key(&request.workspace_name, &request.survey_name, &generated_at);
    let published = publish_workbook(store, &key, v_bytes, config.link_ttl()).await?;

    info!(
        workspace = %request.workspace_name,
        survey = %request.survey_name,
        n_sheets = grids.len(),
        "export completed"
    );
    Ok(ExportOutcome {
        request,
        published,
        total_responses: records.len(),
    })
}
