//! Invocation boundary: event decoding and status/header/body responses.
//!
//! Two event shapes are accepted: a flat object carrying `workspace_name`
//! and `survey_name`, or an HTTP envelope whose `body` holds that object
//! either pre-decoded or as a JSON string.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::pipeline::{ExportOutcome, ExportRequest, export_survey_report};
use crate::storage::ReportStore;

const C_MESSAGE_SUCCESS: &str = "Export completed";
const C_MESSAGE_NOT_FOUND: &str = "No response data found.";

/// Decoded invocation intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// CORS preflight; answered without touching storage.
    Preflight,
    Export(ExportRequest),
}

impl Invocation {
    /// Decode a raw event.
    pub fn from_event(event: &Value) -> Result<Self, ExportError> {
        let Some(envelope) = event.as_object() else {
            return Err(ExportError::BadRequest("Invocation event must be a JSON object.".to_string()));
        };

        if envelope
            .get("httpMethod")
            .and_then(Value::as_str)
            .is_some_and(|c_method| c_method.eq_ignore_ascii_case("OPTIONS"))
        {
            return Ok(Self::Preflight);
        }

        let params = match envelope.get("body") {
            None => envelope.clone(),
            Some(Value::String(c_body)) => match serde_json::from_str::<Value>(c_body) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    return Err(ExportError::BadRequest(
                        "Request body must be a JSON object.".to_string(),
                    ));
                }
            },
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(ExportError::BadRequest(
                    "Request body must be a JSON object.".to_string(),
                ));
            }
        };

        ExportRequest::new(param_str(&params, "workspace_name"), param_str(&params, "survey_name"))
            .map(Self::Export)
    }
}

fn param_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Status code, headers and JSON-encoded body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl InvocationResponse {
    fn new(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: cors_headers(),
            body: body.to_string(),
        }
    }

    /// Empty 200 answer to a preflight.
    pub fn preflight() -> Self {
        Self::new(200, &json!({}))
    }

    pub fn success(outcome: &ExportOutcome) -> Self {
        Self::new(
            200,
            &json!({
                "success": true,
                "message": C_MESSAGE_SUCCESS,
                "download_url": outcome.published.download_url,
                "s3_key": outcome.published.s3_key,
                "workspace_name": outcome.request.workspace_name,
                "survey_name": outcome.request.survey_name,
                "total_responses": outcome.total_responses,
            }),
        )
    }

    /// `{error, message}` with the status the error maps to.
    pub fn failure(err: &ExportError) -> Self {
        let c_message = match err {
            ExportError::BadRequest(c_reason) => c_reason.clone(),
            ExportError::NotFound { .. } => C_MESSAGE_NOT_FOUND.to_string(),
            _ => format!("Export failed: {err}"),
        };
        Self::new(
            err.status_code(),
            &json!({
                "error": err.label(),
                "message": c_message,
            }),
        )
    }

    /// Decoded body.
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

fn cors_headers() -> IndexMap<String, String> {
    [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type"),
        ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ]
    .into_iter()
    .map(|(c_name, c_value)| (c_name.to_string(), c_value.to_string()))
    .collect()
}

/// Handle one invocation event end to end. Never fails: every error maps to a response.
pub async fn handle_invocation<R: ReportStore>(
    store: &R,
    config: &ExportConfig,
    event: &Value,
    generated_at: NaiveDateTime,
) -> InvocationResponse {
    let request = match Invocation::from_event(event) {
        Ok(Invocation::Preflight) => return InvocationResponse::preflight(),
        Ok(Invocation::Export(request)) => request,
        Err(err) => {
            warn!(error = %err, "rejected invocation");
            return InvocationResponse::failure(&err);
        }
    };
    info!(
        workspace = %request.workspace_name,
        survey = %request.survey_name,
        "parsed invocation"
    );

    match export_survey_report(store, config, request, generated_at).await {
        Ok(outcome) => InvocationResponse::success(&outcome),
        Err(err @ ExportError::NotFound { .. }) => {
            warn!(error = %err, "nothing to export");
            InvocationResponse::failure(&err)
        }
        Err(err) => {
            error!(error = %err, "export failed");
            InvocationResponse::failure(&err)
        }
    }
}
