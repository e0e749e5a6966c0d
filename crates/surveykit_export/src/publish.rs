//! Upload of rendered workbooks and retrieval-link issuance.

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::error::StorageError;
use crate::storage::{ReportStore, parse_key};

const C_FMT_EXPORT_STAMP: &str = "%Y%m%d_%H%M%S";

/// `exports/{workspace}/{survey}/{YYYYMMDD_HHMMSS}.xlsx`
pub fn export_key(workspace_name: &str, survey_name: &str, generated_at: &NaiveDateTime) -> String {
    format!(
        "exports/{workspace_name}/{survey_name}/{}.xlsx",
        generated_at.format(C_FMT_EXPORT_STAMP)
    )
}

/// Location of an uploaded export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedReport {
    pub s3_key: String,
    pub download_url: String,
}

/// Upload `v_bytes` under the raw `key`, then sign a GET link valid for `link_ttl`.
pub async fn publish_workbook<R: ReportStore>(
    store: &R,
    key: &str,
    v_bytes: Vec<u8>,
    link_ttl: Duration,
) -> Result<PublishedReport, StorageError> {
    let location = parse_key(key)?;
    let n_bytes = v_bytes.len();
    store.put_bytes(&location, v_bytes).await?;
    let download_url = store.signed_url(&location, link_ttl).await?;
    info!(%key, n_bytes, ttl_secs = link_ttl.as_secs(), "published export");

    Ok(PublishedReport {
        s3_key: key.to_string(),
        download_url,
    })
}
