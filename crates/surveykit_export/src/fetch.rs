//! Record fetching from the per-survey report prefix.

use object_store::path::Path;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::model::ResponseRecord;
use crate::storage::{ReportStore, parse_key};

const C_EXT_JSON: &str = ".json";

/// `reports/{workspace}/{survey}/AI/`
pub fn report_prefix(workspace_name: &str, survey_name: &str) -> String {
    format!("reports/{workspace_name}/{survey_name}/AI/")
}

fn is_json_key(key: &Path) -> bool {
    let c_key: &str = key.as_ref();
    c_key.ends_with(C_EXT_JSON)
}

/// Load every parseable record under the survey prefix, in listing order.
///
/// Documents that fail to parse are logged and skipped. Listing or read
/// failures abort the batch.
pub async fn fetch_survey_records<R: ReportStore>(
    store: &R,
    workspace_name: &str,
    survey_name: &str,
) -> Result<Vec<ResponseRecord>, StorageError> {
    let prefix = parse_key(&report_prefix(workspace_name, survey_name))?;
    let l_keys = store.list_keys(&prefix).await?;
    debug!(%prefix, n_objects = l_keys.len(), "listed report objects");

    let mut records = Vec::new();
    for key in l_keys.iter().filter(|key| is_json_key(key)) {
        let v_bytes = store.get_bytes(key).await?;
        match ResponseRecord::from_slice(&v_bytes) {
            Ok(record) => records.push(record),
            Err(err) => warn!(%key, error = %err, "skipping unparseable response record"),
        }
    }

    info!(%prefix, n_records = records.len(), "fetched response records");
    Ok(records)
}
