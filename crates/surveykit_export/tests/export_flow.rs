use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use object_store::path::Path;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use surveykit_export::{
    ExportConfig, MemoryReportStore, ReportContext, ReportProfile, ReportSchema, ReportStore,
    SheetKind, StorageError, assemble_workbook, fetch_survey_records, handle_invocation,
};
use surveykit_io_xlsx::{EnumCellValue, SpecSheetGrid};

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 30)
        .and_then(|date| date.and_hms_opt(14, 5, 9))
        .expect("valid timestamp")
}

async fn seed_acme_q3(store: &MemoryReportStore) {
    let l_docs = [
        (
            "reports/acme/Q3/AI/kim.json",
            json!({
                "studentInfo": {"name": "Kim", "organization": "Acme", "major": "CS"},
                "submittedAt": "2024-09-01T09:00:00Z",
                "answers": {"Q1": 5, "Q2": "often"},
                "aiAnalysisStatus": "completed",
                "aiAnalysis": {
                    "overallScore": 4.2,
                    "summary": "An 'Explorer' learner at Level 3.",
                    "categoryScores": [
                        {"category": "Data", "score": 4.5, "percentage": 90, "level": "high"}
                    ]
                }
            }),
        ),
        (
            "reports/acme/Q3/AI/lee.json",
            json!({
                "studentInfo": {"name": "Lee", "organization": "Acme"},
                "submittedAt": "2024-09-02T09:00:00Z",
                "answers": {"Q1": 3},
                "aiAnalysisStatus": "pending"
            }),
        ),
    ];
    for (key, doc) in l_docs {
        store.seed(key, doc.to_string()).await.expect("seed");
    }
}

fn overview_value(grids: &[SpecSheetGrid], key: &str) -> EnumCellValue {
    let overview = grids
        .iter()
        .find(|grid| grid.sheet_name == SheetKind::Overview.title())
        .expect("overview sheet");
    overview
        .rows
        .iter()
        .find(|row| row[0] == EnumCellValue::from(key))
        .map(|row| row[1].clone())
        .expect("overview key")
}

#[tokio::test]
async fn end_to_end_export_succeeds() {
    let store = MemoryReportStore::new("competency-surveys");
    seed_acme_q3(&store).await;

    let event = json!({"workspace_name": "acme", "survey_name": "Q3"});
    let response = handle_invocation(&store, &ExportConfig::default(), &event, generated_at()).await;
    assert_eq!(response.status_code, 200);

    let body = response.body_json().expect("json body");
    assert_eq!(body["success"], true);
    assert_eq!(body["total_responses"], 2);
    assert_eq!(body["workspace_name"], "acme");
    assert_eq!(body["s3_key"], "exports/acme/Q3/20240930_140509.xlsx");
    assert_eq!(
        body["download_url"],
        "memory://competency-surveys/exports/acme/Q3/20240930_140509.xlsx?expires_in=604800"
    );

    let v_bytes = store
        .peek("exports/acme/Q3/20240930_140509.xlsx")
        .await
        .expect("uploaded");
    assert!(v_bytes.starts_with(b"PK"));
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn end_to_end_overview_figures() {
    let store = MemoryReportStore::default();
    seed_acme_q3(&store).await;

    let records = fetch_survey_records(&store, "acme", "Q3").await.expect("fetch");
    let context = ReportContext {
        workspace_name: "acme".to_string(),
        survey_name: "Q3".to_string(),
        generated_at: generated_at(),
    };
    let grids = assemble_workbook(&records, &context, &ReportProfile::canonical());

    assert_eq!(overview_value(&grids, "Completion rate"), EnumCellValue::from("50.0%"));
    assert_eq!(overview_value(&grids, "Average score"), EnumCellValue::from("4.20"));
    assert_eq!(ReportSchema::derive(&records).question_keys.len(), 2);
}

#[tokio::test]
async fn empty_event_is_rejected_without_storage_traffic() {
    let store = MemoryReportStore::default();
    seed_acme_q3(&store).await;

    let response = handle_invocation(&store, &ExportConfig::default(), &json!({}), generated_at()).await;
    assert_eq!(response.status_code, 400);

    let body = response.body_json().expect("json body");
    assert!(!body["message"].as_str().unwrap_or_default().is_empty());
    assert_eq!(store.read_count(), 0);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn preflight_skips_storage() {
    let store = MemoryReportStore::default();
    let event = json!({"httpMethod": "OPTIONS", "body": null});

    let response = handle_invocation(&store, &ExportConfig::default(), &event, generated_at()).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body_json().expect("json body"), json!({}));
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn missing_survey_data_is_not_found() {
    let store = MemoryReportStore::default();
    seed_acme_q3(&store).await;

    let event = json!({"body": "{\"workspace_name\": \"acme\", \"survey_name\": \"Q4\"}"});
    let response = handle_invocation(&store, &ExportConfig::default(), &event, generated_at()).await;
    assert_eq!(response.status_code, 404);

    let body = response.body_json().expect("json body");
    assert_eq!(body["error"], "No responses found");
    assert_eq!(store.write_count(), 0);
}

/// Storage operation a [`FaultyStore`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    List,
    Put,
    Sign,
}

fn injected(c_store: &'static str) -> object_store::Error {
    object_store::Error::Generic {
        store: c_store,
        source: format!("{c_store} disabled").into(),
    }
}

/// Delegates to memory except for one failing operation.
struct FaultyStore {
    inner: MemoryReportStore,
    fault: Fault,
}

impl FaultyStore {
    async fn seeded(fault: Fault) -> Self {
        let inner = MemoryReportStore::default();
        seed_acme_q3(&inner).await;
        Self { inner, fault }
    }
}

impl ReportStore for FaultyStore {
    async fn list_keys(&self, prefix: &Path) -> Result<Vec<Path>, StorageError> {
        if self.fault == Fault::List {
            return Err(StorageError::List {
                prefix: prefix.to_string(),
                source: injected("listing"),
            });
        }
        self.inner.list_keys(prefix).await
    }

    async fn get_bytes(&self, key: &Path) -> Result<Vec<u8>, StorageError> {
        self.inner.get_bytes(key).await
    }

    async fn put_bytes(&self, key: &Path, v_bytes: Vec<u8>) -> Result<(), StorageError> {
        if self.fault == Fault::Put {
            return Err(StorageError::Write {
                key: key.to_string(),
                source: injected("uploads"),
            });
        }
        self.inner.put_bytes(key, v_bytes).await
    }

    async fn signed_url(&self, key: &Path, expires_in: Duration) -> Result<String, StorageError> {
        if self.fault == Fault::Sign {
            return Err(StorageError::Sign {
                key: key.to_string(),
                source: injected("signing"),
            });
        }
        self.inner.signed_url(key, expires_in).await
    }
}

async fn export_acme_q3(store: &FaultyStore) -> (u16, Value) {
    let event = json!({"workspace_name": "acme", "survey_name": "Q3"});
    let response = handle_invocation(store, &ExportConfig::default(), &event, generated_at()).await;
    (response.status_code, response.body_json().expect("json body"))
}

#[tokio::test]
async fn upload_failure_is_internal_error() {
    let store = FaultyStore::seeded(Fault::Put).await;
    let (status, body) = export_acme_q3(&store).await;
    assert_eq!(status, 500);

    assert_eq!(body["error"], "Internal server error");
    let c_message = body["message"].as_str().unwrap_or_default();
    assert!(c_message.contains("exports/acme/Q3/20240930_140509.xlsx"));
    assert!(c_message.contains("uploads disabled"));
}

#[tokio::test]
async fn signing_failure_is_internal_error_after_upload() {
    let store = FaultyStore::seeded(Fault::Sign).await;
    let (status, body) = export_acme_q3(&store).await;
    assert_eq!(status, 500);

    assert_eq!(body["error"], "Internal server error");
    let c_message = body["message"].as_str().unwrap_or_default();
    assert!(c_message.contains("retrieval link"));
    assert!(c_message.contains("exports/acme/Q3/20240930_140509.xlsx"));
    assert!(body.get("download_url").is_none());

    // The workbook is already stored when signing fails.
    assert_eq!(store.inner.write_count(), 1);
    let v_bytes = store
        .inner
        .peek("exports/acme/Q3/20240930_140509.xlsx")
        .await
        .expect("uploaded");
    assert!(v_bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn listing_failure_is_internal_error_not_missing_data() {
    let store = FaultyStore::seeded(Fault::List).await;
    let (status, body) = export_acme_q3(&store).await;
    assert_eq!(status, 500);

    assert_eq!(body["error"], "Internal server error");
    let c_message = body["message"].as_str().unwrap_or_default();
    assert!(c_message.contains("reports/acme/Q3/AI"));
    assert!(c_message.contains("listing disabled"));
    assert_eq!(store.inner.write_count(), 0);
}

#[tokio::test]
async fn reserved_characters_round_trip_through_export() {
    let store = MemoryReportStore::default();
    store
        .seed(
            "reports/acme/Q3 #2/AI/kim%20lee.json",
            json!({"studentInfo": {"name": "Kim"}, "aiAnalysisStatus": "pending"}).to_string(),
        )
        .await
        .expect("seed");

    let event = json!({"workspace_name": "acme", "survey_name": "Q3 #2"});
    let response = handle_invocation(&store, &ExportConfig::default(), &event, generated_at()).await;
    assert_eq!(response.status_code, 200);

    let body = response.body_json().expect("json body");
    assert_eq!(body["total_responses"], 1);
    assert_eq!(body["s3_key"], "exports/acme/Q3 #2/20240930_140509.xlsx");
    assert!(
        store
            .peek("exports/acme/Q3 #2/20240930_140509.xlsx")
            .await
            .expect("uploaded")
            .starts_with(b"PK")
    );
}

#[tokio::test]
async fn path_separator_in_name_is_rejected() {
    let store = MemoryReportStore::default();
    seed_acme_q3(&store).await;

    let event = json!({"workspace_name": "acme", "survey_name": "Q3/../Q4"});
    let response = handle_invocation(&store, &ExportConfig::default(), &event, generated_at()).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(store.read_count(), 0);
}
