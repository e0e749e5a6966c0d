//! `surveykit_export` v1:
//! Survey analysis records to a multi-sheet XLSX report.
//!
//! Modules:
//! - `model`    : lenient response record model
//! - `schema`   : first-record column layout snapshot
//! - `summary`  : learner-type / level extraction from summaries
//! - `sheets`   : per-sheet builders
//! - `assemble` : report profiles, workbook assembly and rendering
//! - `storage`  : object-storage boundary (S3 and in-memory)
//! - `fetch`    : record loading from the report prefix
//! - `publish`  : export upload and retrieval links
//! - `pipeline` : one export run end to end
//! - `handler`  : invocation decoding and responses
//! - `config`   : layered configuration
//! - `error`    : error types
pub mod assemble;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handler;
pub mod model;
pub mod pipeline;
pub mod publish;
pub mod schema;
pub mod sheets;
pub mod storage;
pub mod summary;

pub use assemble::{ReportProfile, ReportProfileKind, assemble_workbook, render_workbook};
pub use config::ExportConfig;
pub use error::{ConfigError, ExportError, StorageError};
pub use fetch::{fetch_survey_records, report_prefix};
pub use handler::{Invocation, InvocationResponse, handle_invocation};
pub use model::{AiAnalysis, AnalysisStatus, CategoryScore, ResponseRecord, Scalar, StudentInfo};
pub use pipeline::{ExportOutcome, ExportRequest, export_survey_report};
pub use publish::{PublishedReport, export_key, publish_workbook};
pub use schema::ReportSchema;
pub use sheets::{ReportContext, SheetKind};
pub use storage::{MemoryReportStore, ObjectReportStore, ReportStore, S3ReportStore, parse_key};
pub use summary::{SummaryTokens, extract_summary_tokens};
