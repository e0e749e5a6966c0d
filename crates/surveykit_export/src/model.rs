//! Response record model decoded from `reports/{workspace}/{survey}/AI/*.json`.
//!
//! Records are loosely structured. Scalar fields accept numbers or strings,
//! and fields of an unexpected JSON type decode as absent instead of failing
//! the whole record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use surveykit_io_xlsx::EnumCellValue;

/// Loose scalar: a JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl Scalar {
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::Text(s)),
            _ => None,
        }
    }

    /// Numeric view; numeric strings parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Non-zero number or non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Typed cell: numbers stay numeric, text stays text.
    pub fn to_cell(&self) -> EnumCellValue {
        match self {
            Self::Number(n) => n
                .as_f64()
                .map_or_else(|| EnumCellValue::text(n.to_string()), EnumCellValue::Number),
            Self::Text(s) => EnumCellValue::text(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or_else(|| Self::Text(value.to_string()), Self::Number)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn deserialize_lenient_scalar<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::from_json(Value::deserialize(deserializer)?))
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn deserialize_lenient_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

fn deserialize_category_scores<'de, D>(deserializer: D) -> Result<Vec<CategoryScore>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn deserialize_student_info<'de, D>(deserializer: D) -> Result<StudentInfo, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => StudentInfo::default(),
    })
}

fn deserialize_ai_analysis<'de, D>(deserializer: D) -> Result<Option<AiAnalysis>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        // An empty object counts as "no analysis".
        Value::Object(map) if !map.is_empty() => serde_json::from_value(Value::Object(map)).ok(),
        _ => None,
    })
}

/// Respondent identity block (`studentInfo`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub name: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub organization: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub major: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub age: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub email: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub education: Option<Scalar>,
}

/// One competency dimension in an AI analysis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub score: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub percentage: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub level: Option<Scalar>,
}

impl CategoryScore {
    /// Category name, empty when absent.
    pub fn name(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }
}

/// AI-generated analysis attached to a response (`aiAnalysis`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    #[serde(default, deserialize_with = "deserialize_lenient_scalar")]
    pub overall_score: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_strings")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_strings")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_category_scores")]
    pub category_scores: Vec<CategoryScore>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub analyzed_at: Option<String>,
}

impl AiAnalysis {
    /// Numeric overall score; absent or non-numeric counts as zero.
    pub fn overall_score_or_zero(&self) -> f64 {
        self.overall_score
            .as_ref()
            .and_then(Scalar::as_f64)
            .unwrap_or(0.0)
    }

    /// Category entry by exact name.
    pub fn category(&self, name: &str) -> Option<&CategoryScore> {
        self.category_scores
            .iter()
            .find(|entry| entry.category.as_deref() == Some(name))
    }
}

/// Analysis lifecycle of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Pending,
    Completed,
    Failed,
    Absent,
}

impl AnalysisStatus {
    /// Parse the raw status; unknown values map to `Absent`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("pending") => Self::Pending,
            Some("completed") => Self::Completed,
            Some("failed") => Self::Failed,
            _ => Self::Absent,
        }
    }
}

/// One respondent's submission.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(default, deserialize_with = "deserialize_student_info")]
    pub student_info: StudentInfo,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub submitted_at: Option<String>,
    /// Question label -> answer, in document order.
    #[serde(default, deserialize_with = "deserialize_lenient_object")]
    pub answers: Map<String, Value>,
    /// Raw status text, rendered verbatim.
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub ai_analysis_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_ai_analysis")]
    pub ai_analysis: Option<AiAnalysis>,
}

impl ResponseRecord {
    /// Decode one JSON document. Anything but a JSON object is rejected.
    pub fn from_slice(v_bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(v_bytes)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_type_name(&value)
            )));
        }
        serde_json::from_value(value)
    }

    pub fn status(&self) -> AnalysisStatus {
        AnalysisStatus::parse(self.ai_analysis_status.as_deref())
    }

    /// Overall score for display; absent when there is no analysis.
    pub fn overall_score(&self) -> Option<&Scalar> {
        self.ai_analysis
            .as_ref()
            .and_then(|analysis| analysis.overall_score.as_ref())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render an answer value as a cell.
pub fn answer_cell(value: Option<&Value>) -> EnumCellValue {
    match value {
        None | Some(Value::Null) => EnumCellValue::None,
        Some(Value::String(s)) => EnumCellValue::text(s.clone()),
        Some(Value::Number(n)) => n
            .as_f64()
            .map_or_else(|| EnumCellValue::text(n.to_string()), EnumCellValue::Number),
        Some(Value::Bool(b)) => EnumCellValue::text(b.to_string()),
        Some(other) => EnumCellValue::text(other.to_string()),
    }
}

/// Render an optional scalar as a cell.
pub fn scalar_cell(value: Option<&Scalar>) -> EnumCellValue {
    value.map_or(EnumCellValue::None, Scalar::to_cell)
}
