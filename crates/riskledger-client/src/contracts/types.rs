use serde::Serialize;

use crate::import::columns::ColumnDetection;
use crate::intelligence::pipeline::AnalysisSummary;
use crate::intelligence::stats::BatchStatistics;
use crate::intelligence::types::ScoredTransaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDetectionFailure {
    pub success: bool,
    pub error: String,
    pub missing: Vec<String>,
    pub detected_headers: Vec<String>,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeData {
    pub path: Option<String>,
    pub source_used: String,
    pub policy_version: String,
    pub columns: ColumnDetection,
    pub summary: AnalysisSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BatchStatistics>,
    pub transactions: Vec<ScoredTransaction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsData {
    pub path: Option<String>,
    pub source_used: String,
    pub detected_headers: Vec<String>,
    pub rows_read: usize,
    pub columns: ColumnDetection,
}
