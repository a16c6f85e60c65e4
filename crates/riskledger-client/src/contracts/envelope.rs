use serde::Serialize;
use serde_json::Value;

use crate::API_VERSION;
use crate::contracts::types::ColumnDetectionFailure;
use crate::error::{ClientError, ClientResult, ColumnMappingError};

pub const COLUMN_DETECTION_FAILURE_MESSAGE: &str = "Required columns not found";

#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope {
    pub ok: bool,
    pub command: String,
    pub version: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    pub ok: bool,
    pub error: ErrorContract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorContract {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
}

pub fn success<T>(command: &str, data: T) -> ClientResult<SuccessEnvelope>
where
    T: Serialize,
{
    let json_data = serde_json::to_value(data)
        .map_err(|err| ClientError::internal_serialization(&err.to_string()))?;
    Ok(SuccessEnvelope {
        ok: true,
        command: command.to_string(),
        version: API_VERSION.to_string(),
        data: json_data,
    })
}

pub fn failure_from_error(error: &ClientError) -> FailureEnvelope {
    FailureEnvelope {
        ok: false,
        error: ErrorContract {
            code: error.code.clone(),
            message: error.message.clone(),
            recovery_steps: error.recovery_steps.clone(),
        },
        data: error.data.clone(),
    }
}

/// Field-level payload callers render when column detection fails.
pub fn column_detection_failure(error: &ColumnMappingError) -> ColumnDetectionFailure {
    ColumnDetectionFailure {
        success: false,
        error: COLUMN_DETECTION_FAILURE_MESSAGE.to_string(),
        missing: error.missing.clone(),
        detected_headers: error.detected_headers.clone(),
        suggestion: error.suggestion.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{column_detection_failure, failure_from_error, success};
    use crate::error::{ClientError, ColumnMappingError};

    #[test]
    fn success_envelope_wraps_serialized_data() {
        let envelope = success("columns", json!({ "hasDebitCredit": true }));
        assert!(envelope.is_ok());
        if let Ok(value) = envelope {
            assert!(value.ok);
            assert_eq!(value.command, "columns");
            assert_eq!(value.data["hasDebitCredit"], true);
        }
    }

    #[test]
    fn column_detection_failure_serializes_camel_case_contract() {
        let error = ColumnMappingError {
            missing: vec!["amount or debit/credit".to_string()],
            detected_headers: vec!["Date".to_string()],
            suggestion: "Add an amount column.".to_string(),
        };
        let payload = serde_json::to_value(column_detection_failure(&error));
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            assert_eq!(
                value,
                json!({
                    "success": false,
                    "error": "Required columns not found",
                    "missing": ["amount or debit/credit"],
                    "detectedHeaders": ["Date"],
                    "suggestion": "Add an amount column.",
                })
            );
        }
    }

    #[test]
    fn failure_envelope_carries_error_data() {
        let error = ClientError::invalid_import_format("nope", "unknown");
        let envelope = failure_from_error(&error);
        assert!(!envelope.ok);
        assert_eq!(envelope.error.code, "invalid_argument");
        assert!(envelope.data.is_some());
    }
}
