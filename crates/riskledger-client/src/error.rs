use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::contracts::envelope::column_detection_failure;

pub(crate) const ANALYZE_HELP_COMMAND: &str = "riskledger analyze --help";
pub(crate) const ANALYZE_HELP_SECTION_TITLE: &str = "Column Detection";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_analyze_help(self) -> Self {
        self.with_analyze_help_data(json!({}))
    }

    pub fn with_analyze_help_data(self, data: Value) -> Self {
        self.with_data(merge_analyze_help_data(data))
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `riskledger {cmd} --help` for usage."),
            None => "Run `riskledger --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_import_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide a CSV export with a header row, or a JSON array of objects.".to_string(),
                "Run `riskledger analyze --help` to review accepted inputs.".to_string(),
            ],
        )
        .with_analyze_help_data(json!({
            "received_format": received_format,
            "supported_formats": ["csv", "json_array"],
        }))
    }

    pub fn missing_required_columns(error: &ColumnMappingError) -> Self {
        let payload = serde_json::to_value(column_detection_failure(error)).unwrap_or_else(|_| {
            json!({
                "missing": error.missing,
                "detectedHeaders": error.detected_headers,
            })
        });

        Self::new(
            "missing_required_columns",
            &error.to_string(),
            vec![
                error.suggestion.clone(),
                "Rename or add the missing header and rerun `riskledger columns <path>` to confirm detection."
                    .to_string(),
            ],
        )
        .with_analyze_help_data(payload)
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

/// Column detection could not locate the fields every batch needs: a date and
/// at least one of amount, debit or credit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("Required columns not found: {}.", .missing.join(", "))]
pub struct ColumnMappingError {
    pub missing: Vec<String>,
    pub detected_headers: Vec<String>,
    pub suggestion: String,
}

impl From<ColumnMappingError> for ClientError {
    fn from(error: ColumnMappingError) -> Self {
        Self::missing_required_columns(&error)
    }
}

fn merge_analyze_help_data(mut data: Value) -> Value {
    if !data.is_object() {
        data = json!({});
    }

    if let Some(object) = data.as_object_mut() {
        object.insert(
            "help_command".to_string(),
            Value::String(ANALYZE_HELP_COMMAND.to_string()),
        );
        object.insert(
            "help_section_title".to_string(),
            Value::String(ANALYZE_HELP_SECTION_TITLE.to_string()),
        );
    }

    data
}

pub type ClientResult<T> = Result<T, ClientError>;
