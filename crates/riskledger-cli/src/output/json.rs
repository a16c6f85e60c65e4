use std::io;

use riskledger_client::contracts::envelope::failure_from_error;
use riskledger_client::{ClientError, SuccessEnvelope};
use serde::Serialize;

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "analyze" | "columns" => serialize_json_pretty(success),
        _ => Err(io::Error::other(format!(
            "JSON output is not supported for command `{}`",
            success.command
        ))),
    }
}

/// Failures keep the structured `data` payload (for example the missing
/// column report) next to the error contract.
pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
