use crate::ClientResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ColumnsData;
use crate::import::columns::detect_columns;
use crate::import::input::resolve_source;
use crate::import::parse::parse_source;

#[derive(Debug, Default)]
pub struct ColumnsRunOptions {
    pub path: Option<String>,
    pub stdin_override: Option<String>,
}

/// Runs column detection alone so a user can check a new export layout
/// before analyzing it.
pub fn run_with_options(options: ColumnsRunOptions) -> ClientResult<SuccessEnvelope> {
    let source = resolve_source(options.path, options.stdin_override, "columns")?;
    let batch = parse_source(&source.content)?;
    let columns = detect_columns(&batch.headers)?;

    let data = ColumnsData {
        path: source.source_ref,
        source_used: source.source_kind.as_str().to_string(),
        detected_headers: batch.headers,
        rows_read: batch.rows.len(),
        columns,
    };

    success("columns", data)
}
