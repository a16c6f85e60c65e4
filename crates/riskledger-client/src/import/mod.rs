pub mod amount;
pub mod columns;
pub mod date;
pub(crate) mod input;
pub mod normalize;
pub(crate) mod parse;

use std::collections::BTreeMap;

use crate::ClientError;

/// One source record keyed by its original header text.
pub type RawRow = BTreeMap<String, String>;

/// Decoded upload: the header row in source order plus every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

pub(crate) fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide a CSV export or a JSON array via path or stdin.".to_string(),
            "Run `riskledger analyze --help` to confirm accepted inputs.".to_string(),
        ],
    )
    .with_analyze_help()
}
