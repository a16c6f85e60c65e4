use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::import::{RawBatch, RawRow, invalid_input_error};
use crate::{ClientError, ClientResult};

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Decodes an upload into its header row and raw records.
///
/// CSV needs a header row; the delimiter is sniffed from it. JSON must be a
/// top-level array of flat objects, whose keys become headers in first-seen
/// order. NDJSON and anything else are rejected.
pub(crate) fn parse_source(content: &str) -> ClientResult<RawBatch> {
    let without_bom = content.trim_start_matches('\u{feff}');
    let trimmed = without_bom.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Input source is empty."));
    }

    if looks_like_ndjson(trimmed) {
        return Err(ClientError::invalid_import_format(
            "NDJSON is not supported. Provide a JSON array or CSV.",
            "ndjson",
        ));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if trimmed.starts_with('{') && serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(ClientError::invalid_import_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    }

    if let Some(delimiter) = sniff_delimiter(trimmed) {
        return parse_csv(without_bom.trim_start_matches(['\r', '\n']), delimiter);
    }

    Err(ClientError::invalid_import_format(
        "Unsupported input format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> ClientResult<RawBatch> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of transaction objects.",
        ));
    };

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(invalid_input_error(
                "JSON array entries must all be objects with transaction fields.",
            ));
        };

        for key in object.keys() {
            if !headers.iter().any(|header| header == key) {
                headers.push(key.clone());
            }
        }
        rows.push(json_row(object));
    }

    Ok(RawBatch { headers, rows })
}

fn json_row(object: &Map<String, Value>) -> RawRow {
    object
        .iter()
        .map(|(key, value)| (key.clone(), json_cell(value)))
        .collect()
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn parse_csv(content: &str, delimiter: u8) -> ClientResult<RawBatch> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if headers.iter().all(String::is_empty) {
        return Err(invalid_input_error("CSV header row is missing or unreadable."));
    }
    if let Some(duplicate) = duplicate_header(&headers) {
        return Err(ClientError::invalid_import_format(
            &format!(
                "CSV header `{duplicate}` appears more than once. Rename the columns so every header is unique."
            ),
            "csv_duplicate_headers",
        ));
    }

    let mut rows = Vec::new();
    for result_row in reader.records() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let row = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(index, header)| {
                let value = record.get(index).unwrap_or_default();
                (header.clone(), value.to_string())
            })
            .collect::<RawRow>();
        rows.push(row);
    }

    Ok(RawBatch { headers, rows })
}

/// Rows are keyed by header text, so a repeated header would silently shadow
/// one of its columns.
fn duplicate_header(headers: &[String]) -> Option<&str> {
    let mut seen = BTreeSet::new();
    headers
        .iter()
        .filter(|header| !header.is_empty())
        .find(|header| !seen.insert(header.as_str()))
        .map(String::as_str)
}

/// Picks the candidate delimiter that splits the header line into the most
/// fields. A header line none of them splits is not CSV.
fn sniff_delimiter(content: &str) -> Option<u8> {
    let first_line = content.lines().find(|line| !line.trim().is_empty())?;
    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .map(|delimiter| (delimiter, first_line.matches(char::from(delimiter)).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map(|(delimiter, _)| delimiter)
}

fn looks_like_ndjson(content: &str) -> bool {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<&str>>();
    if lines.len() < 2 {
        return false;
    }

    lines.iter().all(|line| {
        let parsed = serde_json::from_str::<Value>(line.trim());
        if let Ok(value) = parsed {
            return value.is_object();
        }
        false
    })
}
