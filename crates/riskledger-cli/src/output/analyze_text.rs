use std::io;

use serde_json::Value;

use super::format::{self, Column};

const FIELD_ORDER: [&str; 7] = [
    "date",
    "amount",
    "debit",
    "credit",
    "description",
    "category",
    "transactionId",
];

pub fn render_analyze(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("analyze output requires summary"))?;
    let transactions = data
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("analyze output requires transactions"))?;

    let distribution = summary.get("riskDistribution").unwrap_or(&Value::Null);
    let skipped = summary.get("skipped").unwrap_or(&Value::Null);

    let mut lines = vec![
        format!(
            "Analyzed {} from {}.",
            source_label(data),
            count_label(summary, "rowsParsed", "row")
        ),
        String::new(),
        "Summary:".to_string(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Rows retained:", number(summary, "rowsRetained")),
            (
                "Rows skipped:",
                format!(
                    "{} (invalid date {}, zero amount {})",
                    number(summary, "rowsSkipped"),
                    number(skipped, "invalid_date"),
                    number(skipped, "zero_amount")
                ),
            ),
            ("Total debit:", money(summary.get("totalDebit"))),
            ("Total credit:", money(summary.get("totalCredit"))),
            (
                "Risk levels:",
                format!(
                    "High {}  Medium {}  Normal {}",
                    number(distribution, "High"),
                    number(distribution, "Medium"),
                    number(distribution, "Normal")
                ),
            ),
            (
                "Policy:",
                data.get("policyVersion")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            ),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Columns:".to_string());
    lines.extend(mapping_rows(data.get("columns")));

    let mut findings = transactions
        .iter()
        .filter(|row| {
            matches!(
                row.get("riskLevel").and_then(Value::as_str),
                Some("High" | "Medium")
            )
        })
        .collect::<Vec<&Value>>();
    findings.sort_by(|left, right| {
        score(right)
            .cmp(&score(left))
            .then_with(|| text(left, "date").cmp(&text(right, "date")))
    });

    lines.push(String::new());
    if findings.is_empty() {
        lines.push("No Medium or High risk transactions found.".to_string());
        if transactions.len() < 2 {
            lines.push("Batches with fewer than two transactions are not scored.".to_string());
        }
        return Ok(lines.join("\n"));
    }

    lines.push(format!("Findings ({}):", findings.len()));
    let columns = [
        Column::left("Date"),
        Column::right("Amount"),
        Column::left("Risk"),
        Column::left("Description"),
        Column::left("Factors"),
    ];
    let table_rows = findings
        .iter()
        .map(|row| {
            vec![
                text(row, "date").replacen('T', " ", 1),
                money(row.get("amount")),
                format!("{} ({})", text(row, "riskLevel"), score(row)),
                text(row, "description"),
                row.get("riskFactors")
                    .and_then(Value::as_array)
                    .map(|factors| {
                        factors
                            .iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<&str>>()
                            .join(" ")
                    })
                    .unwrap_or_default(),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Finding",
    ));

    Ok(lines.join("\n"))
}

pub fn render_columns(data: &Value) -> io::Result<String> {
    let columns = data
        .get("columns")
        .ok_or_else(|| io::Error::other("columns output requires columns"))?;

    let mut lines = vec![
        format!(
            "Detected columns in {} ({}).",
            source_label(data),
            count_label(data, "rowsRead", "data row")
        ),
        String::new(),
        "Mapping:".to_string(),
    ];
    lines.extend(mapping_rows(Some(columns)));

    let mode = if columns
        .get("hasDebitCredit")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        "separate debit/credit columns"
    } else {
        "single signed amount column"
    };
    lines.push(String::new());
    lines.push(format!("Amounts are read from {mode}."));
    lines.push(String::new());
    lines.push(format!(
        "Next: run `riskledger analyze {}` to score the transactions.",
        data.get("path").and_then(Value::as_str).unwrap_or("-")
    ));

    Ok(lines.join("\n"))
}

fn mapping_rows(columns: Option<&Value>) -> Vec<String> {
    let mapping = columns.and_then(|value| value.get("mapping"));
    let labels = FIELD_ORDER
        .iter()
        .map(|field| format!("{field}:"))
        .collect::<Vec<String>>();
    let mut entries = FIELD_ORDER
        .iter()
        .zip(labels.iter())
        .map(|(field, label)| {
            let header = mapping
                .and_then(|value| value.get(*field))
                .and_then(Value::as_str)
                .map_or_else(|| "(not found)".to_string(), |header| format!("\"{header}\""));
            (label.as_str(), header)
        })
        .collect::<Vec<(&str, String)>>();

    let unused = columns
        .and_then(|value| value.get("unusedHeaders"))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>()
                .join(", ")
        })
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| "(none)".to_string());
    entries.push(("unused:", unused));

    format::key_value_rows(&entries, 2)
}

fn source_label(data: &Value) -> String {
    match data.get("path").and_then(Value::as_str) {
        Some(path) => path.to_string(),
        None => "stdin".to_string(),
    }
}

fn count_label(data: &Value, key: &str, noun: &str) -> String {
    let count = data.get(key).and_then(Value::as_u64).unwrap_or(0);
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn number(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .to_string()
}

fn money(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_f64)
        .map_or_else(|| "unknown".to_string(), |amount| format!("{amount:.2}"))
}

fn score(row: &Value) -> u64 {
    row.get("anomalyScore").and_then(Value::as_u64).unwrap_or(0)
}

fn text(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
