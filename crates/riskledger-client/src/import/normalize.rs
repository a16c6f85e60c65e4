use serde::Serialize;

use crate::import::RawRow;
use crate::import::amount::parse_amount;
use crate::import::columns::{ColumnDetection, SemanticField};
use crate::import::date::parse_transaction_date;
use crate::intelligence::types::{CanonicalTransaction, RiskLevel, TransactionType};

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InvalidDate,
    ZeroAmount,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDate => "invalid_date",
            Self::ZeroAmount => "zero_amount",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkippedRows {
    pub invalid_date: usize,
    pub zero_amount: usize,
}

impl SkippedRows {
    pub fn total(&self) -> usize {
        self.invalid_date + self.zero_amount
    }

    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::InvalidDate => self.invalid_date += 1,
            SkipReason::ZeroAmount => self.zero_amount += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRows {
    pub transactions: Vec<CanonicalTransaction>,
    pub rows_parsed: usize,
    pub rows_retained: usize,
    pub skipped: SkippedRows,
}

/// Converts raw rows into canonical transactions, dropping rows without a
/// usable date or with a zero amount. Skips are counted, never raised.
pub fn normalize_rows(rows: &[RawRow], detection: &ColumnDetection) -> NormalizedRows {
    let mut transactions = Vec::with_capacity(rows.len());
    let mut skipped = SkippedRows::default();

    for (index, row) in rows.iter().enumerate() {
        match normalize_row(row, detection) {
            Ok(transaction) => transactions.push(transaction),
            Err(reason) => {
                log::debug!("skipping row {}: {}", index + 1, reason.as_str());
                skipped.record(reason);
            }
        }
    }

    NormalizedRows {
        rows_parsed: rows.len(),
        rows_retained: transactions.len(),
        transactions,
        skipped,
    }
}

pub fn normalize_row(
    row: &RawRow,
    detection: &ColumnDetection,
) -> Result<CanonicalTransaction, SkipReason> {
    let field = |field: SemanticField| -> Option<&str> {
        let header = detection.mapping.get(field)?;
        row.get(header).map(String::as_str)
    };

    let date = field(SemanticField::Date)
        .and_then(parse_transaction_date)
        .ok_or(SkipReason::InvalidDate)?;

    let (amount, transaction_type) = if detection.has_debit_credit {
        resolve_split_amount(
            field(SemanticField::Debit),
            field(SemanticField::Credit),
            field(SemanticField::Amount),
        )
    } else {
        resolve_signed_amount(field(SemanticField::Amount))
    };
    if amount == 0.0 {
        return Err(SkipReason::ZeroAmount);
    }

    let category = field(SemanticField::Category)
        .map(collapse_whitespace)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let description = field(SemanticField::Description)
        .map(collapse_whitespace)
        .unwrap_or_default();
    let transaction_id = field(SemanticField::TransactionId)
        .map(collapse_whitespace)
        .filter(|value| !value.is_empty());

    Ok(CanonicalTransaction {
        date,
        amount,
        transaction_type,
        category,
        description,
        transaction_id,
        metadata: row.clone(),
        anomaly_score: 0,
        risk_level: RiskLevel::Normal,
    })
}

/// Debit wins over credit when both carry a value; a mapped amount column is
/// the last resort when both are blank or zero.
fn resolve_split_amount(
    debit: Option<&str>,
    credit: Option<&str>,
    amount: Option<&str>,
) -> (f64, TransactionType) {
    let magnitude = |value: Option<&str>| {
        value
            .and_then(parse_amount)
            .map(f64::abs)
            .filter(|parsed| *parsed > 0.0)
    };

    if let Some(value) = magnitude(debit) {
        return (-value, TransactionType::Debit);
    }
    if let Some(value) = magnitude(credit) {
        return (value, TransactionType::Credit);
    }
    resolve_signed_amount(amount)
}

fn resolve_signed_amount(amount: Option<&str>) -> (f64, TransactionType) {
    let Some(value) = amount.and_then(parse_amount) else {
        return (0.0, TransactionType::Unknown);
    };
    (value, TransactionType::from_signed_amount(value))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<&str>>().join(" ")
}
