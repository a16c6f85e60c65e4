use serde::Serialize;

use crate::error::ColumnMappingError;
use crate::import::RawRow;
use crate::import::amount::round_to;
use crate::import::columns::{ColumnDetection, detect_columns};
use crate::import::normalize::{SkippedRows, normalize_rows};
use crate::intelligence::policy::{RISK_POLICY_V1, RiskPolicy};
use crate::intelligence::scoring::{RiskResult, score_transaction_with_policy};
use crate::intelligence::stats::{BatchStatistics, compute_batch_statistics};
use crate::intelligence::types::{
    CanonicalTransaction, RiskLevel, ScoredTransaction, TransactionType,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    #[serde(rename = "Normal")]
    pub normal: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "High")]
    pub high: usize,
}

impl RiskDistribution {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Normal => self.normal += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.normal + self.medium + self.high
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub transactions: Vec<ScoredTransaction>,
    pub risk_distribution: RiskDistribution,
    pub statistics: Option<BatchStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub rows_parsed: usize,
    pub rows_retained: usize,
    pub rows_skipped: usize,
    pub skipped: SkippedRows,
    pub total_debit: f64,
    pub total_credit: f64,
    pub risk_distribution: RiskDistribution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub columns: ColumnDetection,
    pub summary: AnalysisSummary,
    pub statistics: Option<BatchStatistics>,
    pub transactions: Vec<ScoredTransaction>,
}

/// Scores a normalized batch against its own statistics.
///
/// Empty batches yield empty output. A single transaction has no deviation to
/// measure and comes back unscored.
pub fn run_pipeline(transactions: Vec<CanonicalTransaction>) -> PipelineOutput {
    run_pipeline_with_policy(transactions, RISK_POLICY_V1)
}

pub fn run_pipeline_with_policy(
    transactions: Vec<CanonicalTransaction>,
    policy: RiskPolicy,
) -> PipelineOutput {
    let mut risk_distribution = RiskDistribution::default();

    if transactions.len() < 2 {
        let scored = transactions
            .into_iter()
            .map(|transaction| apply_result(transaction, RiskResult::unscored()))
            .inspect(|row| risk_distribution.record(row.transaction.risk_level))
            .collect::<Vec<ScoredTransaction>>();
        return PipelineOutput {
            transactions: scored,
            risk_distribution,
            statistics: None,
        };
    }

    let statistics = compute_batch_statistics(&transactions);
    let scored = transactions
        .into_iter()
        .map(|transaction| {
            let result = score_transaction_with_policy(&transaction, &statistics, policy);
            apply_result(transaction, result)
        })
        .inspect(|row| risk_distribution.record(row.transaction.risk_level))
        .collect::<Vec<ScoredTransaction>>();

    PipelineOutput {
        transactions: scored,
        risk_distribution,
        statistics: Some(statistics),
    }
}

/// Full batch analysis from decoded headers and rows: column detection,
/// normalization, statistics and scoring.
pub fn analyze_batch(
    headers: &[String],
    rows: &[RawRow],
) -> Result<AnalysisOutcome, ColumnMappingError> {
    let columns = detect_columns(headers)?;
    let normalized = normalize_rows(rows, &columns);
    let (total_debit, total_credit) = batch_totals(&normalized.transactions);
    let output = run_pipeline(normalized.transactions);

    log::info!(
        "analyzed {} rows: retained {}, skipped {} (invalid date {}, zero amount {}); risk Normal={} Medium={} High={}",
        normalized.rows_parsed,
        normalized.rows_retained,
        normalized.skipped.total(),
        normalized.skipped.invalid_date,
        normalized.skipped.zero_amount,
        output.risk_distribution.normal,
        output.risk_distribution.medium,
        output.risk_distribution.high
    );

    Ok(AnalysisOutcome {
        columns,
        summary: AnalysisSummary {
            rows_parsed: normalized.rows_parsed,
            rows_retained: normalized.rows_retained,
            rows_skipped: normalized.skipped.total(),
            skipped: normalized.skipped,
            total_debit,
            total_credit,
            risk_distribution: output.risk_distribution,
        },
        statistics: output.statistics,
        transactions: output.transactions,
    })
}

fn apply_result(mut transaction: CanonicalTransaction, result: RiskResult) -> ScoredTransaction {
    transaction.anomaly_score = result.anomaly_score;
    transaction.risk_level = result.risk_level;
    ScoredTransaction {
        transaction,
        risk_factors: result.risk_factors,
    }
}

fn batch_totals(transactions: &[CanonicalTransaction]) -> (f64, f64) {
    let mut debit = 0.0;
    let mut credit = 0.0;
    for row in transactions {
        match row.transaction_type {
            TransactionType::Debit => debit += row.abs_amount(),
            TransactionType::Credit => credit += row.abs_amount(),
            TransactionType::Unknown => {}
        }
    }
    (round_to(debit, 2), round_to(credit, 2))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::{analyze_batch, run_pipeline};
    use crate::import::RawRow;
    use crate::intelligence::types::{CanonicalTransaction, RiskLevel, TransactionType};

    fn transaction(hour: u32, minute: u32, amount: f64) -> CanonicalTransaction {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|day| day.and_hms_opt(hour, minute, 0))
            .unwrap_or_default();
        CanonicalTransaction {
            date,
            amount,
            transaction_type: TransactionType::from_signed_amount(amount),
            category: "Shopping".to_string(),
            description: String::new(),
            transaction_id: None,
            metadata: BTreeMap::new(),
            anomaly_score: 0,
            risk_level: RiskLevel::Normal,
        }
    }

    /// Nineteen daytime purchases of 1000 plus one 1900 purchase at 03:00.
    fn outlier_batch() -> Vec<CanonicalTransaction> {
        let mut rows = Vec::new();
        for minute in 0..10 {
            rows.push(transaction(10, minute, -1000.0));
        }
        for minute in 0..9 {
            rows.push(transaction(11, minute, -1000.0));
        }
        rows.push(transaction(3, 0, -1900.0));
        rows
    }

    #[test]
    fn empty_batch_yields_empty_output() {
        let output = run_pipeline(Vec::new());
        assert!(output.transactions.is_empty());
        assert_eq!(output.risk_distribution.total(), 0);
        assert!(output.statistics.is_none());
    }

    #[test]
    fn singleton_batch_is_unscored() {
        let output = run_pipeline(vec![transaction(3, 0, -1_000_000.0)]);
        assert_eq!(output.transactions.len(), 1);
        assert_eq!(
            output
                .transactions
                .first()
                .map(|row| (row.transaction.anomaly_score, row.transaction.risk_level)),
            Some((0, RiskLevel::Normal))
        );
        assert_eq!(output.risk_distribution.normal, 1);
        assert!(output.statistics.is_none());
    }

    #[test]
    fn single_outlier_scores_extreme_deviation_and_unusual_hour() {
        let output = run_pipeline(outlier_batch());
        assert_eq!(output.transactions.len(), 20);
        assert_eq!(output.risk_distribution.total(), 20);
        assert_eq!(output.risk_distribution.normal, 19);
        assert_eq!(output.risk_distribution.medium, 1);
        assert_eq!(output.risk_distribution.high, 0);

        let outlier = output.transactions.last();
        assert!(outlier.is_some());
        if let Some(row) = outlier {
            assert_eq!(row.transaction.anomaly_score, 55);
            assert_eq!(row.transaction.risk_level, RiskLevel::Medium);
            assert_eq!(row.risk_factors.len(), 2);
        }

        for row in output.transactions.iter().take(19) {
            assert_eq!(row.transaction.anomaly_score, 0);
            assert!(row.risk_factors.is_empty());
        }
    }

    #[test]
    fn pipeline_preserves_input_order() {
        let input = outlier_batch();
        let output = run_pipeline(input.clone());
        let dates = output
            .transactions
            .iter()
            .map(|row| row.transaction.date)
            .collect::<Vec<_>>();
        let expected = input.iter().map(|row| row.date).collect::<Vec<_>>();
        assert_eq!(dates, expected);
    }

    #[test]
    fn analyze_batch_reports_skips_and_totals() {
        let headers = vec![
            "Date".to_string(),
            "Debit".to_string(),
            "Credit".to_string(),
            "Category".to_string(),
        ];
        let row = |date: &str, debit: &str, credit: &str| -> RawRow {
            BTreeMap::from([
                ("Date".to_string(), date.to_string()),
                ("Debit".to_string(), debit.to_string()),
                ("Credit".to_string(), credit.to_string()),
                ("Category".to_string(), "Bills".to_string()),
            ])
        };
        let rows = vec![
            row("2024-01-15", "120.50", ""),
            row("2024-01-16", "", "2,000"),
            row("2024-01-17", "", ""),
            row("someday", "10", ""),
        ];

        let outcome = analyze_batch(&headers, &rows);
        assert!(outcome.is_ok());
        if let Ok(outcome) = outcome {
            assert!(outcome.columns.has_debit_credit);
            assert_eq!(outcome.summary.rows_parsed, 4);
            assert_eq!(outcome.summary.rows_retained, 2);
            assert_eq!(outcome.summary.rows_skipped, 2);
            assert_eq!(outcome.summary.skipped.zero_amount, 1);
            assert_eq!(outcome.summary.skipped.invalid_date, 1);
            assert_eq!(outcome.summary.total_debit, 120.5);
            assert_eq!(outcome.summary.total_credit, 2000.0);
            assert_eq!(outcome.summary.risk_distribution.total(), 2);
            assert!(outcome.statistics.is_some());
        }
    }

    #[test]
    fn analyze_batch_surfaces_missing_columns() {
        let headers = vec!["Memo".to_string(), "Amount".to_string()];
        let outcome = analyze_batch(&headers, &[]);
        assert!(outcome.is_err());
        if let Err(error) = outcome {
            assert_eq!(error.missing, vec!["date".to_string()]);
            assert_eq!(error.detected_headers, headers);
        }
    }
}
