use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::import::RawRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
    Unknown,
}

impl TransactionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_signed_amount(amount: f64) -> Self {
        if amount < 0.0 {
            Self::Debit
        } else if amount > 0.0 {
            Self::Credit
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    #[default]
    Normal,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    pub date: NaiveDateTime,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub metadata: RawRow,
    pub anomaly_score: u32,
    pub risk_level: RiskLevel,
}

impl CanonicalTransaction {
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    pub fn hour(&self) -> u32 {
        self.date.hour()
    }

    /// ISO-8601 week key (`YYYY-Www`), Monday-starting, so keys sort
    /// chronologically as plain strings.
    pub fn iso_week_key(&self) -> String {
        let week = self.date.iso_week();
        format!("{}-W{:02}", week.year(), week.week())
    }
}

/// A canonical transaction after scoring, with the explanation for its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub transaction: CanonicalTransaction,
    pub risk_factors: Vec<String>,
}
