use serde::Serialize;

use crate::import::amount::round_to;
use crate::intelligence::policy::{RISK_POLICY_V1, RiskPolicy};
use crate::intelligence::stats::BatchStatistics;
use crate::intelligence::types::{CanonicalTransaction, RiskLevel};

/// One triggered risk signal together with the statistic that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RiskSignal {
    ExtremeAmountDeviation {
        z_score: f64,
    },
    HighAmountDeviation {
        z_score: f64,
    },
    HighValue {
        ratio: f64,
    },
    UnusualHour {
        hour: u32,
    },
    CategorySpike {
        category: String,
        ratio: f64,
    },
    WeeklyFrequencySpike {
        current_week_count: usize,
        weekly_avg: f64,
    },
}

impl RiskSignal {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ExtremeAmountDeviation { .. } => "extreme_amount_deviation",
            Self::HighAmountDeviation { .. } => "high_amount_deviation",
            Self::HighValue { .. } => "high_value",
            Self::UnusualHour { .. } => "unusual_hour",
            Self::CategorySpike { .. } => "category_spike",
            Self::WeeklyFrequencySpike { .. } => "weekly_frequency_spike",
        }
    }

    pub fn points(&self, policy: RiskPolicy) -> u32 {
        match self {
            Self::ExtremeAmountDeviation { .. } => policy.extreme_z_points,
            Self::HighAmountDeviation { .. } => policy.high_z_points,
            Self::HighValue { .. } => policy.high_value_points,
            Self::UnusualHour { .. } => policy.unusual_hour_points,
            Self::CategorySpike { .. } => policy.category_spike_points,
            Self::WeeklyFrequencySpike { .. } => policy.weekly_spike_points,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::ExtremeAmountDeviation { z_score } => format!(
                "Extreme amount deviation ({:.2} standard deviations from the batch mean).",
                z_score
            ),
            Self::HighAmountDeviation { z_score } => format!(
                "High amount deviation ({:.2} standard deviations from the batch mean).",
                z_score
            ),
            Self::HighValue { ratio } => {
                format!("High value transaction ({:.2}x the batch mean amount).", ratio)
            }
            Self::UnusualHour { hour } => {
                format!("Unusual hour ({hour:02}:00 is outside the batch peak hours).")
            }
            Self::CategorySpike { category, ratio } => format!(
                "Category spike ({category} spending is {:.2}x the average category total).",
                ratio
            ),
            Self::WeeklyFrequencySpike {
                current_week_count,
                weekly_avg,
            } => format!(
                "Weekly frequency spike ({current_week_count} transactions in the latest week vs {:.2} average).",
                weekly_avg
            ),
        }
    }
}

/// Score, level and explanation for one transaction.
///
/// `anomaly_score` always equals the summed points of `signals`, and
/// `risk_factors` holds one description per signal in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub anomaly_score: u32,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    #[serde(skip)]
    pub signals: Vec<RiskSignal>,
}

impl RiskResult {
    pub fn unscored() -> Self {
        Self {
            anomaly_score: 0,
            risk_level: RiskLevel::Normal,
            risk_factors: Vec::new(),
            signals: Vec::new(),
        }
    }
}

pub fn score_transaction(
    transaction: &CanonicalTransaction,
    stats: &BatchStatistics,
) -> RiskResult {
    score_transaction_with_policy(transaction, stats, RISK_POLICY_V1)
}

pub fn score_transaction_with_policy(
    transaction: &CanonicalTransaction,
    stats: &BatchStatistics,
    policy: RiskPolicy,
) -> RiskResult {
    let signals = evaluate_signals(transaction, stats, policy);
    let anomaly_score = signals.iter().map(|signal| signal.points(policy)).sum();
    let risk_factors = signals.iter().map(RiskSignal::describe).collect();

    RiskResult {
        anomaly_score,
        risk_level: policy.classify(anomaly_score),
        risk_factors,
        signals,
    }
}

fn evaluate_signals(
    transaction: &CanonicalTransaction,
    stats: &BatchStatistics,
    policy: RiskPolicy,
) -> Vec<RiskSignal> {
    let mut signals = Vec::new();
    let absolute_amount = transaction.abs_amount();

    if stats.std_dev > 0.0 {
        let z_score = (absolute_amount - stats.mean).abs() / stats.std_dev;
        if z_score > policy.extreme_z_score {
            signals.push(RiskSignal::ExtremeAmountDeviation {
                z_score: round_to(z_score, 2),
            });
        } else if z_score > policy.high_z_score {
            signals.push(RiskSignal::HighAmountDeviation {
                z_score: round_to(z_score, 2),
            });
        }
    }

    if stats.mean > 0.0 && absolute_amount > policy.high_value_multiplier * stats.mean {
        signals.push(RiskSignal::HighValue {
            ratio: round_to(absolute_amount / stats.mean, 2),
        });
    }

    let hour = transaction.hour();
    if !stats.peak_hours.is_empty() && !stats.peak_hours.contains(&hour) {
        signals.push(RiskSignal::UnusualHour { hour });
    }

    if let Some(total) = stats.category_totals.get(&transaction.category)
        && let Some(average) = stats.category_avg_spending.get(&transaction.category)
        && *average > 0.0
        && *total > policy.category_spike_ratio * average
    {
        signals.push(RiskSignal::CategorySpike {
            category: transaction.category.clone(),
            ratio: round_to(total / average, 2),
        });
    }

    if stats.weekly_avg > 0.0
        && stats.current_week_count as f64 > policy.weekly_spike_ratio * stats.weekly_avg
    {
        signals.push(RiskSignal::WeeklyFrequencySpike {
            current_week_count: stats.current_week_count,
            weekly_avg: round_to(stats.weekly_avg, 2),
        });
    }

    signals
}
