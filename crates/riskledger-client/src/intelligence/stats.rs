use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::intelligence::types::CanonicalTransaction;

pub const HOURS_PER_DAY: usize = 24;
const PEAK_HOUR_FRACTION: f64 = 0.5;
const MIN_PEAK_HOURS: usize = 6;

/// Batch-wide snapshot every scoring call reads from. Built once per upload
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub peak_hours: BTreeSet<u32>,
    pub category_totals: BTreeMap<String, f64>,
    pub category_avg_spending: BTreeMap<String, f64>,
    pub weekly_avg: f64,
    pub current_week_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyFrequency {
    pub weekly_avg: f64,
    pub current_week: Option<String>,
    pub current_week_count: usize,
}

pub fn compute_batch_statistics(transactions: &[CanonicalTransaction]) -> BatchStatistics {
    let mean = mean_abs_amount(transactions);
    let std_dev = std_dev_abs_amount(transactions, mean);
    let category_totals = category_totals(transactions);
    let category_avg_spending = average_category_spending(&category_totals);
    let peak_hours = peak_hours(&hourly_distribution(transactions));
    let weekly = weekly_frequency(transactions);

    log::debug!(
        "batch statistics: n={} mean={mean:.2} std_dev={std_dev:.2} peak_hours={} categories={} weekly_avg={:.2} current_week={:?}/{}",
        transactions.len(),
        peak_hours.len(),
        category_totals.len(),
        weekly.weekly_avg,
        weekly.current_week,
        weekly.current_week_count
    );

    BatchStatistics {
        mean,
        std_dev,
        peak_hours,
        category_totals,
        category_avg_spending,
        weekly_avg: weekly.weekly_avg,
        current_week_count: weekly.current_week_count,
    }
}

pub fn mean_abs_amount(transactions: &[CanonicalTransaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    let total = transactions
        .iter()
        .map(CanonicalTransaction::abs_amount)
        .sum::<f64>();
    total / transactions.len() as f64
}

/// Population standard deviation of absolute amounts around `mean`; zero for
/// fewer than two values.
pub fn std_dev_abs_amount(transactions: &[CanonicalTransaction], mean: f64) -> f64 {
    if transactions.len() < 2 {
        return 0.0;
    }
    let variance = transactions
        .iter()
        .map(|row| (row.abs_amount() - mean).powi(2))
        .sum::<f64>()
        / transactions.len() as f64;
    variance.sqrt()
}

pub fn category_totals(transactions: &[CanonicalTransaction]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in transactions {
        *totals.entry(row.category.clone()).or_insert(0.0) += row.abs_amount();
    }
    totals
}

/// Mean of all category totals, assigned to every category alike. This is a
/// batch-wide baseline, not a per-category history.
pub fn average_category_spending(totals: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    if totals.is_empty() {
        return BTreeMap::new();
    }
    let average = totals.values().sum::<f64>() / totals.len() as f64;
    totals
        .keys()
        .map(|category| (category.clone(), average))
        .collect()
}

pub fn hourly_distribution(transactions: &[CanonicalTransaction]) -> [usize; HOURS_PER_DAY] {
    let mut buckets = [0usize; HOURS_PER_DAY];
    for row in transactions {
        if let Some(slot) = buckets.get_mut(row.hour() as usize) {
            *slot += 1;
        }
    }
    buckets
}

/// Hours whose activity reaches half the average count of the active hours.
///
/// Sparse results (fewer than six hours) are widened once by the neighbours
/// of every selected hour, wrapping around midnight. With no activity at all
/// every hour counts as peak.
pub fn peak_hours(distribution: &[usize; HOURS_PER_DAY]) -> BTreeSet<u32> {
    let total = distribution.iter().sum::<usize>();
    let active_hours = distribution.iter().filter(|count| **count > 0).count();
    if total == 0 || active_hours == 0 {
        return (0..HOURS_PER_DAY as u32).collect();
    }

    let average_per_active_hour = total as f64 / active_hours as f64;
    let threshold = average_per_active_hour * PEAK_HOUR_FRACTION;
    let selected = distribution
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0 && **count as f64 >= threshold)
        .map(|(hour, _)| hour as u32)
        .collect::<BTreeSet<u32>>();

    if selected.len() >= MIN_PEAK_HOURS {
        return selected;
    }

    let day = HOURS_PER_DAY as u32;
    let mut expanded = selected.clone();
    for hour in &selected {
        expanded.insert((hour + day - 1) % day);
        expanded.insert((hour + 1) % day);
    }
    expanded
}

pub fn weekly_counts(transactions: &[CanonicalTransaction]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in transactions {
        *counts.entry(row.iso_week_key()).or_insert(0) += 1;
    }
    counts
}

pub fn weekly_frequency(transactions: &[CanonicalTransaction]) -> WeeklyFrequency {
    let counts = weekly_counts(transactions);
    if counts.is_empty() {
        return WeeklyFrequency {
            weekly_avg: 0.0,
            current_week: None,
            current_week_count: 0,
        };
    }

    let weekly_avg = counts.values().sum::<usize>() as f64 / counts.len() as f64;
    let (current_week, current_week_count) = counts
        .iter()
        .next_back()
        .map(|(week, count)| (Some(week.clone()), *count))
        .unwrap_or((None, 0));

    WeeklyFrequency {
        weekly_avg,
        current_week,
        current_week_count,
    }
}
