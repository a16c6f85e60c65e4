use crate::intelligence::types::RiskLevel;

/// Deterministic risk-scoring policy identifier.
///
/// Emitted with every analysis so threshold changes stay auditable when
/// comparing results produced by different builds.
pub const RISK_POLICY_VERSION: &str = "risk/v1";

/// v1 additive risk policy.
///
/// Notes:
/// - Every signal is independent except the amount deviation tiers, where the
///   extreme tier replaces the high tier instead of adding to it.
/// - Classification bounds are inclusive on the lower end.
#[derive(Debug, Clone, Copy)]
pub struct RiskPolicy {
    pub extreme_z_score: f64,
    pub extreme_z_points: u32,
    pub high_z_score: f64,
    pub high_z_points: u32,
    pub high_value_multiplier: f64,
    pub high_value_points: u32,
    pub unusual_hour_points: u32,
    pub category_spike_ratio: f64,
    pub category_spike_points: u32,
    pub weekly_spike_ratio: f64,
    pub weekly_spike_points: u32,
    pub medium_min_score: u32,
    pub high_min_score: u32,
}

impl RiskPolicy {
    pub fn classify(self, score: u32) -> RiskLevel {
        if score >= self.high_min_score {
            return RiskLevel::High;
        }
        if score >= self.medium_min_score {
            return RiskLevel::Medium;
        }
        RiskLevel::Normal
    }

    /// Highest score reachable when every non-exclusive signal fires.
    pub fn max_score(self) -> u32 {
        self.extreme_z_points.max(self.high_z_points)
            + self.high_value_points
            + self.unusual_hour_points
            + self.category_spike_points
            + self.weekly_spike_points
    }
}

pub const RISK_POLICY_V1: RiskPolicy = RiskPolicy {
    extreme_z_score: 3.0,
    extreme_z_points: 40,
    high_z_score: 2.0,
    high_z_points: 25,
    high_value_multiplier: 2.0,
    high_value_points: 30,
    unusual_hour_points: 15,
    category_spike_ratio: 1.4,
    category_spike_points: 20,
    weekly_spike_ratio: 1.3,
    weekly_spike_points: 20,
    medium_min_score: 30,
    high_min_score: 60,
};
