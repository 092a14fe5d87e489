//! Per-participant records and their derived classifications

/// One merged record per study participant.
///
/// A record only enters the explorer's working set if step data exists for
/// the user. Every sleep-derived metric is independently optional; a `None`
/// is excluded from scale domains and fails any brush on that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserRecord {
    pub user_id: u32,
    /// Summed step count over the observation window.
    pub total_daily_steps: f64,
    /// Distinct minute-of-day buckets with nonzero step activity.
    pub active_minutes: f64,
    pub bmi: Option<f64>,
    pub age: Option<f64>,
    pub avg_efficiency: Option<f64>,
    pub avg_tst: Option<f64>,
    pub avg_waso: Option<f64>,
    pub avg_awakenings: Option<f64>,
    pub avg_latency: Option<f64>,
}

impl UserRecord {
    /// A record with only identity and step data; sleep metrics absent.
    pub fn steps_only(user_id: u32, total_daily_steps: f64, active_minutes: f64) -> Self {
        Self {
            user_id,
            total_daily_steps,
            active_minutes,
            bmi: None,
            age: None,
            avg_efficiency: None,
            avg_tst: None,
            avg_waso: None,
            avg_awakenings: None,
            avg_latency: None,
        }
    }
}

/// Activity level bucket derived from total daily steps.
///
/// Boundaries resolve to the higher tier at exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityTier {
    High,
    Moderate,
    Lower,
}

impl ActivityTier {
    pub fn from_steps(total_daily_steps: f64) -> Self {
        if total_daily_steps >= 10_000.0 {
            ActivityTier::High
        } else if total_daily_steps >= 5_000.0 {
            ActivityTier::Moderate
        } else {
            ActivityTier::Lower
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityTier::High => "High (≥10k steps)",
            ActivityTier::Moderate => "Moderate (≥5k steps)",
            ActivityTier::Lower => "Lower (<5k steps)",
        }
    }
}

/// The fixed option set of the efficiency filter dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum EfficiencyFilter {
    #[default]
    All,
    /// Average efficiency above 85%.
    Good,
    /// Average efficiency between 75% and 85% inclusive.
    Fair,
    /// Average efficiency below 75%.
    Poor,
}

impl EfficiencyFilter {
    pub const ALL: [EfficiencyFilter; 4] = [
        EfficiencyFilter::All,
        EfficiencyFilter::Good,
        EfficiencyFilter::Fair,
        EfficiencyFilter::Poor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EfficiencyFilter::All => "All users",
            EfficiencyFilter::Good => "Good (>85%)",
            EfficiencyFilter::Fair => "Fair (75–85%)",
            EfficiencyFilter::Poor => "Poor (<75%)",
        }
    }

    /// Whether a record satisfies the filter. A missing efficiency value
    /// never satisfies a numeric predicate, so only `All` retains it.
    pub fn retains(&self, record: &UserRecord) -> bool {
        match self {
            EfficiencyFilter::All => true,
            EfficiencyFilter::Good => record.avg_efficiency.map_or(false, |e| e > 85.0),
            EfficiencyFilter::Fair => record
                .avg_efficiency
                .map_or(false, |e| (75.0..=85.0).contains(&e)),
            EfficiencyFilter::Poor => record.avg_efficiency.map_or(false, |e| e < 75.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_efficiency(user_id: u32, efficiency: Option<f64>) -> UserRecord {
        UserRecord {
            avg_efficiency: efficiency,
            ..UserRecord::steps_only(user_id, 8_000.0, 300.0)
        }
    }

    #[test]
    fn test_tier_boundaries_resolve_upward() {
        assert_eq!(ActivityTier::from_steps(10_000.0), ActivityTier::High);
        assert_eq!(ActivityTier::from_steps(9_999.0), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_steps(5_000.0), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_steps(4_999.0), ActivityTier::Lower);
        assert_eq!(ActivityTier::from_steps(0.0), ActivityTier::Lower);
    }

    #[test]
    fn test_good_filter_excludes_missing_efficiency() {
        let users = [
            record_with_efficiency(1, Some(90.0)),
            record_with_efficiency(2, Some(80.0)),
            record_with_efficiency(3, None),
        ];

        let retained: Vec<u32> = users
            .iter()
            .filter(|r| EfficiencyFilter::Good.retains(r))
            .map(|r| r.user_id)
            .collect();
        assert_eq!(retained, vec![1]);
    }

    #[test]
    fn test_fair_filter_is_inclusive_at_both_ends() {
        assert!(EfficiencyFilter::Fair.retains(&record_with_efficiency(1, Some(75.0))));
        assert!(EfficiencyFilter::Fair.retains(&record_with_efficiency(1, Some(85.0))));
        assert!(!EfficiencyFilter::Fair.retains(&record_with_efficiency(1, Some(85.1))));
        assert!(!EfficiencyFilter::Fair.retains(&record_with_efficiency(1, None)));
    }

    #[test]
    fn test_all_filter_retains_missing_efficiency() {
        assert!(EfficiencyFilter::All.retains(&record_with_efficiency(1, None)));
    }
}
