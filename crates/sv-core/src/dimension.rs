//! The fixed dimension catalog of the parallel-coordinates explorer

use crate::record::UserRecord;

/// One displayable axis of the explorer.
///
/// The catalog is a fixed ordered list of eight dimensions; the active subset
/// always follows catalog order, not toggle order. `avg_latency` exists on
/// the record but is not a displayable axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DimKey {
    DailySteps,
    ActiveMinutes,
    Bmi,
    Age,
    Efficiency,
    TotalSleepTime,
    Waso,
    Awakenings,
}

impl DimKey {
    /// Catalog order. Active sets are sorted by position in this list.
    pub const ALL: [DimKey; 8] = [
        DimKey::DailySteps,
        DimKey::ActiveMinutes,
        DimKey::Bmi,
        DimKey::Age,
        DimKey::Efficiency,
        DimKey::TotalSleepTime,
        DimKey::Waso,
        DimKey::Awakenings,
    ];

    /// Default active set on startup and after the tutorial resets.
    pub const DEFAULT_ACTIVE: [DimKey; 4] = [
        DimKey::DailySteps,
        DimKey::Bmi,
        DimKey::Age,
        DimKey::Efficiency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DimKey::DailySteps => "Daily Steps",
            DimKey::ActiveMinutes => "Active Minutes",
            DimKey::Bmi => "BMI",
            DimKey::Age => "Age",
            DimKey::Efficiency => "Sleep Efficiency",
            DimKey::TotalSleepTime => "TST",
            DimKey::Waso => "WASO",
            DimKey::Awakenings => "Awakenings",
        }
    }

    /// Position in catalog order.
    pub fn catalog_index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0)
    }

    /// Value of this dimension for a record, `None` when the metric is
    /// missing for that user.
    pub fn value(&self, record: &UserRecord) -> Option<f64> {
        let value = match self {
            DimKey::DailySteps => Some(record.total_daily_steps),
            DimKey::ActiveMinutes => Some(record.active_minutes),
            DimKey::Bmi => record.bmi,
            DimKey::Age => record.age,
            DimKey::Efficiency => record.avg_efficiency,
            DimKey::TotalSleepTime => record.avg_tst,
            DimKey::Waso => record.avg_waso,
            DimKey::Awakenings => record.avg_awakenings,
        };
        // NaN is treated identically to an absent value everywhere.
        value.filter(|v| v.is_finite())
    }

    /// Display formatting for tick labels and tooltips.
    pub fn format(&self, value: f64) -> String {
        match self {
            DimKey::DailySteps => format!("{:.0}", value),
            DimKey::ActiveMinutes => format!("{:.0} min", value),
            DimKey::Bmi => format!("{:.1}", value),
            DimKey::Age => format!("{:.0}", value),
            DimKey::Efficiency => format!("{:.1}%", value),
            DimKey::TotalSleepTime => format!("{:.0} min", value),
            DimKey::Waso => format!("{:.1} min", value),
            DimKey::Awakenings => format!("{:.1}", value),
        }
    }
}
