//! Layout engine for the parallel-coordinates explorer
//!
//! Computes, for one active dimension set over one filtered record set, the
//! horizontal axis placement and a per-dimension vertical scale. Scales map
//! values into normalized [0, 1] space so the layout is independent of the
//! frame's pixel size; it is recomputed only when the filter or the active
//! set changes, never on brush or selection changes.

use sv_core::{DimKey, UserRecord};

/// Fraction of inter-axis spacing left free at each edge of the plot.
const EDGE_PADDING: f32 = 0.15;
/// Range padding applied to non-degenerate default domains.
const RANGE_PAD: f64 = 0.10;

/// Continuous mapping from a value domain to normalized [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    lo: f64,
    hi: f64,
}

impl LinearScale {
    fn new(lo: f64, hi: f64) -> Self {
        debug_assert!(hi > lo);
        Self { lo, hi }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Normalized position of a value: 0 at the domain minimum, 1 at the
    /// maximum. Values outside the domain map outside [0, 1]; clamping is a
    /// drawing concern, not a scale concern.
    pub fn t(&self, value: f64) -> f32 {
        ((value - self.lo) / (self.hi - self.lo)) as f32
    }

    /// Inverse of [`Self::t`].
    pub fn value_at(&self, t: f32) -> f64 {
        self.lo + t as f64 * (self.hi - self.lo)
    }

    /// Round tick values covering the domain, at most `count + 1` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let step = tick_step(self.hi - self.lo, count.max(1));
        if step <= 0.0 {
            return vec![self.lo, self.hi];
        }
        let mut ticks = Vec::new();
        let mut value = (self.lo / step).ceil() * step;
        while value <= self.hi + step * 1e-9 {
            ticks.push(value);
            value += step;
        }
        ticks
    }
}

/// One placed axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub key: DimKey,
    /// Horizontal position as a fraction of the plot width.
    pub x: f32,
    pub scale: LinearScale,
}

/// Placement of every active axis plus its vertical scale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub axes: Vec<AxisLayout>,
}

impl Layout {
    pub fn axis(&self, key: DimKey) -> Option<&AxisLayout> {
        self.axes.iter().find(|a| a.key == key)
    }

    pub fn scale(&self, key: DimKey) -> Option<&LinearScale> {
        self.axis(key).map(|a| &a.scale)
    }
}

/// Compute the layout for the active dimensions over the filtered data.
/// Deterministic: identical inputs yield identical domains.
pub fn compute_layout(active: &[DimKey], data: &[UserRecord]) -> Layout {
    let n = active.len();
    let axes = active
        .iter()
        .enumerate()
        .map(|(i, &key)| {
            let x = if n > 1 {
                (EDGE_PADDING + i as f32) / ((n - 1) as f32 + 2.0 * EDGE_PADDING)
            } else {
                0.5
            };
            AxisLayout {
                key,
                x,
                scale: scale_for(key, data),
            }
        })
        .collect();
    Layout { axes }
}

/// Vertical domain rules of §4.2: default padded/nice domain with
/// metric-specific overrides for Efficiency, BMI, and Age.
fn scale_for(key: DimKey, data: &[UserRecord]) -> LinearScale {
    let values: Vec<f64> = data.iter().filter_map(|r| key.value(r)).collect();

    let Some((min, max)) = extent(&values) else {
        // No defined values anywhere: synthesize [0, 1] instead of letting
        // NaN reach pixel coordinates.
        return LinearScale::new(0.0, 1.0);
    };

    if key == DimKey::Efficiency {
        // Percentage axis: visual floor at 50 unless the data goes lower,
        // hard ceiling at 100.
        return LinearScale::new(min.min(50.0), 100.0);
    }

    let (mut lo, mut hi) = if min == max {
        let pad = if min == 0.0 { 0.1 } else { 0.1 * min.abs() };
        (min - pad, max + pad)
    } else {
        let pad = RANGE_PAD * (max - min);
        nice_domain(min - pad, max + pad, 10)
    };

    // Physiologically implausible values stay out of the visual range.
    match key {
        DimKey::Bmi => lo = lo.max(10.0),
        DimKey::Age => lo = lo.max(18.0),
        _ => {}
    }
    if lo >= hi {
        lo = hi - 1.0;
    }

    LinearScale::new(lo, hi)
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Round a raw step to the nearest 1/2/5/10 decade multiple.
fn tick_step(range: f64, count: usize) -> f64 {
    if range <= 0.0 {
        return 0.0;
    }
    let raw = range / count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let factor = if residual >= 50f64.sqrt() {
        10.0
    } else if residual >= 10f64.sqrt() {
        5.0
    } else if residual >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

/// Expand a domain outward to tick boundaries, d3-style.
fn nice_domain(lo: f64, hi: f64, count: usize) -> (f64, f64) {
    let step = tick_step(hi - lo, count);
    if step <= 0.0 {
        return (lo, hi);
    }
    ((lo / step).floor() * step, (hi / step).ceil() * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: u32, bmi: Option<f64>, efficiency: Option<f64>) -> UserRecord {
        UserRecord {
            bmi,
            avg_efficiency: efficiency,
            ..UserRecord::steps_only(user_id, 6_000.0, 200.0)
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let data = vec![
            record(1, Some(18.0), Some(90.0)),
            record(2, Some(22.0), Some(78.0)),
            record(3, Some(30.0), None),
        ];
        let active = [DimKey::DailySteps, DimKey::Bmi, DimKey::Efficiency];

        let first = compute_layout(&active, &data);
        let second = compute_layout(&active, &data);
        assert_eq!(first, second);
    }

    #[test]
    fn test_x_positions_have_edge_padding() {
        let data = vec![record(1, Some(20.0), Some(80.0))];
        let layout = compute_layout(&[DimKey::DailySteps, DimKey::Bmi, DimKey::Age], &data);

        let xs: Vec<f32> = layout.axes.iter().map(|a| a.x).collect();
        assert!(xs[0] > 0.0 && xs[0] < xs[1]);
        assert!(*xs.last().unwrap() < 1.0);
        // Evenly spaced interior.
        assert!((xs[1] - xs[0] - (xs[2] - xs[1])).abs() < 1e-6);
    }

    #[test]
    fn test_efficiency_domain_floor_and_ceiling() {
        let data = vec![record(1, None, Some(88.0)), record(2, None, Some(95.0))];
        let scale = compute_layout(&[DimKey::Efficiency, DimKey::DailySteps], &data)
            .scale(DimKey::Efficiency)
            .unwrap()
            .clone();
        assert_eq!(scale.domain(), (50.0, 100.0));

        // Unusually low data pushes the floor below 50.
        let data = vec![record(1, None, Some(42.0)), record(2, None, Some(95.0))];
        let scale = compute_layout(&[DimKey::Efficiency, DimKey::DailySteps], &data)
            .scale(DimKey::Efficiency)
            .unwrap()
            .clone();
        assert_eq!(scale.domain(), (42.0, 100.0));
    }

    #[test]
    fn test_bmi_and_age_floors() {
        let data = vec![
            UserRecord {
                bmi: Some(11.0),
                age: Some(19.0),
                ..UserRecord::steps_only(1, 1_000.0, 10.0)
            },
            UserRecord {
                bmi: Some(35.0),
                age: Some(60.0),
                ..UserRecord::steps_only(2, 1_000.0, 10.0)
            },
        ];
        let layout = compute_layout(&[DimKey::Bmi, DimKey::Age], &data);

        // 10% pad would dip below the floors; the floors win.
        assert!(layout.scale(DimKey::Bmi).unwrap().domain().0 >= 10.0);
        assert!(layout.scale(DimKey::Age).unwrap().domain().0 >= 18.0);
    }

    #[test]
    fn test_degenerate_domain_pads_symmetrically() {
        let data = vec![record(1, Some(22.0), None), record(2, Some(22.0), None)];
        let (lo, hi) = compute_layout(&[DimKey::Bmi, DimKey::DailySteps], &data)
            .scale(DimKey::Bmi)
            .unwrap()
            .domain();
        assert!((lo - 19.8).abs() < 1e-9);
        assert!((hi - 24.2).abs() < 1e-9);
    }

    #[test]
    fn test_no_defined_values_defaults_to_unit_domain() {
        let data = vec![record(1, None, None)];
        let (lo, hi) = compute_layout(&[DimKey::Bmi, DimKey::DailySteps], &data)
            .scale(DimKey::Bmi)
            .unwrap()
            .domain();
        assert_eq!((lo, hi), (0.0, 1.0));
    }

    #[test]
    fn test_default_domain_pads_and_rounds_outward() {
        let data = vec![
            UserRecord::steps_only(1, 3_000.0, 100.0),
            UserRecord::steps_only(2, 12_000.0, 500.0),
        ];
        let (lo, hi) = compute_layout(&[DimKey::DailySteps, DimKey::ActiveMinutes], &data)
            .scale(DimKey::DailySteps)
            .unwrap()
            .domain();
        assert!(lo <= 3_000.0 - 900.0);
        assert!(hi >= 12_000.0 + 900.0);
        // Nice boundaries: multiples of the tick step.
        let step = tick_step(hi - lo, 10);
        assert!((lo / step).fract().abs() < 1e-9);
        assert!((hi / step).fract().abs() < 1e-9);
    }

    #[test]
    fn test_scale_round_trip() {
        let scale = LinearScale::new(10.0, 40.0);
        assert_eq!(scale.t(10.0), 0.0);
        assert_eq!(scale.t(40.0), 1.0);
        let value = scale.value_at(scale.t(22.5));
        assert!((value - 22.5).abs() < 1e-6);
    }

    #[test]
    fn test_ticks_cover_domain_with_round_values() {
        let scale = LinearScale::new(0.0, 100.0);
        let ticks = scale.ticks(5);
        assert!(ticks.len() >= 4 && ticks.len() <= 7);
        assert_eq!(ticks[0], 0.0);
        assert_eq!(*ticks.last().unwrap(), 100.0);
    }
}
