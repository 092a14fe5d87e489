//! Shared color rules
//!
//! Categorical colors for activity tiers and efficiency buckets, plus the
//! heart-rate zone ramp used by the activity heatmap.

use egui::Color32;
use sv_core::ActivityTier;

/// Stroke color of one polyline by activity tier.
pub fn tier_color(tier: ActivityTier) -> Color32 {
    match tier {
        ActivityTier::High => Color32::from_rgb(46, 204, 113),
        ActivityTier::Moderate => Color32::from_rgb(52, 152, 219),
        ActivityTier::Lower => Color32::from_rgb(230, 126, 34),
    }
}

pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Bar colors of the efficiency chart's quality buckets.
pub fn efficiency_color(efficiency: f64) -> Color32 {
    if efficiency > 85.0 {
        Color32::from_rgb(46, 204, 113)
    } else if efficiency >= 75.0 {
        Color32::from_rgb(241, 196, 15)
    } else {
        Color32::from_rgb(231, 76, 60)
    }
}

/// Heart-rate zone boundaries (bpm) with their ramp colors, light yellow
/// through red.
pub const HR_ZONES: &[(f64, Color32, &str)] = &[
    (90.0, Color32::from_rgb(0xFF, 0xFF, 0xD0), "Moderate activity (<90)"),
    (120.0, Color32::from_rgb(0xFF, 0xE0, 0x66), "Weight control (90–120)"),
    (140.0, Color32::from_rgb(0xFF, 0xA5, 0x00), "Aerobic (120–140)"),
    (170.0, Color32::from_rgb(0xFF, 0x6B, 0x00), "Anaerobic (140–170)"),
    (f64::INFINITY, Color32::from_rgb(0xFF, 0x00, 0x00), "VO2 Max (≥170)"),
];

/// Zone color for a mean heart rate.
pub fn hr_zone_color(hr: f64) -> Color32 {
    for &(bound, color, _) in HR_ZONES {
        if hr < bound {
            return color;
        }
    }
    HR_ZONES[HR_ZONES.len() - 1].1
}

/// Opacity of a heatmap cell from its step intensity relative to the user's
/// busiest minute. Never fully transparent so low-activity minutes with HR
/// data stay visible.
pub fn step_opacity(steps: f64, max_steps: f64) -> f32 {
    if max_steps <= 0.0 {
        return 0.1;
    }
    (0.1 + 0.9 * (steps / max_steps).clamp(0.0, 1.0)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hr_zone_boundaries() {
        assert_eq!(hr_zone_color(60.0), HR_ZONES[0].1);
        assert_eq!(hr_zone_color(90.0), HR_ZONES[1].1);
        assert_eq!(hr_zone_color(139.9), HR_ZONES[2].1);
        assert_eq!(hr_zone_color(170.0), HR_ZONES[4].1);
        assert_eq!(hr_zone_color(210.0), HR_ZONES[4].1);
    }

    #[test]
    fn test_step_opacity_range() {
        assert_eq!(step_opacity(0.0, 100.0), 0.1);
        assert_eq!(step_opacity(100.0, 100.0), 1.0);
        // No steps anywhere still yields the floor opacity.
        assert_eq!(step_opacity(0.0, 0.0), 0.1);
        // Over-max values clamp instead of exceeding full opacity.
        assert_eq!(step_opacity(250.0, 100.0), 1.0);
    }

    #[test]
    fn test_efficiency_buckets_match_filter_boundaries() {
        assert_eq!(efficiency_color(90.0), efficiency_color(85.1));
        assert_eq!(efficiency_color(75.0), efficiency_color(85.0));
        assert_ne!(efficiency_color(74.9), efficiency_color(75.0));
    }
}
