//! Hormone levels vs. sleep efficiency
//!
//! A butterfly chart: one column per participant with complete assay data,
//! ordered by average efficiency. Melatonin bars grow up from the midline,
//! cortisol bars grow down, each normalized to its own maximum (the assays
//! differ by eight orders of magnitude). A dashed least-squares trend line is
//! fitted per hormone against efficiency; user 12's cortisol assay is a
//! known outlier and is excluded from the fits, though the bar still shows.

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use sv_data::HormoneSample;

use super::colors::with_alpha;

const MELATONIN_COLOR: Color32 = Color32::from_rgb(120, 120, 230);
const CORTISOL_COLOR: Color32 = Color32::from_rgb(230, 160, 60);

/// User whose cortisol assay failed quality control.
const OUTLIER_USER: u32 = 12;

/// Ordinary least-squares fit of `y = slope * x + intercept`.
///
/// Returns `None` with fewer than two points or a degenerate x spread.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for &(x, y) in points {
        ss_xx += (x - mean_x) * (x - mean_x);
        ss_xy += (x - mean_x) * (y - mean_y);
    }
    if ss_xx == 0.0 {
        return None;
    }
    let slope = ss_xy / ss_xx;
    Some((slope, mean_y - slope * mean_x))
}

#[derive(Default)]
pub struct HormonePlot;

impl HormonePlot {
    /// `samples` arrive pre-sorted by average efficiency ascending.
    pub fn ui(&mut self, ui: &mut Ui, samples: &[HormoneSample]) {
        let desired = Vec2::new(ui.available_width(), 300.0);
        let (outer, response) = ui.allocate_exact_size(desired, Sense::hover());

        if samples.is_empty() {
            ui.painter().text(
                outer.center(),
                Align2::CENTER_CENTER,
                "No hormone assay data.",
                FontId::proportional(14.0),
                Color32::from_gray(160),
            );
            return;
        }

        let plot_rect = Rect::from_min_size(
            outer.min + Vec2::new(16.0, 24.0),
            outer.size() - Vec2::new(32.0, 56.0),
        );
        let midline = plot_rect.center().y;
        let half_height = plot_rect.height() * 0.5 - 4.0;

        let max_melatonin = samples.iter().map(|s| s.melatonin).fold(0.0, f64::max);
        let max_cortisol = samples.iter().map(|s| s.cortisol).fold(0.0, f64::max);

        let painter = ui.painter();
        painter.line_segment(
            [
                Pos2::new(plot_rect.left(), midline),
                Pos2::new(plot_rect.right(), midline),
            ],
            Stroke::new(1.0, Color32::from_gray(100)),
        );

        let slot = plot_rect.width() / samples.len() as f32;
        let bar_width = (slot * 0.6).min(22.0);
        let mut hovered: Option<&HormoneSample> = None;

        for (i, sample) in samples.iter().enumerate() {
            let x = plot_rect.left() + (i as f32 + 0.5) * slot;

            let mel_h = normalized(sample.melatonin, max_melatonin) * half_height;
            let cor_h = normalized(sample.cortisol, max_cortisol) * half_height;

            let mel_bar = Rect::from_min_max(
                Pos2::new(x - bar_width * 0.5, midline - mel_h),
                Pos2::new(x + bar_width * 0.5, midline),
            );
            let cor_bar = Rect::from_min_max(
                Pos2::new(x - bar_width * 0.5, midline),
                Pos2::new(x + bar_width * 0.5, midline + cor_h),
            );

            let is_hovered = response
                .hover_pos()
                .map_or(false, |pos| pos.x >= x - slot * 0.5 && pos.x < x + slot * 0.5);
            if is_hovered {
                hovered = Some(sample);
            }
            let alpha = if is_hovered { 255 } else { 200 };

            painter.rect_filled(mel_bar, Rounding::ZERO, with_alpha(MELATONIN_COLOR, alpha));
            painter.rect_filled(cor_bar, Rounding::ZERO, with_alpha(CORTISOL_COLOR, alpha));
            painter.text(
                Pos2::new(x, plot_rect.bottom() + 6.0),
                Align2::CENTER_TOP,
                format!("{:.0}%", sample.avg_efficiency),
                FontId::proportional(9.0),
                Color32::from_gray(150),
            );
        }

        self.draw_trend(
            painter,
            samples,
            |s| s.melatonin,
            max_melatonin,
            midline,
            -half_height,
            plot_rect,
            slot,
            MELATONIN_COLOR,
        );
        self.draw_trend(
            painter,
            samples,
            |s| s.cortisol,
            max_cortisol,
            midline,
            half_height,
            plot_rect,
            slot,
            CORTISOL_COLOR,
        );

        // Legend above the plot.
        let legend_y = outer.top() + 10.0;
        for (i, (color, label)) in [
            (MELATONIN_COLOR, "Melatonin (up)"),
            (CORTISOL_COLOR, "Cortisol (down)"),
        ]
        .into_iter()
        .enumerate()
        {
            let x = plot_rect.left() + i as f32 * 150.0;
            painter.rect_filled(
                Rect::from_center_size(Pos2::new(x, legend_y), Vec2::splat(9.0)),
                Rounding::ZERO,
                color,
            );
            painter.text(
                Pos2::new(x + 8.0, legend_y),
                Align2::LEFT_CENTER,
                label,
                FontId::proportional(10.0),
                Color32::from_gray(200),
            );
        }

        if let Some(sample) = hovered {
            response.clone().on_hover_text(format!(
                "User {}\nAvg efficiency: {:.1}%\nMelatonin: {:.2e}\nCortisol: {:.3}",
                sample.user_id, sample.avg_efficiency, sample.melatonin, sample.cortisol
            ));
        }
    }

    /// Fit value-vs-efficiency and draw the dashed trend through bar space.
    #[allow(clippy::too_many_arguments)]
    fn draw_trend(
        &self,
        painter: &egui::Painter,
        samples: &[HormoneSample],
        value: fn(&HormoneSample) -> f64,
        max_value: f64,
        midline: f32,
        direction: f32,
        plot_rect: Rect,
        slot: f32,
        color: Color32,
    ) {
        let points: Vec<(f64, f64)> = samples
            .iter()
            .filter(|s| s.user_id != OUTLIER_USER)
            .map(|s| (s.avg_efficiency, value(s)))
            .collect();
        let Some((slope, intercept)) = linear_regression(&points) else {
            return;
        };

        let path: Vec<Pos2> = samples
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let x = plot_rect.left() + (i as f32 + 0.5) * slot;
                let fitted = slope * s.avg_efficiency + intercept;
                let h = normalized(fitted, max_value).clamp(0.0, 1.0) * direction;
                Pos2::new(x, midline + h)
            })
            .collect();

        painter.extend(Shape::dashed_line(&path, Stroke::new(1.5, color), 6.0, 4.0));
    }
}

fn normalized(value: f64, max: f64) -> f32 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_recovers_exact_line() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let (slope, intercept) = linear_regression(&points).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_of_noisy_points() {
        let points = [(70.0, 0.30), (80.0, 0.25), (90.0, 0.18), (95.0, 0.12)];
        let (slope, _) = linear_regression(&points).unwrap();
        // Negative trend: cortisol falls as efficiency rises.
        assert!(slope < 0.0);
    }

    #[test]
    fn test_regression_degenerate_inputs() {
        assert!(linear_regression(&[]).is_none());
        assert!(linear_regression(&[(1.0, 2.0)]).is_none());
        // Vertical spread with zero x variance is unfittable.
        assert!(linear_regression(&[(5.0, 1.0), (5.0, 2.0), (5.0, 3.0)]).is_none());
    }
}
