//! Per-user average sleep efficiency chart
//!
//! One bar per participant with a recorded sleep log, sorted by average
//! efficiency. The y domain is fixed to 60–100% so night-to-night spread
//! stays readable; hovering a bar shows the user's full sleep summary.

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use sv_data::{SleepSummary, StudyData};

use super::colors::efficiency_color;

const Y_MIN: f64 = 60.0;
const Y_MAX: f64 = 100.0;

#[derive(Default)]
pub struct EfficiencyPlot;

impl EfficiencyPlot {
    pub fn ui(&mut self, ui: &mut Ui, data: &StudyData) {
        let mut users: Vec<(u32, f64)> = data
            .records
            .iter()
            .filter_map(|r| r.avg_efficiency.map(|e| (r.user_id, e)))
            .collect();
        users.sort_by(|a, b| a.1.total_cmp(&b.1));

        let desired = Vec2::new(ui.available_width(), 260.0);
        let (outer, response) = ui.allocate_exact_size(desired, Sense::hover());
        let plot_rect = Rect::from_min_size(
            outer.min + Vec2::new(48.0, 16.0),
            outer.size() - Vec2::new(64.0, 48.0),
        );

        if users.is_empty() {
            ui.painter().text(
                outer.center(),
                Align2::CENTER_CENTER,
                "No sleep log data.",
                FontId::proportional(14.0),
                Color32::from_gray(160),
            );
            return;
        }

        let painter = ui.painter();

        // Horizontal gridlines every 10%.
        for value in [60.0, 70.0, 80.0, 90.0, 100.0] {
            let y = y_for(value, plot_rect);
            painter.line_segment(
                [
                    Pos2::new(plot_rect.left(), y),
                    Pos2::new(plot_rect.right(), y),
                ],
                Stroke::new(0.5, Color32::from_gray(60)),
            );
            painter.text(
                Pos2::new(plot_rect.left() - 6.0, y),
                Align2::RIGHT_CENTER,
                format!("{value:.0}%"),
                FontId::proportional(10.0),
                Color32::from_gray(150),
            );
        }

        let slot = plot_rect.width() / users.len() as f32;
        let bar_width = (slot * 0.7).min(28.0);
        let mut hovered: Option<u32> = None;

        for (i, &(user_id, efficiency)) in users.iter().enumerate() {
            let x = plot_rect.left() + (i as f32 + 0.5) * slot;
            let top = y_for(efficiency.clamp(Y_MIN, Y_MAX), plot_rect);
            let bar = Rect::from_min_max(
                Pos2::new(x - bar_width * 0.5, top),
                Pos2::new(x + bar_width * 0.5, plot_rect.bottom()),
            );

            let is_hovered = response
                .hover_pos()
                .map_or(false, |pos| bar.expand2(Vec2::new(slot * 0.15, 0.0)).contains(pos));
            if is_hovered {
                hovered = Some(user_id);
            }

            let color = efficiency_color(efficiency);
            painter.rect_filled(
                bar,
                Rounding::same(2.0),
                if is_hovered {
                    color
                } else {
                    super::colors::with_alpha(color, 200)
                },
            );
            painter.text(
                Pos2::new(x, plot_rect.bottom() + 4.0),
                Align2::CENTER_TOP,
                user_id.to_string(),
                FontId::proportional(9.0),
                Color32::from_gray(150),
            );
        }

        if let Some(user_id) = hovered {
            if let Some(summary) = data.summaries.get(&user_id) {
                response.clone().on_hover_text(summary_text(user_id, summary));
            }
        }
    }
}

fn y_for(value: f64, rect: Rect) -> f32 {
    let t = ((value - Y_MIN) / (Y_MAX - Y_MIN)) as f32;
    rect.bottom() - t.clamp(0.0, 1.0) * rect.height()
}

fn summary_text(user_id: u32, summary: &SleepSummary) -> String {
    let mut text = format!("User {user_id}");
    let mut push = |label: &str, value: Option<f64>, unit: &str| {
        if let Some(v) = value {
            text.push_str(&format!("\n{label}: {v:.1}{unit}"));
        }
    };
    push("Avg efficiency", summary.avg_efficiency, "%");
    push("Avg sleep time", summary.avg_tst, " min");
    push("Avg WASO", summary.avg_waso, " min");
    push("Avg awakenings", summary.avg_awakenings, "");
    push("Avg latency", summary.avg_latency, " min");
    push("BMI", summary.bmi, "");
    push("Age", summary.age, "");
    if let Some(gender) = &summary.gender {
        text.push_str(&format!("\nGender: {gender}"));
    }
    text
}
