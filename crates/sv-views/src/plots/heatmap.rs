//! Minute-of-day activity heatmap
//!
//! One user at a time: a 24×60 grid with hours across and minutes down.
//! Cell hue encodes the minute's mean heart-rate zone; cell opacity encodes
//! step intensity relative to that user's busiest minute. Minutes with steps
//! but no heart-rate sample fall back to a neutral gray.

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Ui, Vec2};

use sv_data::StudyData;

use super::colors::{hr_zone_color, step_opacity, with_alpha, HR_ZONES};

const HOURS: usize = 24;
const MINUTES: usize = 60;

pub struct HeatmapPlot {
    selected_user: Option<u32>,
}

impl Default for HeatmapPlot {
    fn default() -> Self {
        Self {
            selected_user: None,
        }
    }
}

impl HeatmapPlot {
    pub fn ui(&mut self, ui: &mut Ui, data: &StudyData) {
        let mut user_ids: Vec<u32> = data.grids.keys().copied().collect();
        user_ids.sort_unstable();

        if user_ids.is_empty() {
            ui.label("No actigraphy data.");
            return;
        }
        if self
            .selected_user
            .map_or(true, |id| !data.grids.contains_key(&id))
        {
            self.selected_user = user_ids.first().copied();
        }

        ui.horizontal(|ui| {
            ui.label("Participant:");
            let mut selected = self.selected_user.unwrap_or(user_ids[0]);
            egui::ComboBox::from_id_source("heatmap_user")
                .selected_text(format!("User {selected}"))
                .show_ui(ui, |ui| {
                    for id in &user_ids {
                        ui.selectable_value(&mut selected, *id, format!("User {id}"));
                    }
                });
            self.selected_user = Some(selected);
        });

        let Some(grid) = self.selected_user.and_then(|id| data.grids.get(&id)) else {
            return;
        };

        let desired = Vec2::new(ui.available_width(), 330.0);
        let (outer, response) = ui.allocate_exact_size(desired, Sense::hover());
        let plot_rect = Rect::from_min_size(
            outer.min + Vec2::new(36.0, 18.0),
            outer.size() - Vec2::new(52.0, 58.0),
        );

        let cell_w = plot_rect.width() / HOURS as f32;
        let cell_h = plot_rect.height() / MINUTES as f32;
        let max_steps = grid.max_steps();

        let painter = ui.painter();
        painter.rect_filled(plot_rect, Rounding::ZERO, Color32::from_gray(25));

        for hour in 0..HOURS {
            for minute in 0..MINUTES {
                let steps = grid.steps_at(hour, minute);
                let hr = grid.hr_at(hour, minute);
                if steps <= 0.0 && hr.is_none() {
                    continue;
                }

                let base = match hr {
                    Some(hr) => hr_zone_color(hr),
                    None => Color32::from_gray(110),
                };
                let alpha = (step_opacity(steps, max_steps) * 255.0) as u8;
                let cell = Rect::from_min_size(
                    Pos2::new(
                        plot_rect.left() + hour as f32 * cell_w,
                        plot_rect.top() + minute as f32 * cell_h,
                    ),
                    Vec2::new(cell_w.ceil(), cell_h.ceil()),
                );
                painter.rect_filled(cell, Rounding::ZERO, with_alpha(base, alpha));
            }
        }

        // Hour labels every three hours.
        for hour in (0..HOURS).step_by(3) {
            painter.text(
                Pos2::new(
                    plot_rect.left() + (hour as f32 + 0.5) * cell_w,
                    plot_rect.bottom() + 4.0,
                ),
                Align2::CENTER_TOP,
                format!("{hour:02}:00"),
                FontId::proportional(9.0),
                Color32::from_gray(150),
            );
        }
        for minute in [0, 15, 30, 45] {
            painter.text(
                Pos2::new(
                    plot_rect.left() - 4.0,
                    plot_rect.top() + (minute as f32 + 0.5) * cell_h,
                ),
                Align2::RIGHT_CENTER,
                format!(":{minute:02}"),
                FontId::proportional(9.0),
                Color32::from_gray(150),
            );
        }

        // Zone legend below the hour labels.
        let mut x = plot_rect.left();
        let legend_y = plot_rect.bottom() + 22.0;
        for &(_, color, label) in HR_ZONES {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(x, legend_y), Vec2::new(10.0, 10.0)),
                Rounding::ZERO,
                color,
            );
            let galley = painter.layout_no_wrap(
                label.to_string(),
                FontId::proportional(10.0),
                Color32::from_gray(200),
            );
            let label_width = galley.size().x;
            painter.galley(Pos2::new(x + 14.0, legend_y + 5.0 - galley.size().y * 0.5), galley);
            x += 20.0 + label_width;
        }

        // Hover readout for the minute under the pointer.
        if let Some(pos) = response.hover_pos() {
            if plot_rect.contains(pos) {
                let hour = ((pos.x - plot_rect.left()) / cell_w) as usize;
                let minute = ((pos.y - plot_rect.top()) / cell_h) as usize;
                if hour < HOURS && minute < MINUTES {
                    let steps = grid.steps_at(hour, minute);
                    let hr = grid
                        .hr_at(hour, minute)
                        .map(|v| format!("{v:.0} bpm"))
                        .unwrap_or_else(|| "—".to_string());
                    response.clone().on_hover_text(format!(
                        "{hour:02}:{minute:02}\nSteps: {steps:.0}\nMean HR: {hr}"
                    ));
                }
            }
        }
    }
}
