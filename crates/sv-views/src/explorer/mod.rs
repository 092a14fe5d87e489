//! Parallel-coordinates explorer
//!
//! One polyline per participant crossing every active axis. All mutable
//! state (active dimension set, efficiency filter, brushes, selection,
//! tutorial progress) lives here and is mutated only through
//! [`PcpExplorer::dispatch`], whether the command comes from a widget, a
//! pointer event, or the tutorial script.

pub mod brush;
pub mod layout;
pub mod render;
pub mod tutorial;

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use serde_json::{json, Value};
use tracing::warn;

use ahash::AHashMap;
use sv_core::{DimKey, EfficiencyFilter, ExplorerCommand, UserRecord};

use crate::plots::colors::{tier_color, with_alpha};
use brush::{classify, BrushSet, LineState};
use layout::{compute_layout, Layout};
use render::{segments_for_reveal, Polyline, PolylineCache};
pub use tutorial::TutorialSequencer;
use tutorial::{Advance, StepEffect};

/// Pixel half-width of the brush interaction strip on each axis.
const BRUSH_STRIP_HALF_WIDTH: f32 = 10.0;
/// Pixel distance within which a pointer hovers a polyline.
const HOVER_THRESHOLD: f32 = 8.0;

/// Explorer state block. Mutated only via commands.
#[derive(Debug, Clone)]
struct ExplorerState {
    /// Active dimensions, always in catalog order, never fewer than two.
    active: Vec<DimKey>,
    filter: EfficiencyFilter,
    brushes: BrushSet,
    selection: Option<u32>,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            active: DimKey::DEFAULT_ACTIVE.to_vec(),
            filter: EfficiencyFilter::All,
            brushes: BrushSet::default(),
            selection: None,
        }
    }
}

/// The parallel-coordinates explorer view.
pub struct PcpExplorer {
    state: ExplorerState,
    /// Full record set, as delivered by the assembler.
    data: Vec<UserRecord>,
    /// Filtered working set the plot currently shows.
    working: Vec<UserRecord>,
    /// Recomputed only on filter or active-set changes.
    layout: Layout,
    cache: PolylineCache,
    tutorial: TutorialSequencer,

    /// Tutorial-only stroke overrides, keyed by user.
    highlights: AHashMap<u32, Color32>,
    /// Tutorial-only synthesized callouts.
    callouts: Vec<(u32, String)>,

    // Transient interaction state.
    hovered: Option<u32>,
    drag_anchor: Option<(DimKey, f32)>,

    reveal_secs: f32,
}

impl PcpExplorer {
    pub fn new() -> Self {
        Self::with_tutorial(TutorialSequencer::default_script())
    }

    pub fn with_tutorial(tutorial: TutorialSequencer) -> Self {
        Self {
            state: ExplorerState::default(),
            data: Vec::new(),
            working: Vec::new(),
            layout: Layout::default(),
            cache: PolylineCache::default(),
            tutorial,
            highlights: AHashMap::new(),
            callouts: Vec::new(),
            hovered: None,
            drag_anchor: None,
            reveal_secs: 1.2,
        }
    }

    pub fn set_reveal_secs(&mut self, secs: f32) {
        self.reveal_secs = secs;
    }

    /// Deliver the assembled record set. Happens once per session.
    pub fn set_data(&mut self, records: Vec<UserRecord>) {
        self.data = records;
        self.rebuild();
    }

    pub fn active_dimensions(&self) -> &[DimKey] {
        &self.state.active
    }

    pub fn filter(&self) -> EfficiencyFilter {
        self.state.filter
    }

    pub fn selection(&self) -> Option<u32> {
        self.state.selection
    }

    pub fn is_locked(&self) -> bool {
        self.tutorial.locked()
    }

    pub fn working_set(&self) -> &[UserRecord] {
        &self.working
    }

    pub fn brush_interval(&self, key: DimKey) -> Option<(f32, f32)> {
        self.state.brushes.get(key)
    }

    pub fn polyline(&self, user_id: u32) -> Option<&Polyline> {
        self.cache.get(user_id)
    }

    /// Brush classification of one working-set record.
    pub fn line_state(&self, user_id: u32) -> Option<LineState> {
        self.working
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| classify(r, &self.layout, &self.state.brushes))
    }

    /// Single entry point for every state mutation. While the tutorial is
    /// locked, only `AdvanceTutorial` is honored.
    pub fn dispatch(&mut self, command: ExplorerCommand) {
        if self.tutorial.locked() && command != ExplorerCommand::AdvanceTutorial {
            return;
        }

        match command {
            ExplorerCommand::ToggleDimension { key, active } => self.toggle_dimension(key, active),
            ExplorerCommand::ApplyFilter(filter) => self.apply_filter(filter),
            ExplorerCommand::MoveBrush { key, lo, hi } => self.move_brush(key, lo, hi),
            ExplorerCommand::ClearBrush(key) => self.state.brushes.clear(key),
            ExplorerCommand::ClearAllBrushes => self.state.brushes.clear_all(),
            ExplorerCommand::SelectUser(user_id) => self.select_user(user_id),
            ExplorerCommand::AdvanceTutorial => self.advance_tutorial(),
        }
    }

    fn toggle_dimension(&mut self, key: DimKey, active: bool) {
        if active {
            if self.state.active.contains(&key) {
                return;
            }
            self.state.active.push(key);
        } else {
            // Floor invariant: the plot never drops below two axes. The
            // rejection is silent; the checkbox redraws from state and
            // visually reverts.
            if self.state.active.len() <= 2 || !self.state.active.contains(&key) {
                return;
            }
            self.state.active.retain(|k| *k != key);
            self.state.brushes.retain_active(&self.state.active);
        }
        self.state.active.sort_by_key(|k| k.catalog_index());
        self.rebuild();
    }

    fn apply_filter(&mut self, filter: EfficiencyFilter) {
        if self.state.filter == filter {
            return;
        }
        self.state.filter = filter;
        self.rebuild();
    }

    fn move_brush(&mut self, key: DimKey, lo: f32, hi: f32) {
        if !self.state.active.contains(&key) {
            warn!("brush on inactive dimension {:?} ignored", key);
            return;
        }
        self.state.brushes.set(key, lo, hi);
    }

    fn select_user(&mut self, user_id: Option<u32>) {
        // Clicking the already-selected line deselects it.
        self.state.selection = if user_id == self.state.selection {
            None
        } else {
            user_id
        };
    }

    fn advance_tutorial(&mut self) {
        // Undo the previous step's transient artifacts before applying the
        // next effect; only programmatic state (filter, brushes, axis set)
        // carries across steps.
        self.highlights.clear();
        self.callouts.clear();

        match self.tutorial.advance() {
            Advance::Step(_) => {
                if let Some(effect) = self.tutorial.current().map(|s| s.effect) {
                    self.apply_step_effect(effect);
                }
            }
            Advance::Finished => self.reset_to_defaults(),
            Advance::AlreadyDone => {}
        }
    }

    /// Apply one scripted effect. A step whose target is unavailable is
    /// skipped with a warning; the step index has already advanced, so the
    /// tutorial can never get stuck.
    fn apply_step_effect(&mut self, effect: StepEffect) {
        match effect {
            StepEffect::None => {}
            StepEffect::Filter(filter) => self.apply_filter(filter),
            StepEffect::HighlightUsers(users) => {
                self.apply_filter(EfficiencyFilter::All);
                for &(user_id, color) in users {
                    let Some(record) = self.working.iter().find(|r| r.user_id == user_id) else {
                        warn!("tutorial highlight skipped: user {user_id} not in data");
                        continue;
                    };
                    self.highlights.insert(user_id, color);
                    self.callouts.push((user_id, callout_text(record)));
                }
            }
            StepEffect::BrushValues { key, lo, hi } => {
                if !self.state.active.contains(&key) {
                    warn!("tutorial brush skipped: dimension {:?} not active", key);
                    return;
                }
                let Some(scale) = self.layout.scale(key) else {
                    warn!("tutorial brush skipped: no layout for {:?}", key);
                    return;
                };
                let (t_lo, t_hi) = (scale.t(lo), scale.t(hi));
                self.state.brushes.set(key, t_lo.clamp(0.0, 1.0), t_hi.clamp(0.0, 1.0));
            }
            StepEffect::AddDimension(key) => {
                if self.state.active.contains(&key) {
                    warn!("tutorial add-dimension skipped: {:?} already active", key);
                    return;
                }
                self.state.active.push(key);
                self.state.active.sort_by_key(|k| k.catalog_index());
                self.rebuild();
                // Scripted full redraw re-triggers the entry animation.
                self.cache.restart_reveal();
            }
        }
    }

    fn reset_to_defaults(&mut self) {
        self.state = ExplorerState::default();
        self.rebuild();
    }

    /// Rebuild the working set, layout, and polyline cache. Called on data
    /// delivery and on filter/active-set changes only; brushes and
    /// selection never invalidate the layout.
    fn rebuild(&mut self) {
        let filter = self.state.filter;
        self.working = self.data.iter().filter(|r| filter.retains(r)).copied().collect();
        self.layout = compute_layout(&self.state.active, &self.working);
        self.cache.sync(&self.working);
    }

    /// Serialize the user-facing view configuration, including whether the
    /// tutorial already ran to completion.
    pub fn save_config(&self) -> Value {
        json!({
            "active_dimensions": self.state.active,
            "filter": self.state.filter,
            "tutorial_done": !self.tutorial.locked(),
        })
    }

    /// Restore a saved configuration. A config from a session that finished
    /// the tutorial unlocks this one too; otherwise the tour would end in
    /// `reset_to_defaults` and discard the restored state.
    pub fn load_config(&mut self, config: Value) {
        if config
            .get("tutorial_done")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            self.tutorial.mark_complete();
        }
        if let Some(active) = config
            .get("active_dimensions")
            .and_then(|v| serde_json::from_value::<Vec<DimKey>>(v.clone()).ok())
        {
            if active.len() >= 2 {
                self.state.active = active;
                self.state.active.sort_by_key(|k| k.catalog_index());
                self.state.brushes.retain_active(&self.state.active);
            }
        }
        if let Some(filter) = config
            .get("filter")
            .and_then(|v| serde_json::from_value::<EfficiencyFilter>(v.clone()).ok())
        {
            self.state.filter = filter;
        }
        self.rebuild();
    }

    // ----- drawing -----------------------------------------------------

    pub fn ui(&mut self, ui: &mut Ui) {
        let locked = self.tutorial.locked();

        ui.add_enabled_ui(!locked, |ui| {
            self.controls_ui(ui);
        });

        let desired = Vec2::new(ui.available_width(), 460.0);
        let (outer, response) = ui.allocate_exact_size(desired, Sense::click());
        let plot_rect = Rect::from_min_size(
            outer.min + Vec2::new(60.0, 40.0),
            outer.size() - Vec2::new(120.0, 80.0),
        );

        if self.working.is_empty() {
            ui.painter().text(
                outer.center(),
                Align2::CENTER_CENTER,
                "No participant data for the current filter.",
                FontId::proportional(14.0),
                Color32::from_gray(160),
            );
            return;
        }

        // Animation frame: a redraw request mid-animation re-targets it.
        let dt = ui.ctx().input(|i| i.stable_dt.min(0.1));
        if self.cache.advance(dt, self.reveal_secs) {
            ui.ctx().request_repaint();
        }

        self.draw_axes(ui, plot_rect);
        self.draw_lines(ui, plot_rect);
        self.draw_legend(ui, plot_rect);
        self.draw_callouts(ui, plot_rect);

        if !locked {
            self.handle_brush_interaction(ui, plot_rect);
            self.handle_hover_and_selection(ui, plot_rect, &response);
        }
    }

    fn controls_ui(&mut self, ui: &mut Ui) {
        let mut commands: Vec<ExplorerCommand> = Vec::new();

        ui.horizontal_wrapped(|ui| {
            ui.label("Axes:");
            for key in DimKey::ALL {
                let mut checked = self.state.active.contains(&key);
                if ui.checkbox(&mut checked, key.name()).changed() {
                    commands.push(ExplorerCommand::ToggleDimension {
                        key,
                        active: checked,
                    });
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Sleep efficiency:");
            let mut filter = self.state.filter;
            egui::ComboBox::from_id_source("pcp_efficiency_filter")
                .selected_text(filter.label())
                .show_ui(ui, |ui| {
                    for option in EfficiencyFilter::ALL {
                        ui.selectable_value(&mut filter, option, option.label());
                    }
                });
            if filter != self.state.filter {
                commands.push(ExplorerCommand::ApplyFilter(filter));
            }

            if ui.button("Clear brushes").clicked() {
                commands.push(ExplorerCommand::ClearAllBrushes);
            }
        });

        for command in commands {
            self.dispatch(command);
        }
    }

    fn axis_x(&self, rect: Rect, x_frac: f32) -> f32 {
        rect.left() + x_frac * rect.width()
    }

    fn vertex(&self, rect: Rect, x_frac: f32, t: f32) -> Pos2 {
        Pos2::new(
            self.axis_x(rect, x_frac),
            rect.bottom() - t.clamp(0.0, 1.0) * rect.height(),
        )
    }

    fn line_points(&self, record: &UserRecord, rect: Rect) -> Vec<Option<Pos2>> {
        self.layout
            .axes
            .iter()
            .map(|axis| {
                axis.key
                    .value(record)
                    .map(|value| self.vertex(rect, axis.x, axis.scale.t(value)))
            })
            .collect()
    }

    fn draw_axes(&self, ui: &mut Ui, rect: Rect) {
        let painter = ui.painter();

        for axis in &self.layout.axes {
            let x = self.axis_x(rect, axis.x);

            painter.line_segment(
                [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
                Stroke::new(1.0, Color32::from_gray(120)),
            );
            painter.text(
                Pos2::new(x, rect.top() - 12.0),
                Align2::CENTER_BOTTOM,
                axis.key.name(),
                FontId::proportional(13.0),
                Color32::from_gray(220),
            );

            for tick in axis.scale.ticks(5) {
                let pos = self.vertex(rect, axis.x, axis.scale.t(tick));
                painter.line_segment(
                    [Pos2::new(pos.x - 3.0, pos.y), Pos2::new(pos.x + 3.0, pos.y)],
                    Stroke::new(1.0, Color32::from_gray(120)),
                );
                painter.text(
                    Pos2::new(pos.x - 6.0, pos.y),
                    Align2::RIGHT_CENTER,
                    axis.key.format(tick),
                    FontId::proportional(9.0),
                    Color32::from_gray(150),
                );
            }

            // Brush extent, when present.
            if let Some((lo, hi)) = self.state.brushes.get(axis.key) {
                let top = self.vertex(rect, axis.x, hi).y;
                let bottom = self.vertex(rect, axis.x, lo).y;
                let brush_rect = Rect::from_min_max(
                    Pos2::new(x - BRUSH_STRIP_HALF_WIDTH, top),
                    Pos2::new(x + BRUSH_STRIP_HALF_WIDTH, bottom),
                );
                painter.rect_filled(
                    brush_rect,
                    Rounding::ZERO,
                    Color32::from_rgba_unmultiplied(255, 200, 0, 40),
                );
                painter.rect_stroke(
                    brush_rect,
                    Rounding::ZERO,
                    Stroke::new(1.5, Color32::from_rgb(255, 200, 0)),
                );
            }
        }
    }

    fn draw_lines(&self, ui: &mut Ui, rect: Rect) {
        let painter = ui.painter();

        // Three passes: subdued lines first, plain lines, then emphasized
        // lines on top.
        for pass in 0..3 {
            for record in &self.working {
                let Some(line) = self.cache.get(record.user_id) else {
                    continue;
                };
                let state = classify(record, &self.layout, &self.state.brushes);
                let selected = self.state.selection == Some(record.user_id);
                let hovered = self.hovered == Some(record.user_id);
                let highlighted = self.highlights.contains_key(&record.user_id);
                let emphasized = selected || hovered || highlighted;

                let wanted_pass = if emphasized {
                    2
                } else if state == LineState::Inactive {
                    0
                } else {
                    1
                };
                if pass != wanted_pass {
                    continue;
                }

                let base = self
                    .highlights
                    .get(&record.user_id)
                    .copied()
                    .unwrap_or_else(|| tier_color(line.tier));
                let (color, width) = if emphasized {
                    (base, 2.5)
                } else if state == LineState::Inactive {
                    (with_alpha(base, 40), 1.0)
                } else {
                    (with_alpha(base, 180), 1.5)
                };

                let points = self.line_points(record, rect);
                for [a, b] in segments_for_reveal(&points, line.reveal) {
                    painter.line_segment([a, b], Stroke::new(width, color));
                }

                if emphasized {
                    for point in points.iter().flatten() {
                        painter.circle_filled(*point, 3.0, color);
                    }
                }
            }
        }
    }

    fn draw_legend(&self, ui: &mut Ui, rect: Rect) {
        use sv_core::ActivityTier;
        let painter = ui.painter();

        let mut y = rect.top() + 4.0;
        for tier in [ActivityTier::High, ActivityTier::Moderate, ActivityTier::Lower] {
            let x = rect.right() + 12.0;
            painter.line_segment(
                [Pos2::new(x, y), Pos2::new(x + 18.0, y)],
                Stroke::new(2.5, tier_color(tier)),
            );
            painter.text(
                Pos2::new(x + 24.0, y),
                Align2::LEFT_CENTER,
                tier.label(),
                FontId::proportional(10.0),
                Color32::from_gray(200),
            );
            y += 16.0;
        }
    }

    fn draw_callouts(&self, ui: &mut Ui, rect: Rect) {
        let painter = ui.painter();

        for (user_id, text) in &self.callouts {
            let Some(record) = self.working.iter().find(|r| r.user_id == *user_id) else {
                continue;
            };
            let points = self.line_points(record, rect);
            let Some(anchor) = points.iter().flatten().next().copied() else {
                continue;
            };
            let color = self
                .highlights
                .get(user_id)
                .copied()
                .unwrap_or(Color32::WHITE);
            painter.text(
                anchor + Vec2::new(8.0, -14.0),
                Align2::LEFT_BOTTOM,
                text,
                FontId::proportional(11.0),
                color,
            );
        }
    }

    fn handle_brush_interaction(&mut self, ui: &mut Ui, rect: Rect) {
        let mut commands: Vec<ExplorerCommand> = Vec::new();

        for axis in self.layout.axes.clone() {
            let x = self.axis_x(rect, axis.x);
            let strip = Rect::from_min_max(
                Pos2::new(x - BRUSH_STRIP_HALF_WIDTH, rect.top()),
                Pos2::new(x + BRUSH_STRIP_HALF_WIDTH, rect.bottom()),
            );
            let id = ui.id().with(("pcp_brush", axis.key));
            let response = ui.interact(strip, id, Sense::click_and_drag());

            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeVertical);
            }

            let pointer_t = response
                .interact_pointer_pos()
                .map(|pos| ((rect.bottom() - pos.y) / rect.height()).clamp(0.0, 1.0));

            if response.drag_started() {
                if let Some(t) = pointer_t {
                    self.drag_anchor = Some((axis.key, t));
                }
            }
            if response.dragged() {
                if let (Some((key, anchor)), Some(t)) = (self.drag_anchor, pointer_t) {
                    if key == axis.key {
                        commands.push(ExplorerCommand::MoveBrush {
                            key,
                            lo: anchor.min(t),
                            hi: anchor.max(t),
                        });
                    }
                }
            }
            if response.drag_released() {
                self.drag_anchor = None;
            }
            // A plain click on the strip clears that axis's brush.
            if response.clicked() {
                commands.push(ExplorerCommand::ClearBrush(axis.key));
            }
        }

        for command in commands {
            self.dispatch(command);
        }
    }

    fn handle_hover_and_selection(&mut self, ui: &mut Ui, rect: Rect, response: &egui::Response) {
        self.hovered = None;

        if self.drag_anchor.is_none() {
            if let Some(pointer) = response.hover_pos() {
                let mut best = HOVER_THRESHOLD;
                for record in &self.working {
                    let points = self.line_points(record, rect);
                    for window in points.windows(2) {
                        if let (Some(a), Some(b)) = (window[0], window[1]) {
                            let dist = distance_to_segment(pointer, a, b);
                            if dist < best {
                                best = dist;
                                self.hovered = Some(record.user_id);
                            }
                        }
                    }
                }
            }
        }

        if response.clicked() {
            self.dispatch(ExplorerCommand::SelectUser(self.hovered));
        }

        if let Some(user_id) = self.hovered {
            if let Some(record) = self.working.iter().find(|r| r.user_id == user_id) {
                let mut tooltip = format!("User {}", record.user_id);
                for axis in &self.layout.axes {
                    if let Some(value) = axis.key.value(record) {
                        tooltip.push_str(&format!(
                            "\n{}: {}",
                            axis.key.name(),
                            axis.key.format(value)
                        ));
                    }
                }
                response.clone().on_hover_text(tooltip);
            }
            ui.ctx().request_repaint();
        }
    }

    /// Full-screen tutorial overlay. Shown while locked; clicking advances
    /// the script. Once the terminal step unlocks the session the overlay is
    /// gone for good.
    pub fn tutorial_overlay(&mut self, ctx: &egui::Context) {
        let Some(step) = self.tutorial.current() else {
            return;
        };
        let text = step.text;
        let step_index = self.tutorial.step_index();

        let screen_rect = ctx.screen_rect();
        let mut advance = false;

        egui::Area::new("pcp_tutorial_bg")
            .fixed_pos([0.0, 0.0])
            .show(ctx, |ui| {
                ui.painter()
                    .rect_filled(screen_rect, 0.0, Color32::from_black_alpha(140));
                if ui
                    .allocate_rect(screen_rect, Sense::click())
                    .clicked()
                {
                    advance = true;
                }
            });

        let content_size = Vec2::new(520.0, 150.0);
        let content_pos = Pos2::new(
            screen_rect.center().x - content_size.x * 0.5,
            screen_rect.bottom() - content_size.y - 40.0,
        );

        egui::Area::new("pcp_tutorial_content")
            .fixed_pos(content_pos)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(Color32::from_gray(40))
                    .rounding(10.0)
                    .inner_margin(20.0)
                    .shadow(egui::epaint::Shadow::big_dark())
                    .show(ui, |ui| {
                        ui.set_max_width(content_size.x);
                        ui.label(
                            egui::RichText::new(format!("Guided tour — step {}", step_index + 1))
                                .size(15.0)
                                .strong(),
                        );
                        ui.add_space(6.0);
                        ui.label(egui::RichText::new(text).size(13.0));
                        ui.add_space(10.0);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Continue →").clicked() {
                                advance = true;
                            }
                        });
                    });
            });

        if advance {
            self.dispatch(ExplorerCommand::AdvanceTutorial);
        }
    }
}

impl Default for PcpExplorer {
    fn default() -> Self {
        Self::new()
    }
}

fn callout_text(record: &UserRecord) -> String {
    let efficiency = record
        .avg_efficiency
        .map(|e| format!("{e:.1}% efficiency"))
        .unwrap_or_else(|| "no sleep log".to_string());
    format!(
        "User {} — {:.0} steps, {}",
        record.user_id, record.total_daily_steps, efficiency
    )
}

/// Distance from a point to a line segment.
fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let ap = point - a;
    let ab_squared = ab.x * ab.x + ab.y * ab.y;

    if ab_squared == 0.0 {
        return ap.length();
    }

    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_squared).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (point - projection).length()
}

#[cfg(test)]
mod tests {
    use super::tutorial::{StepEffect, TutorialStep};
    use super::*;

    fn unlocked_explorer(records: Vec<UserRecord>) -> PcpExplorer {
        // An empty script unlocks on construction-time advance.
        let mut sequencer = TutorialSequencer::new(vec![TutorialStep {
            text: "",
            effect: StepEffect::None,
        }]);
        sequencer.advance();
        let mut explorer = PcpExplorer::with_tutorial(sequencer);
        explorer.set_data(records);
        explorer
    }

    fn study_records() -> Vec<UserRecord> {
        vec![
            UserRecord {
                bmi: Some(18.0),
                age: Some(25.0),
                avg_efficiency: Some(90.0),
                avg_waso: Some(35.0),
                ..UserRecord::steps_only(1, 12_000.0, 400.0)
            },
            UserRecord {
                bmi: Some(22.0),
                age: Some(31.0),
                avg_efficiency: Some(80.0),
                avg_waso: Some(55.0),
                ..UserRecord::steps_only(2, 7_000.0, 310.0)
            },
            UserRecord {
                bmi: Some(30.0),
                age: Some(44.0),
                avg_efficiency: None,
                avg_waso: None,
                ..UserRecord::steps_only(3, 3_000.0, 120.0)
            },
        ]
    }

    #[test]
    fn test_active_set_never_drops_below_two() {
        let mut explorer = unlocked_explorer(study_records());

        // Remove dimensions until only two remain, then keep trying.
        for key in DimKey::ALL {
            explorer.dispatch(ExplorerCommand::ToggleDimension { key, active: false });
        }
        assert_eq!(explorer.active_dimensions().len(), 2);

        let remaining: Vec<DimKey> = explorer.active_dimensions().to_vec();
        for key in remaining {
            explorer.dispatch(ExplorerCommand::ToggleDimension { key, active: false });
            assert_eq!(explorer.active_dimensions().len(), 2);
        }
    }

    #[test]
    fn test_active_set_keeps_catalog_order() {
        let mut explorer = unlocked_explorer(study_records());
        explorer.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::Awakenings,
            active: true,
        });
        explorer.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::ActiveMinutes,
            active: true,
        });

        let indices: Vec<usize> = explorer
            .active_dimensions()
            .iter()
            .map(|k| k.catalog_index())
            .collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn test_good_filter_scenario() {
        let mut explorer = unlocked_explorer(study_records());
        explorer.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::Good));

        let ids: Vec<u32> = explorer.working_set().iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_filter_preserves_polyline_identity() {
        let mut explorer = unlocked_explorer(study_records());
        let gen_before = explorer.polyline(1).unwrap().generation;

        explorer.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::Good));
        assert_eq!(explorer.polyline(1).unwrap().generation, gen_before);
        assert!(explorer.polyline(2).is_none());

        // Back to All: user 1 still keeps its original entry.
        explorer.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::All));
        assert_eq!(explorer.polyline(1).unwrap().generation, gen_before);
    }

    #[test]
    fn test_bmi_brush_classifies_healthy_range() {
        let mut explorer = unlocked_explorer(study_records());
        let scale = explorer.layout.scale(DimKey::Bmi).unwrap().clone();

        explorer.dispatch(ExplorerCommand::MoveBrush {
            key: DimKey::Bmi,
            lo: scale.t(18.5),
            hi: scale.t(24.9),
        });

        assert_eq!(explorer.line_state(1), Some(LineState::Inactive));
        assert_eq!(explorer.line_state(2), Some(LineState::Active));
        assert_eq!(explorer.line_state(3), Some(LineState::Inactive));

        explorer.dispatch(ExplorerCommand::ClearAllBrushes);
        for user_id in [1, 2, 3] {
            assert_eq!(explorer.line_state(user_id), Some(LineState::Neutral));
        }
    }

    #[test]
    fn test_removing_dimension_drops_its_brush() {
        let mut explorer = unlocked_explorer(study_records());
        explorer.dispatch(ExplorerCommand::MoveBrush {
            key: DimKey::Bmi,
            lo: 0.2,
            hi: 0.8,
        });
        assert!(explorer.brush_interval(DimKey::Bmi).is_some());

        explorer.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::Bmi,
            active: false,
        });
        assert!(explorer.brush_interval(DimKey::Bmi).is_none());

        explorer.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::Bmi,
            active: true,
        });
        assert!(explorer.brush_interval(DimKey::Bmi).is_none());
    }

    #[test]
    fn test_selection_toggles_and_clears() {
        let mut explorer = unlocked_explorer(study_records());

        explorer.dispatch(ExplorerCommand::SelectUser(Some(2)));
        assert_eq!(explorer.selection(), Some(2));

        // Clicking the selected line again deselects.
        explorer.dispatch(ExplorerCommand::SelectUser(Some(2)));
        assert_eq!(explorer.selection(), None);

        explorer.dispatch(ExplorerCommand::SelectUser(Some(1)));
        explorer.dispatch(ExplorerCommand::SelectUser(None));
        assert_eq!(explorer.selection(), None);
    }

    #[test]
    fn test_lock_blocks_user_commands() {
        let mut explorer = PcpExplorer::new();
        explorer.set_data(study_records());
        assert!(explorer.is_locked());

        explorer.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::Good));
        assert_eq!(explorer.filter(), EfficiencyFilter::All);

        explorer.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::Waso,
            active: true,
        });
        assert!(!explorer.active_dimensions().contains(&DimKey::Waso));
    }

    #[test]
    fn test_tutorial_walkthrough_applies_and_resets() {
        let mut explorer = PcpExplorer::new();
        explorer.set_data(study_records());

        // Step 1: efficiency filter.
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert_eq!(explorer.filter(), EfficiencyFilter::Good);

        // Step 2: highlights replace the filter with All.
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert_eq!(explorer.filter(), EfficiencyFilter::All);

        // Step 3: BMI brush.
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(explorer.brush_interval(DimKey::Bmi).is_some());

        // Step 4: WASO added, entry animation restarted.
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(explorer.active_dimensions().contains(&DimKey::Waso));
        assert_eq!(explorer.polyline(1).unwrap().reveal, 0.0);

        // Steps 5 and 6: more brushes; the BMI brush persists.
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(explorer.brush_interval(DimKey::Efficiency).is_some());
        assert!(explorer.brush_interval(DimKey::DailySteps).is_some());
        assert!(explorer.brush_interval(DimKey::Bmi).is_some());

        // Terminal click: defaults restored, unlocked for good.
        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(!explorer.is_locked());
        assert_eq!(explorer.active_dimensions(), &DimKey::DEFAULT_ACTIVE[..]);
        assert_eq!(explorer.filter(), EfficiencyFilter::All);
        assert!(explorer.brush_interval(DimKey::Bmi).is_none());
        assert_eq!(explorer.selection(), None);

        // And user commands work again.
        explorer.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::Poor));
        assert_eq!(explorer.filter(), EfficiencyFilter::Poor);
    }

    #[test]
    fn test_tutorial_step_with_missing_target_still_advances() {
        // A script brushing a dimension that is not active: the effect is
        // skipped but the index moves on and the tutorial finishes.
        let sequencer = TutorialSequencer::new(vec![
            TutorialStep {
                text: "intro",
                effect: StepEffect::None,
            },
            TutorialStep {
                text: "bad brush",
                effect: StepEffect::BrushValues {
                    key: DimKey::Awakenings,
                    lo: 1.0,
                    hi: 5.0,
                },
            },
        ]);
        let mut explorer = PcpExplorer::with_tutorial(sequencer);
        explorer.set_data(study_records());

        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(explorer.is_locked());
        assert!(explorer.brush_interval(DimKey::Awakenings).is_none());

        explorer.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(!explorer.is_locked());
    }

    #[test]
    fn test_config_round_trip() {
        let mut explorer = unlocked_explorer(study_records());
        explorer.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::Waso,
            active: true,
        });
        explorer.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::Fair));

        let config = explorer.save_config();
        let mut restored = unlocked_explorer(study_records());
        restored.load_config(config);

        assert_eq!(restored.active_dimensions(), explorer.active_dimensions());
        assert_eq!(restored.filter(), EfficiencyFilter::Fair);
    }

    #[test]
    fn test_completed_tutorial_does_not_clobber_restored_config() {
        // A session that finished the tour saves its view configuration.
        let mut first = unlocked_explorer(study_records());
        first.dispatch(ExplorerCommand::ToggleDimension {
            key: DimKey::Waso,
            active: true,
        });
        first.dispatch(ExplorerCommand::ApplyFilter(EfficiencyFilter::Good));
        let config = first.save_config();

        // The next launch starts with the full script locked; loading the
        // config must skip the tour so its terminal reset never runs.
        let mut next = PcpExplorer::new();
        next.set_data(study_records());
        assert!(next.is_locked());
        next.load_config(config);

        assert!(!next.is_locked());
        assert!(next.active_dimensions().contains(&DimKey::Waso));
        assert_eq!(next.filter(), EfficiencyFilter::Good);

        // Advancing the (already completed) tutorial is a no-op, not a reset.
        next.dispatch(ExplorerCommand::AdvanceTutorial);
        assert!(next.active_dimensions().contains(&DimKey::Waso));
        assert_eq!(next.filter(), EfficiencyFilter::Good);
    }

    #[test]
    fn test_config_without_completion_flag_keeps_tutorial_locked() {
        let mut explorer = PcpExplorer::new();
        explorer.set_data(study_records());
        explorer.load_config(serde_json::json!({
            "active_dimensions": [DimKey::DailySteps, DimKey::Bmi],
            "filter": EfficiencyFilter::Poor,
        }));
        assert!(explorer.is_locked());
    }
}
