//! Tutorial sequencer
//!
//! A finite script of explanatory steps that overrides filter, axis-set,
//! brush, and highlight state on each click, then hands control back to the
//! user permanently. Steps are data-described (`text` plus a tagged effect)
//! and executed by a generic stepper, so each one is independently testable
//! and the sequencer can never get stuck: a step whose target is missing is
//! skipped with a warning and the index still advances.

use egui::Color32;
use sv_core::{DimKey, EfficiencyFilter};

/// Scripted side effect applied when a step is entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEffect {
    /// Explanatory text only.
    None,
    /// Replace the efficiency filter and redraw.
    Filter(EfficiencyFilter),
    /// Reset the filter, then highlight specific users with fixed tutorial
    /// colors and synthesized callouts.
    HighlightUsers(&'static [(u32, Color32)]),
    /// Set one dimension's brush to a fixed value interval.
    BrushValues { key: DimKey, lo: f64, hi: f64 },
    /// Add a dimension to the active set and re-trigger the entry
    /// animation. Persists into the following steps.
    AddDimension(DimKey),
}

/// One scripted step.
#[derive(Debug, Clone, Copy)]
pub struct TutorialStep {
    pub text: &'static str,
    pub effect: StepEffect,
}

/// Outcome of one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Entered the step at this index; apply its effect.
    Step(usize),
    /// Walked past the last step: unlock and reset to defaults.
    Finished,
    /// The tutorial already completed; advancing is a no-op forever.
    AlreadyDone,
}

/// Users called out in step 2, with their fixed tutorial colors.
pub const HIGHLIGHTED_USERS: &[(u32, Color32)] = &[
    (5, Color32::from_rgb(250, 100, 150)),
    (14, Color32::from_rgb(100, 220, 220)),
];

/// Click-advanced script state. `locked` blocks all user-driven mutation
/// until the script completes, then stays false for the session.
pub struct TutorialSequencer {
    steps: Vec<TutorialStep>,
    step_index: usize,
    locked: bool,
}

impl TutorialSequencer {
    pub fn new(steps: Vec<TutorialStep>) -> Self {
        Self {
            steps,
            step_index: 0,
            locked: true,
        }
    }

    /// The scripted walkthrough shown on first visit.
    pub fn default_script() -> Self {
        Self::new(vec![
            TutorialStep {
                text: "Each line is one participant, crossing every axis at their \
                       value for that metric. Click anywhere to walk through what \
                       the explorer can do.",
                effect: StepEffect::None,
            },
            TutorialStep {
                text: "Filters narrow the whole plot. Here: only participants whose \
                       average sleep efficiency is above 85%.",
                effect: StepEffect::Filter(EfficiencyFilter::Good),
            },
            TutorialStep {
                text: "Back to everyone. These two participants sleep very \
                       differently despite similar step counts — follow their \
                       highlighted lines across the axes.",
                effect: StepEffect::HighlightUsers(HIGHLIGHTED_USERS),
            },
            TutorialStep {
                text: "Dragging along an axis brushes it. This brush keeps only the \
                       medically healthy BMI range.",
                effect: StepEffect::BrushValues {
                    key: DimKey::Bmi,
                    lo: 18.5,
                    hi: 24.9,
                },
            },
            TutorialStep {
                text: "Axes can be added or removed with the checkboxes. Adding \
                       WASO — minutes awake after first falling asleep — redraws \
                       every line.",
                effect: StepEffect::AddDimension(DimKey::Waso),
            },
            TutorialStep {
                text: "Brushes combine: a line must pass every brushed axis to stay \
                       bright. Adding an efficiency brush on top of the BMI one.",
                effect: StepEffect::BrushValues {
                    key: DimKey::Efficiency,
                    lo: 85.0,
                    hi: 100.0,
                },
            },
            TutorialStep {
                text: "One more: only the most active participants. Click once more \
                       to clear everything and explore on your own.",
                effect: StepEffect::BrushValues {
                    key: DimKey::DailySteps,
                    lo: 8_000.0,
                    hi: 50_000.0,
                },
            },
        ])
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Unlock without stepping through the script. Restored sessions that
    /// already completed the tour skip it entirely.
    pub fn mark_complete(&mut self) {
        self.locked = false;
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// The step currently shown, or `None` once unlocked.
    pub fn current(&self) -> Option<&TutorialStep> {
        if self.locked {
            self.steps.get(self.step_index)
        } else {
            None
        }
    }

    /// Advance one step. Strictly monotonic; the terminal transition is
    /// one-way and nothing can re-lock the session.
    pub fn advance(&mut self) -> Advance {
        if !self.locked {
            return Advance::AlreadyDone;
        }
        self.step_index += 1;
        if self.step_index >= self.steps.len() {
            self.locked = false;
            Advance::Finished
        } else {
            Advance::Step(self.step_index)
        }
    }
}

impl Default for TutorialSequencer {
    fn default() -> Self {
        Self::default_script()
    }
}
