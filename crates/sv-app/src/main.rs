//! Main application entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use eframe::egui::{self, Context, Ui};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use sv_core::AppSettings;
use sv_data::{assemble, StudyData};
use sv_views::{EfficiencyPlot, HeatmapPlot, HormonePlot, PcpExplorer};

mod story;

const SETTINGS_FILE: &str = "somnaviz.json";
const EXPLORER_CONFIG_FILE: &str = "explorer_config.json";

/// Load outcome shared between the loader task and the UI thread.
#[derive(Default)]
struct LoadState {
    data: Option<StudyData>,
    error: Option<String>,
}

struct SomnavizApp {
    settings: AppSettings,
    load_state: Arc<RwLock<LoadState>>,
    /// Set once the loaded records have been handed to the explorer.
    data_delivered: bool,

    explorer: PcpExplorer,
    efficiency_plot: EfficiencyPlot,
    hormone_plot: HormonePlot,
    heatmap_plot: HeatmapPlot,

    /// Tokio runtime driving the data loads.
    _runtime: tokio::runtime::Runtime,
}

impl SomnavizApp {
    fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        if settings.theme.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }
        cc.egui_ctx.set_pixels_per_point(settings.theme.scale_factor);

        let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
        let load_state = Arc::new(RwLock::new(LoadState::default()));

        {
            let load_state = load_state.clone();
            let egui_ctx = cc.egui_ctx.clone();
            let data_dir = PathBuf::from(&settings.data_dir);
            let user_ids = settings.user_ids.clone();
            runtime.spawn(async move {
                match assemble(&data_dir, &user_ids).await {
                    Ok(data) => {
                        load_state.write().data = Some(data);
                    }
                    Err(e) => {
                        error!("data load failed: {e}");
                        load_state.write().error = Some(e.to_string());
                    }
                }
                egui_ctx.request_repaint();
            });
        }

        let mut explorer = PcpExplorer::new();
        explorer.set_reveal_secs(settings.animation.reveal_secs);

        Self {
            settings,
            load_state,
            data_delivered: false,
            explorer,
            efficiency_plot: EfficiencyPlot::default(),
            hormone_plot: HormonePlot::default(),
            heatmap_plot: HeatmapPlot::default(),
            _runtime: runtime,
        }
    }

    /// Hand freshly loaded records to the explorer, once.
    fn deliver_data(&mut self) {
        if self.data_delivered {
            return;
        }
        if let Some(data) = &self.load_state.read().data {
            self.explorer.set_data(data.records.clone());
            self.data_delivered = true;
            info!("study data delivered to views");
        }
    }

    fn loading_ui(&self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            if let Some(error) = &self.load_state.read().error {
                ui.colored_label(
                    egui::Color32::from_rgb(230, 100, 100),
                    format!("Failed to load study data: {error}"),
                );
                ui.label(format!(
                    "Expected the study CSVs under \"{}\".",
                    self.settings.data_dir
                ));
            } else {
                ui.spinner();
                ui.add_space(8.0);
                ui.label("Loading study data…");
            }
        });
    }

    fn story_ui(&mut self, ui: &mut Ui) {
        let load_state = self.load_state.clone();
        let guard = load_state.read();
        let Some(data) = guard.data.as_ref() else {
            return;
        };

        let section_gap = 36.0;

        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading(egui::RichText::new(story::TITLE).size(26.0).strong());
        });
        ui.add_space(12.0);
        ui.label(story::INTRO);
        ui.add_space(section_gap);

        ui.heading(story::EFFICIENCY_HEADING);
        ui.label(story::EFFICIENCY_BODY);
        ui.add_space(8.0);
        self.efficiency_plot.ui(ui, data);
        ui.add_space(section_gap);

        ui.heading(story::HORMONE_HEADING);
        ui.label(story::HORMONE_BODY);
        ui.add_space(8.0);
        self.hormone_plot.ui(ui, &data.hormones);
        ui.add_space(section_gap);

        ui.heading(story::HEATMAP_HEADING);
        ui.label(story::HEATMAP_BODY);
        ui.add_space(8.0);
        self.heatmap_plot.ui(ui, data);
        ui.add_space(section_gap);

        ui.heading(story::EXPLORER_HEADING);
        ui.label(story::EXPLORER_BODY);
        ui.add_space(8.0);
        self.explorer.ui(ui);
        ui.add_space(section_gap);

        ui.label(story::CLOSING);
        ui.add_space(48.0);
    }
}

impl eframe::App for SomnavizApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.deliver_data();

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.data_delivered {
                self.loading_ui(ui);
                return;
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let max_width = ui.available_width().min(980.0);
                    ui.vertical_centered(|ui| {
                        ui.set_max_width(max_width);
                        self.story_ui(ui);
                    });
                });
        });

        // While the guided tour runs it sits over the whole page.
        if self.data_delivered {
            self.explorer.tutorial_overlay(ctx);
        }
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if let Err(e) = save_explorer_config(&self.explorer, Path::new(EXPLORER_CONFIG_FILE)) {
            warn!("could not persist explorer config: {e}");
        }
    }
}

fn load_settings(path: &Path) -> AppSettings {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring malformed {}: {e}", path.display());
                AppSettings::default()
            }
        },
        Err(_) => AppSettings::default(),
    }
}

fn save_explorer_config(explorer: &PcpExplorer, path: &Path) -> Result<()> {
    let config = explorer.save_config();
    std::fs::write(path, serde_json::to_string_pretty(&config)?)?;
    Ok(())
}

fn load_explorer_config(explorer: &mut PcpExplorer, path: &Path) {
    if let Ok(contents) = std::fs::read_to_string(path) {
        match serde_json::from_str(&contents) {
            Ok(config) => explorer.load_config(config),
            Err(e) => warn!("ignoring malformed {}: {e}", path.display()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("starting somnaviz");

    let settings = load_settings(Path::new(SETTINGS_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 860.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        ..Default::default()
    };

    eframe::run_native(
        "Somnaviz — movement and sleep",
        options,
        Box::new(move |cc| {
            let mut app = SomnavizApp::new(cc, settings);
            load_explorer_config(&mut app.explorer, Path::new(EXPLORER_CONFIG_FILE));
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run app: {e}"))?;

    Ok(())
}
