//! Application settings

use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Directory holding the study CSVs.
    pub data_dir: String,

    /// Candidate participant ids to probe for actigraphy files.
    pub user_ids: Vec<u32>,

    /// Theme settings
    pub theme: ThemeSettings,

    /// Animation settings
    pub animation: AnimationSettings,
}

/// Theme settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSettings {
    /// UI scale factor
    pub scale_factor: f32,

    /// Whether to use dark mode
    pub dark_mode: bool,
}

/// Animation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Seconds for the left-to-right polyline reveal.
    pub reveal_secs: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            user_ids: (1..=22).collect(),
            theme: ThemeSettings {
                scale_factor: 1.0,
                dark_mode: true,
            },
            animation: AnimationSettings { reveal_secs: 1.2 },
        }
    }
}
