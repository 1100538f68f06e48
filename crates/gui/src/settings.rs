//! Viewer settings, persisted as JSON in the platform config directory.

use serde::{Deserialize, Serialize};

/// Reference grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Show grid
    pub visible: bool,
    /// Grid cell size in model units
    pub size: f32,
    /// Number of grid lines in each direction from origin
    pub range: i32,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 1.0,
            range: 5,
            opacity: 0.6,
        }
    }
}

/// Origin triedron settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Show axes
    pub visible: bool,
    /// Axis line length
    pub length: f32,
    /// Axis line thickness
    pub thickness: f32,
    /// Show axis labels (X, Y, Z)
    pub show_labels: bool,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 1.5,
            thickness: 2.0,
            show_labels: true,
        }
    }
}

/// Selection and hover highlight colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSettings {
    /// Selected entities (light sea green)
    pub select_color: [u8; 3],
    /// Hovered entity (light sky blue)
    pub hover_color: [u8; 3],
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            select_color: [32, 178, 170],
            hover_color: [135, 206, 250],
        }
    }
}

/// All viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Default background color RGB
    pub background_color: [u8; 3],
    /// Wheel zoom step per scroll line
    pub zoom_speed: f32,
    /// Anchor wheel zoom at the cursor instead of the view center
    pub zoom_at_cursor: bool,
    /// Snap distance for pointer-to-plane conversion, 0 disables
    pub grid_snap: f64,
    pub grid: GridSettings,
    pub axes: AxisSettings,
    pub highlight: HighlightSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            background_color: [128, 128, 128],
            zoom_speed: 0.1,
            zoom_at_cursor: true,
            grid_snap: 0.0,
            grid: GridSettings::default(),
            axes: AxisSettings::default(),
            highlight: HighlightSettings::default(),
        }
    }
}

impl ViewerSettings {
    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "shapeview", "shapeview") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    /// Persist settings, creating the config directory if needed
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "shapeview", "shapeview") {
            let config_dir = dirs.config_dir();
            if let Err(e) = std::fs::create_dir_all(config_dir) {
                tracing::warn!("Failed to create config dir: {e}");
                return;
            }
            let config_path = config_dir.join("settings.json");
            match serde_json::to_string_pretty(self) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::warn!("Failed to write settings: {e}");
                    }
                }
                Err(e) => tracing::warn!("Failed to serialize settings: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = ViewerSettings {
            zoom_speed: 0.25,
            grid_snap: 0.5,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: ViewerSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
