//! # Configuration System
//!
//! Engine settings grouped per subsystem, loadable from TOML or RON files
//! through the [`Config`] trait. The format is picked from the file extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load configuration from file, falling back to defaults on any error
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default configuration, could not load {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title shown before the first FPS sample
    pub title: String,
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
    /// Append the measured FPS to the title once per second
    pub show_fps_in_title: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "SNAKE Engine".to_string(),
            width: 800,
            height: 600,
            show_fps_in_title: true,
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA colour used when clearing the frame
    pub clear_color: [f32; 4],
    /// Render layers registered at startup, as `(tag, id)` pairs
    pub layers: Vec<(String, u8)>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            layers: Vec::new(),
        }
    }
}

/// Broad-phase collision settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Edge length of one spatial hash cell in world units
    pub cell_size: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { cell_size: crate::spatial::DEFAULT_CELL_SIZE }
    }
}

/// Debug and diagnostics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Draw collider outlines every frame
    pub draw_colliders: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            draw_colliders: false,
        }
    }
}

impl DebugConfig {
    /// Parsed log level, `Info` if the string is not a known level
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// # Engine Configuration
///
/// Top-level configuration handed to [`crate::Engine::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Rendering settings
    pub render: RenderConfig,
    /// Collision settings
    pub collision: CollisionConfig,
    /// Debug settings
    pub debug: DebugConfig,
}

impl EngineConfig {
    /// Set window title and size
    pub fn with_window(mut self, title: impl Into<String>, width: u32, height: u32) -> Self {
        self.window.title = title.into();
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Enable collider debug drawing
    pub fn with_collider_debug(mut self, enabled: bool) -> Self {
        self.debug.draw_colliders = enabled;
        self
    }

    /// Add a render layer registered at startup
    pub fn with_layer(mut self, tag: impl Into<String>, id: u8) -> Self {
        self.render.layers.push((tag.into(), id));
        self
    }
}

impl Config for EngineConfig {}
