use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use merge_core::{ConversionMode, FormatCatalog, OutputFormat};
use merge_engine::AtomicFileWriter;
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILENAME: &str = ".html_merge.ron";

/// User preferences kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_format: String,
    pub enabled_formats: Vec<String>,
    pub single_folder: bool,
    /// Offered as the answer when the input prompt is left blank.
    pub last_input: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::html().to_string(),
            enabled_formats: FormatCatalog::default()
                .formats()
                .iter()
                .map(ToString::to_string)
                .collect(),
            single_folder: false,
            last_input: None,
        }
    }
}

impl Settings {
    /// Formats offered to the user. Blank names are dropped.
    pub fn catalog(&self) -> FormatCatalog {
        FormatCatalog::new(
            self.enabled_formats
                .iter()
                .filter_map(|name| OutputFormat::new(name)),
        )
    }

    /// The configured default, or the catalog's first format when it is blank.
    pub fn default_format(&self) -> OutputFormat {
        OutputFormat::new(&self.default_format).unwrap_or_else(|| self.catalog().first().clone())
    }

    pub fn default_mode(&self) -> ConversionMode {
        if self.single_folder {
            ConversionMode::Single
        } else {
            ConversionMode::Batch
        }
    }
}

pub fn default_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(SETTINGS_FILENAME)
}

/// Missing or unreadable settings fall back to the defaults.
pub fn load(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Settings::default();
        }
        Err(err) => {
            engine_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            engine_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}

pub fn save(path: &Path, settings: &Settings) {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        engine_error!("Settings path {:?} has no file name", path);
        return;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(settings, pretty) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize settings: {}", err);
            return;
        }
    };

    if let Err(err) = AtomicFileWriter::new(dir).write(file_name, &content) {
        engine_error!("Failed to write settings to {:?}: {}", path, err);
    }
}
