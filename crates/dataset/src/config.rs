use std::fs;
use std::path::{Path, PathBuf};

use meteraug_core::{Meter, TargetMeter, TransformOptions};
use serde::{Deserialize, Serialize};

use crate::library::INGEST_SAMPLE_RATE;

/// Datasets augmented when none are named.
pub const DEFAULT_DATASETS: [&str; 4] = ["beatles", "gtzan", "rwcc", "rwcj"];

/// Targets produced when none are named.
pub const DEFAULT_TARGETS: [TargetMeter; 2] = [TargetMeter::TwoFour, TargetMeter::ThreeFour];

/// Settings for an augmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentSettings {
    pub datasets: Vec<String>,
    pub targets: Vec<TargetMeter>,
    /// Only tracks labelled with one of these meters are augmented.
    pub include_meters: Vec<Meter>,
    /// Beat position removed from each bar by the 3/4 transform.
    pub three_four_drop_position: u32,
    pub sample_rate: u32,
    /// Snap splice points to the nearest zero crossing.
    pub align_zeros: bool,
}

impl Default for AugmentSettings {
    fn default() -> Self {
        Self {
            datasets: DEFAULT_DATASETS.iter().map(|s| s.to_string()).collect(),
            targets: DEFAULT_TARGETS.to_vec(),
            include_meters: vec![Meter::FOUR_FOUR],
            three_four_drop_position: 4,
            sample_rate: INGEST_SAMPLE_RATE,
            align_zeros: true,
        }
    }
}

impl AugmentSettings {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            three_four_drop_position: self.three_four_drop_position,
            align_zeros: self.align_zeros,
        }
    }
}

/// Loads and persists [`AugmentSettings`] as a versioned JSON file.
pub struct SettingsManager {
    config_path: PathBuf,
    settings: AugmentSettings,
}

/// On-disk form of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile {
    pub version: String,
    pub settings: AugmentSettings,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub modified_at: String,
}

impl SettingsManager {
    /// Create a settings manager
    /// If no path is provided, defaults to 'meteraug.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("meteraug.json"));

        Self {
            config_path,
            settings: AugmentSettings::default(),
        }
    }

    /// Load settings from the settings file.
    /// A missing file leaves the defaults in place and is not created.
    pub fn load(&mut self) -> Result<AugmentSettings, SettingsError> {
        if !self.config_path.exists() {
            log::debug!(
                "No settings file at {:?}, using defaults",
                self.config_path
            );
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::ReadError(e.to_string()))?;

        let file: SettingsFile =
            serde_json::from_str(&content).map_err(|e| SettingsError::ParseError(e.to_string()))?;

        if file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Settings file version {} doesn't match application version {}",
                file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&file.settings).map_err(SettingsError::ValidationError)?;

        self.settings = file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to the settings file
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| SettingsError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let file = SettingsFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: now.clone(),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| SettingsError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Validate, replace, and save settings
    pub fn update_settings(&mut self, settings: AugmentSettings) -> Result<(), SettingsError> {
        Self::validate_settings(&settings).map_err(SettingsError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &AugmentSettings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Check every field, collecting all violations.
    pub fn validate_settings(settings: &AugmentSettings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(1..=4).contains(&settings.three_four_drop_position) {
            errors.push(format!(
                "three_four_drop_position must be between 1 and 4, got {}",
                settings.three_four_drop_position
            ));
        }

        if !(8000..=192000).contains(&settings.sample_rate) {
            errors.push(format!(
                "sample_rate must be between 8000 and 192000, got {}",
                settings.sample_rate
            ));
        }

        if settings.targets.is_empty() {
            errors.push("targets must not be empty".to_string());
        }

        if settings.include_meters.is_empty() {
            errors.push("include_meters must not be empty".to_string());
        }

        if settings.datasets.iter().any(|d| d.trim().is_empty()) {
            errors.push("dataset names must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Settings error types
#[derive(Debug)]
pub enum SettingsError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::ReadError(msg) => write!(f, "Failed to read settings file: {}", msg),
            SettingsError::WriteError(msg) => write!(f, "Failed to write settings file: {}", msg),
            SettingsError::ParseError(msg) => write!(f, "Failed to parse settings file: {}", msg),
            SettingsError::SerializeError(msg) => {
                write!(f, "Failed to serialize settings: {}", msg)
            }
            SettingsError::ValidationError(errors) => {
                write!(f, "Settings validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for SettingsError {}
