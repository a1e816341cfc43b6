use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log levels accepted by [`Settings::set_log_level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// User settings loaded from ~/.config/mailcompose/settings.json
///
/// New fields need a `#[serde(default = ...)]` so older settings files keep
/// loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Absolute path of the alias file. `None` means the neomutt default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_file: Option<PathBuf>,

    /// Default tracing level for the command-line front end.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            alias_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from ~/.config/mailcompose/settings.json.
    /// Falls back to defaults if the file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::settings_path();
        if !path.exists() {
            return Settings::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Settings::default()
            }
        }
    }

    /// Load and validate settings from `path`.
    /// Returns descriptive error messages for display.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file at {}: {}", path.display(), e))?;

        let mut settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse settings.json: {}. Check JSON syntax.", e))?;

        if let Some(alias_file) = settings.alias_file.take() {
            settings.set_alias_file(alias_file)?;
        }
        let level = std::mem::take(&mut settings.log_level);
        settings.set_log_level(&level)?;
        Ok(settings)
    }

    /// Point completion at a specific alias file. Must be absolute.
    pub fn set_alias_file(&mut self, path: impl Into<PathBuf>) -> Result<(), String> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(format!(
                "alias_file must be an absolute path: {}",
                path.display()
            ));
        }
        self.alias_file = Some(path);
        Ok(())
    }

    /// Go back to the default alias location.
    pub fn clear_alias_file(&mut self) {
        self.alias_file = None;
    }

    pub fn set_log_level(&mut self, level: &str) -> Result<(), String> {
        let level = level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(format!("Invalid log_level: '{}'", level));
        }
        self.log_level = level;
        Ok(())
    }

    /// The alias file completion reads: the override if set, otherwise
    /// `$HOME/.config/neomutt/aliases`.
    pub fn alias_path(&self) -> PathBuf {
        self.alias_file
            .clone()
            .unwrap_or_else(|| home_dir().join(".config").join("neomutt").join("aliases"))
    }

    /// Save settings to ~/.config/mailcompose/settings.json
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn settings_path() -> PathBuf {
        home_dir()
            .join(".config")
            .join("mailcompose")
            .join("settings.json")
    }
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}
