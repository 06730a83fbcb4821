use std::{collections::HashMap, fmt, path::PathBuf};

use chrono::format::{Item, StrftimeItems};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{alarm::Tone, error::ConfigError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// snooze length given to new alarms
    pub snooze_minutes: u32,
    pub poll_interval_ms: u64,
    pub time_format: String,
    /// percent
    pub volume: f32,
    pub beep: Beep,
    pub sounds: HashMap<String, Sound>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snooze_minutes: 5,
            poll_interval_ms: 1000,
            time_format: "%Y-%m-%d %I:%M %p".to_string(),
            volume: 100.0,
            beep: Beep::default(),
            sounds: HashMap::new(),
        }
    }
}

/// the built in alarm tone
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Beep {
    pub frequency: f32,
    pub duration_ms: u64,
    pub repeats: u32,
    pub pause_ms: u64,
}

impl Default for Beep {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            duration_ms: 500,
            repeats: 5,
            pause_ms: 500,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// if the file can't be read or isn't a valid config
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&config).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        match config.check() {
            Ok(()) => Ok(config),
            Err(reason) => Err(ConfigError::Invalid { path, reason }),
        }
    }

    /// values that parse but that nothing can run with
    fn check(&self) -> Result<(), String> {
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(format!("bad time_format {:?}", self.time_format));
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be at least 1".to_string());
        }
        if self.snooze_minutes == 0 {
            return Err("snooze_minutes must be at least 1".to_string());
        }
        if self.beep.repeats == 0 {
            return Err("beep.repeats must be at least 1".to_string());
        }
        Ok(())
    }

    /// The config at [`Config::config_path`], or the default one if there is none yet.
    ///
    /// # Errors
    /// if there is a config file but it can't be loaded
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load(path)
        } else {
            warn!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// # Errors
    /// if the config can't be serialized or written
    pub fn save(&self, path: PathBuf) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, config).map_err(|source| ConfigError::Write { path, source })
    }

    /// # Errors
    /// if the user has no home directory
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = directories::ProjectDirs::from("", "", "alarm_clock")
            .ok_or(ConfigError::NoConfigDir)?
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().is_ok_and(|path| path.exists())
    }

    /// `default` for the built in tone, a registered sound name, or else a path to a sound file
    #[must_use]
    pub fn resolve_tone(&self, tone: &str) -> Tone {
        if tone.eq_ignore_ascii_case("default") {
            return Tone::Default;
        }
        self.sounds.get(tone).map_or_else(
            || Tone::Custom(PathBuf::from(tone)),
            |sound| Tone::Custom(sound.path.clone()),
        )
    }

    pub fn add_sound(&mut self, sound: Sound) -> Option<Sound> {
        self.sounds.insert(sound.name.clone(), sound)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.path.display())
    }
}

impl Sound {
    #[must_use]
    pub const fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = toml::from_str(
            r#"
            snooze_minutes = 10

            [beep]
            repeats = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.snooze_minutes, 10);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.beep.repeats, 3);
        assert_eq!(config.beep.frequency, 1000.0);
        assert!(config.sounds.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::new();
        config.add_sound(Sound::new(
            "rooster".to_string(),
            PathBuf::from("/sounds/rooster.mp3"),
        ));
        config.save(path.clone()).unwrap();
        assert_eq!(Config::load(path).unwrap(), config);
    }

    #[test]
    fn broken_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "snooze_minutes = \"five\"").unwrap();
        match Config::load(path.clone()) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn load_str(config: &str) -> Result<Config, ConfigError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, config).unwrap();
        Config::load(path)
    }

    fn invalid_reason(config: &str) -> String {
        match load_str(config) {
            Err(ConfigError::Invalid { reason, .. }) => reason,
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn bad_time_format_is_rejected_on_load() {
        assert!(invalid_reason(r#"time_format = "%Y-%Q""#).contains("time_format"));
        // a lone % is also an error item
        assert!(invalid_reason(r#"time_format = "%I:%M %""#).contains("time_format"));
        let config = load_str(r#"time_format = "%H:%M""#).unwrap();
        assert_eq!(config.time_format, "%H:%M");
    }

    #[test]
    fn default_config_passes_its_own_checks() {
        assert_eq!(Config::default().check(), Ok(()));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(invalid_reason("poll_interval_ms = 0").contains("poll_interval_ms"));
    }

    #[test]
    fn zero_beep_repeats_are_rejected() {
        assert!(invalid_reason("[beep]\nrepeats = 0").contains("repeats"));
    }

    #[test]
    fn zero_snooze_is_rejected() {
        assert!(invalid_reason("snooze_minutes = 0").contains("snooze_minutes"));
    }

    #[test]
    fn tones_resolve_by_name_then_path() {
        let mut config = Config::new();
        config.add_sound(Sound::new(
            "rooster".to_string(),
            PathBuf::from("/sounds/rooster.mp3"),
        ));
        assert_eq!(config.resolve_tone("Default"), Tone::Default);
        assert_eq!(
            config.resolve_tone("rooster"),
            Tone::Custom(PathBuf::from("/sounds/rooster.mp3"))
        );
        assert_eq!(
            config.resolve_tone("/tmp/bell.ogg"),
            Tone::Custom(PathBuf::from("/tmp/bell.ogg"))
        );
    }
}
