// Configuration management
//
// Final settings are layered: built-in defaults, then the TOML config file,
// then OVERLAY_CLOCK_* environment variables, then command-line flags.

pub mod args;

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clock::TimeFormat;
use crate::error::{ConfigError, ConfigResult};
use crate::position::Placement;

pub use args::CliArgs;

/// Prefix of the environment variables read by [`Overrides::from_env`]
pub const ENV_PREFIX: &str = "OVERLAY_CLOCK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// strftime-style time format
    pub format: String,

    /// Xft font descriptor, e.g. "sans-9" or "monospace:size=12"
    pub font: String,

    /// X color name or "#rrggbb"
    pub color: String,

    /// "X,Y" offset; a negative component measures from the far edge
    pub position: Placement,

    /// Update interval in whole seconds
    pub update: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: "%T".to_string(),
            font: "sans-9".to_string(),
            color: "white".to_string(),
            position: Placement::default(),
            update: 1,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location
    ///
    /// An explicitly given file must exist. The default file is optional and
    /// its absence yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("overlay-clock").join("config.toml"))
    }

    /// Replace every value the overrides carry
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(format) = &overrides.format {
            self.format = format.clone();
        }
        if let Some(font) = &overrides.font {
            self.font = font.clone();
        }
        if let Some(color) = &overrides.color {
            self.color = color.clone();
        }
        if let Some(position) = overrides.position {
            self.position = position;
        }
        if let Some(update) = overrides.update {
            self.update = update;
        }
    }

    /// Check values that cannot be rejected while parsing
    pub fn validate(&self) -> ConfigResult<()> {
        if self.update == 0 {
            return Err(ConfigError::InvalidValue(
                "update interval must be at least 1 second".to_string(),
            ));
        }
        if self.font.is_empty() {
            return Err(ConfigError::InvalidValue("font must not be empty".to_string()));
        }
        if self.color.is_empty() {
            return Err(ConfigError::InvalidValue("color must not be empty".to_string()));
        }

        self.time_format().map(|_| ())
    }

    pub fn time_format(&self) -> ConfigResult<TimeFormat> {
        TimeFormat::new(&self.format)
            .map_err(|_| ConfigError::InvalidValue(format!("invalid time format '{}'", self.format)))
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update)
    }
}

/// Values that replace config file settings when present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub format: Option<String>,
    pub font: Option<String>,
    pub color: Option<String>,
    pub position: Option<Placement>,
    pub update: Option<u64>,
}

impl Overrides {
    /// Read `OVERLAY_CLOCK_*` variables from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars_os(std::env::vars_os())
    }

    /// Like [`Overrides::from_vars`] for raw environment pairs
    ///
    /// Names that are not UTF-8 cannot carry the prefix and are skipped. A
    /// value of one of our own variables must be UTF-8.
    pub fn from_vars_os<I>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let own = vars.into_iter().filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            if !name.starts_with(ENV_PREFIX) {
                return None;
            }
            Some(match value.into_string() {
                Ok(value) => Ok((name, value)),
                Err(_) => Err(ConfigError::InvalidValue(format!("{} is not valid UTF-8", name))),
            })
        });

        Self::from_vars(own.collect::<ConfigResult<Vec<_>>>()?)
    }

    /// Read overrides from `(name, value)` pairs; unrelated names are ignored
    pub fn from_vars<I>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::default();

        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match key {
                "FORMAT" => overrides.format = Some(value),
                "FONT" => overrides.font = Some(value),
                "COLOR" => overrides.color = Some(value),
                "POSITION" => overrides.position = Some(value.parse()?),
                "UPDATE" => overrides.update = Some(parse_interval(&value)?),
                _ => tracing::warn!(variable = %name, "Ignoring unknown environment variable"),
            }
        }

        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse an update interval given in whole seconds
pub fn parse_interval(value: &str) -> ConfigResult<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        ConfigError::InvalidValue(format!(
            "Invalid update interval '{}', expected whole seconds",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Anchor;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.format, "%T");
        assert_eq!(config.font, "sans-9");
        assert_eq!(config.color, "white");
        assert_eq!(config.position, Placement::new(20, 20));
        assert_eq!(config.update_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("format = \"%H:%M\"\nposition = \"-10,-10\"").unwrap();
        assert_eq!(config.format, "%H:%M");
        assert_eq!(config.position.anchor_x(), Anchor::Far);
        assert_eq!(config.font, "sans-9");
        assert_eq!(config.update, 1);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<Config>("colour = \"red\"").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            update: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        let config = Config {
            format: "%Q".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            format: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let overrides = Overrides::from_vars(vars(&[
            ("OVERLAY_CLOCK_FORMAT", "%R"),
            ("OVERLAY_CLOCK_POSITION", "-5,5"),
            ("OVERLAY_CLOCK_UPDATE", "30"),
            ("HOME", "/home/user"),
        ]))
        .unwrap();

        assert_eq!(overrides.format.as_deref(), Some("%R"));
        assert_eq!(overrides.position, Some(Placement::new(-5, 5)));
        assert_eq!(overrides.update, Some(30));
        assert_eq!(overrides.font, None);
    }

    #[test]
    fn test_env_invalid_values() {
        assert!(Overrides::from_vars(vars(&[("OVERLAY_CLOCK_UPDATE", "soon")])).is_err());
        assert!(Overrides::from_vars(vars(&[("OVERLAY_CLOCK_POSITION", "5")])).is_err());
    }

    #[test]
    fn test_env_skips_foreign_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let overrides = Overrides::from_vars_os(vec![
            (OsString::from("LC_CUSTOM"), OsString::from_vec(b"caf\xe9".to_vec())),
            (OsString::from_vec(b"N\xffME".to_vec()), OsString::from("x")),
            (OsString::from("OVERLAY_CLOCK_FONT"), OsString::from("mono-10")),
        ])
        .unwrap();

        assert_eq!(overrides.font.as_deref(), Some("mono-10"));
        assert_eq!(overrides.format, None);
    }

    #[test]
    fn test_env_own_non_utf8_value() {
        use std::os::unix::ffi::OsStringExt;

        let result = Overrides::from_vars_os(vec![(
            OsString::from("OVERLAY_CLOCK_FORMAT"),
            OsString::from_vec(b"%H\xe9".to_vec()),
        )]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_apply_only_replaces_present_values() {
        let mut config = Config::default();
        config.apply(&Overrides {
            color: Some("red".to_string()),
            update: Some(5),
            ..Overrides::default()
        });

        assert_eq!(config.color, "red");
        assert_eq!(config.update, 5);
        assert_eq!(config.font, "sans-9");
        assert_eq!(config.format, "%T");
    }

    #[test]
    fn test_empty_overrides() {
        assert!(Overrides::default().is_empty());
        assert!(Overrides::from_vars(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
