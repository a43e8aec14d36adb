//! Store defaults loaded from TOML.
//!
//! The defaults live in `config/store.toml` and are embedded at compile
//! time. A front end may replace them with its own file through
//! [`StoreConfig::from_toml_str`].

use pothole_map_report_models::Coordinate;
use serde::Deserialize;
use strum_macros::{Display, EnumString};

use crate::StoreError;

const EMBEDDED_TOML: &str = include_str!("../config/store.toml");

/// Field naming convention of report objects in server responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldNaming {
    /// `deviceName`, `photoUrl`.
    CamelCase,
    /// `device_name`, `photo_url`.
    #[default]
    SnakeCase,
}

impl FieldNaming {
    /// Key holding the device name.
    #[must_use]
    pub const fn device_name(self) -> &'static str {
        match self {
            Self::CamelCase => "deviceName",
            Self::SnakeCase => "device_name",
        }
    }

    /// Key holding the optional photo URL.
    #[must_use]
    pub const fn photo_url(self) -> &'static str {
        match self {
            Self::CamelCase => "photoUrl",
            Self::SnakeCase => "photo_url",
        }
    }
}

/// Tunables of the report store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Report field naming expected from the server.
    #[serde(default)]
    pub field_naming: FieldNaming,
    /// Map center at startup.
    pub default_center: Coordinate,
    /// Zoom level at startup.
    pub default_zoom: f64,
    /// Zoom level applied after centering on the user's location.
    pub user_location_zoom: f64,
    /// Zoom level applied after centering on a searched place.
    pub place_zoom: f64,
    /// Result limit used when a fetch does not specify one.
    pub default_limit: u32,
    /// Upper bound for any requested limit.
    pub max_limit: u32,
}

impl StoreConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the TOML is malformed or the values
    /// are inconsistent.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, StoreError> {
        let config: Self = toml::de::from_str(toml_str).map_err(|e| StoreError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration embedded from `config/store.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded file is invalid, which the tests rule out.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(EMBEDDED_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded store config: {e}"))
    }

    /// Checks limits and the default center.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.max_limit == 0 {
            return Err(StoreError::Config {
                message: "max_limit must be greater than zero".to_string(),
            });
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(StoreError::Config {
                message: format!(
                    "default_limit {} must be within 1..={}",
                    self.default_limit, self.max_limit
                ),
            });
        }
        if !self.default_center.is_valid() {
            return Err(StoreError::Config {
                message: format!("default_center {} is out of range", self.default_center),
            });
        }
        Ok(())
    }

    /// Resolves the limit sent with a fetch: the requested value, or the
    /// default, never above `max_limit`.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_is_valid() {
        let config = StoreConfig::embedded();
        assert_eq!(config.field_naming, FieldNaming::SnakeCase);
        assert_eq!(
            config.default_center,
            Coordinate::new(-31.944_015_1, 115.890_127_6)
        );
        assert!((config.default_zoom - 12.0).abs() < f64::EPSILON);
        assert!((config.user_location_zoom - 12.0).abs() < f64::EPSILON);
        assert!((config.place_zoom - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.default_limit, 100);
        assert_eq!(config.max_limit, 1000);
    }

    #[test]
    fn naming_defaults_to_snake_case_when_omitted() {
        let config = StoreConfig::from_toml_str(
            r"
            default_zoom = 10.0
            user_location_zoom = 12.0
            place_zoom = 15.0
            default_limit = 50
            max_limit = 200
            default_center = { lat = 40.7128, lng = -74.006 }
            ",
        )
        .unwrap();
        assert_eq!(config.field_naming, FieldNaming::SnakeCase);
        assert_eq!(config.default_limit, 50);
    }

    #[test]
    fn rejects_inconsistent_limits() {
        let toml_str = EMBEDDED_TOML.replace("default_limit = 100", "default_limit = 5000");
        assert!(matches!(
            StoreConfig::from_toml_str(&toml_str),
            Err(StoreError::Config { .. })
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        let toml_str = format!("zoom_speed = 2\n{EMBEDDED_TOML}");
        assert!(StoreConfig::from_toml_str(&toml_str).is_err());
    }

    #[test]
    fn effective_limit_defaults_and_clamps() {
        let config = StoreConfig::embedded();
        assert_eq!(config.effective_limit(None), 100);
        assert_eq!(config.effective_limit(Some(5)), 5);
        assert_eq!(config.effective_limit(Some(0)), 1);
        assert_eq!(config.effective_limit(Some(50_000)), 1000);
    }

    #[test]
    fn naming_keys() {
        assert_eq!(FieldNaming::CamelCase.device_name(), "deviceName");
        assert_eq!(FieldNaming::SnakeCase.photo_url(), "photo_url");
        assert_eq!(
            "snake_case".parse::<FieldNaming>().unwrap(),
            FieldNaming::SnakeCase
        );
    }
}
