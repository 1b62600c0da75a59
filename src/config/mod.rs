#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::hint::DEFAULT_HINT;
use crate::core::map_state::{HomeView, MapState, Overlays};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_numeric_hint, validate_positive_number,
    validate_projection_id, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// Effective settings after merging defaults, the TOML file and command line overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub registry_endpoint: String,
    pub timeout_seconds: u64,
    pub default_hint: String,
    pub fallback_projection: String,
    pub home: HomeView,
    pub base_layers: Vec<String>,
    pub overlays: Overlays,
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            registry_endpoint: config.registry_endpoint().to_string(),
            timeout_seconds: config.timeout_seconds(),
            default_hint: config.default_hint().unwrap_or(DEFAULT_HINT).to_string(),
            fallback_projection: config.fallback_projection().to_string(),
            home: config.home(),
            base_layers: config.base_layers(),
            overlays: config.overlays(),
        }
    }

    #[cfg(feature = "cli")]
    pub fn from_sources(cli: &CliConfig, file: Option<&TomlConfig>) -> Self {
        let mut settings = Self::from_toml(file.unwrap_or(&TomlConfig::default()));

        if let Some(endpoint) = &cli.registry_endpoint {
            settings.registry_endpoint = endpoint.clone();
        }
        if let Some(timeout) = cli.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if let Some(hint) = &cli.default_hint {
            settings.default_hint = hint.clone();
        }
        settings.overlays.graticule |= cli.graticule;
        settings.overlays.graticule_outline |= cli.graticule_outline;
        settings.overlays.render_reprojection_edges |= cli.render_edges;
        settings
    }

    pub fn initial_map(&self) -> MapState {
        MapState::new(&self.base_layers).with_overlays(self.overlays)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

impl ConfigProvider for Settings {
    fn registry_endpoint(&self) -> &str {
        &self.registry_endpoint
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn default_hint(&self) -> &str {
        &self.default_hint
    }

    fn fallback_projection(&self) -> &str {
        &self.fallback_projection
    }

    fn home_center(&self) -> [f64; 2] {
        self.home.center
    }

    fn home_zoom(&self) -> f64 {
        self.home.zoom
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("registry_endpoint", &self.registry_endpoint)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validate_numeric_hint("default_hint", &self.default_hint)?;
        validate_projection_id("fallback_projection", &self.fallback_projection)?;
        validate_range("home_zoom", self.home.zoom, 0.0, 28.0)?;
        for name in &self.base_layers {
            validate_non_empty_string("base_layers", name)?;
        }
        Ok(())
    }
}
