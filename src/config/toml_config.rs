use crate::adapters::http::DEFAULT_REGISTRY_ENDPOINT;
use crate::core::map_state::{HomeView, Overlays, BASE_LAYERS};
use crate::domain::model::FALLBACK_PROJECTION;
use crate::utils::error::{ResolverError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_numeric_hint, validate_positive_number,
    validate_projection_id, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_HOME: HomeView = HomeView {
    center: [545_817.327_132_996_6, 6_177_480.060_318_704],
    zoom: 5.0,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub registry: Option<RegistryConfig>,
    pub defaults: Option<DefaultsConfig>,
    pub overlays: Option<OverlaysConfig>,
    pub layers: Option<LayersConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub hint: Option<String>,
    pub fallback_projection: Option<String>,
    pub home_center: Option<[f64; 2]>,
    pub home_zoom: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlaysConfig {
    pub graticule: Option<bool>,
    pub graticule_outline: Option<bool>,
    pub render_reprojection_edges: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayersConfig {
    pub base: Option<Vec<String>>,
}

impl TomlConfig {
    /// Loads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ResolverError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ResolverError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ResolverError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn registry_endpoint(&self) -> &str {
        self.registry
            .as_ref()
            .and_then(|r| r.endpoint.as_deref())
            .unwrap_or(DEFAULT_REGISTRY_ENDPOINT)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.registry
            .as_ref()
            .and_then(|r| r.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn default_hint(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.hint.as_deref())
    }

    pub fn fallback_projection(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.fallback_projection.as_deref())
            .unwrap_or(FALLBACK_PROJECTION)
    }

    pub fn home(&self) -> HomeView {
        let defaults = self.defaults.clone().unwrap_or_default();
        HomeView {
            center: defaults.home_center.unwrap_or(DEFAULT_HOME.center),
            zoom: defaults.home_zoom.unwrap_or(DEFAULT_HOME.zoom),
        }
    }

    pub fn overlays(&self) -> Overlays {
        let overlays = self.overlays.clone().unwrap_or_default();
        Overlays {
            graticule: overlays.graticule.unwrap_or(false),
            graticule_outline: overlays.graticule_outline.unwrap_or(false),
            render_reprojection_edges: overlays.render_reprojection_edges.unwrap_or(false),
        }
    }

    pub fn base_layers(&self) -> Vec<String> {
        self.layers
            .as_ref()
            .and_then(|l| l.base.clone())
            .unwrap_or_else(|| BASE_LAYERS.iter().map(|s| s.to_string()).collect())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("registry.endpoint", self.registry_endpoint())?;
        validate_positive_number("registry.timeout_seconds", self.timeout_seconds(), 1)?;

        if let Some(hint) = self.default_hint() {
            validate_numeric_hint("defaults.hint", hint)?;
        }
        validate_projection_id("defaults.fallback_projection", self.fallback_projection())?;
        validate_range("defaults.home_zoom", self.home().zoom, 0.0, 28.0)?;

        for name in self.base_layers() {
            validate_non_empty_string("layers.base", &name)?;
        }
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
