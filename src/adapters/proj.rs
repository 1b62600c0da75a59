//! Named projection definitions backed by `proj4rs`.
//!
//! Definitions are stored as proj4 strings under an identifier such as
//! `EPSG:25832`, the same way `proj4.defs` works. Transforms are built on
//! demand between two registered identifiers.

use crate::utils::error::{ResolverError, Result};
use proj4rs::{transform::transform, Proj};
use std::collections::HashMap;
use std::sync::RwLock;

pub const GEOGRAPHIC: &str = "EPSG:4326";
pub const WEB_MERCATOR: &str = "EPSG:3857";

const GEOGRAPHIC_DEF: &str = "+proj=longlat +datum=WGS84 +no_defs";
const WEB_MERCATOR_DEF: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs";

/// True for `+proj=longlat` style definitions, whose coordinates are degrees on our side
/// and radians on the proj4rs side.
pub fn is_geographic(definition: &str) -> bool {
    definition.split_whitespace().any(|token| {
        matches!(
            token,
            "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"
        )
    })
}

fn parse(id: &str, definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| ResolverError::InvalidProjectionDefinition {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

pub struct ProjectionRegistry {
    definitions: RwLock<HashMap<String, String>>,
}

impl ProjectionRegistry {
    pub fn new() -> Self {
        let mut definitions = HashMap::new();
        definitions.insert(GEOGRAPHIC.to_string(), GEOGRAPHIC_DEF.to_string());
        definitions.insert(WEB_MERCATOR.to_string(), WEB_MERCATOR_DEF.to_string());
        Self {
            definitions: RwLock::new(definitions),
        }
    }

    /// Parses and stores `definition` under `id`, replacing any earlier definition.
    pub fn define(&self, id: &str, definition: &str) -> Result<()> {
        parse(id, definition)?;
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if definitions.insert(id.to_string(), definition.to_string()).is_some() {
            tracing::debug!("Redefined projection {}", id);
        } else {
            tracing::debug!("Registered projection {}", id);
        }
        Ok(())
    }

    pub fn definition(&self, id: &str) -> Option<String> {
        self.definitions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.definition(id).is_some()
    }

    pub fn transform(&self, from: &str, to: &str) -> Result<GeoTransform> {
        let lookup = |id: &str| {
            self.definition(id)
                .ok_or_else(|| ResolverError::UnknownProjection { id: id.to_string() })
        };
        let source_def = lookup(from)?;
        let target_def = lookup(to)?;
        GeoTransform::build(from, &source_def, to, &target_def)
    }

    /// Geographic degrees to an unregistered `definition`, leaving the registry untouched.
    pub fn from_geographic_with(&self, id: &str, definition: &str) -> Result<GeoTransform> {
        let source_def = self
            .definition(GEOGRAPHIC)
            .ok_or_else(|| ResolverError::UnknownProjection {
                id: GEOGRAPHIC.to_string(),
            })?;
        GeoTransform::build(GEOGRAPHIC, &source_def, id, definition)
    }

    /// Geographic degrees to `id`.
    pub fn from_geographic(&self, id: &str) -> Result<GeoTransform> {
        self.transform(GEOGRAPHIC, id)
    }

    /// `id` to geographic degrees.
    pub fn to_geographic(&self, id: &str) -> Result<GeoTransform> {
        self.transform(id, GEOGRAPHIC)
    }
}

impl Default for ProjectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Point transform between two registered projections.
pub struct GeoTransform {
    source_id: String,
    target_id: String,
    source: Proj,
    target: Proj,
    source_geographic: bool,
    target_geographic: bool,
}

impl GeoTransform {
    fn build(from: &str, source_def: &str, to: &str, target_def: &str) -> Result<Self> {
        Ok(GeoTransform {
            source_id: from.to_string(),
            target_id: to.to_string(),
            source: parse(from, source_def)?,
            target: parse(to, target_def)?,
            source_geographic: is_geographic(source_def),
            target_geographic: is_geographic(target_def),
        })
    }

    pub fn apply(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut point = if self.source_geographic {
            (x.to_radians(), y.to_radians())
        } else {
            (x, y)
        };
        transform(&self.source, &self.target, &mut point)?;
        if self.target_geographic {
            point = (point.0.to_degrees(), point.1.to_degrees());
        }
        Ok(point)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }
}

impl std::fmt::Debug for GeoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoTransform")
            .field("source", &self.source_id)
            .field("target", &self.target_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTM_32N: &str = "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

    #[test]
    fn test_predefined_projections() {
        let registry = ProjectionRegistry::new();
        assert!(registry.is_defined(GEOGRAPHIC));
        assert!(registry.is_defined(WEB_MERCATOR));
        assert!(!registry.is_defined("EPSG:25832"));
    }

    #[test]
    fn test_web_mercator_forward() {
        let registry = ProjectionRegistry::new();
        let to_mercator = registry.from_geographic(WEB_MERCATOR).unwrap();

        let (x, y) = to_mercator.apply(90.0, 0.0).unwrap();
        assert!((x - 10_018_754.171394622).abs() < 1e-3);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_define_and_round_trip_utm() {
        let registry = ProjectionRegistry::new();
        registry.define("EPSG:25832", UTM_32N).unwrap();

        let forward = registry.from_geographic("EPSG:25832").unwrap();
        let inverse = registry.to_geographic("EPSG:25832").unwrap();

        // central meridian of zone 32 maps to the false easting
        let (x, y) = forward.apply(9.0, 0.0).unwrap();
        assert!((x - 500_000.0).abs() < 1e-3);
        assert!(y.abs() < 1e-3);

        let (lon, lat) = inverse.apply(x, y).unwrap();
        assert!((lon - 9.0).abs() < 1e-6);
        assert!(lat.abs() < 1e-6);
    }

    #[test]
    fn test_invalid_definition_is_rejected() {
        let registry = ProjectionRegistry::new();
        let err = registry
            .define("EPSG:999999", "+proj=doesnotexist +units=m")
            .unwrap_err();
        assert!(matches!(
            err,
            ResolverError::InvalidProjectionDefinition { .. }
        ));
        assert!(!registry.is_defined("EPSG:999999"));
    }

    #[test]
    fn test_transform_to_unregistered_definition() {
        let registry = ProjectionRegistry::new();

        let forward = registry
            .from_geographic_with("EPSG:25832", UTM_32N)
            .unwrap();
        let (x, _) = forward.apply(9.0, 0.0).unwrap();

        assert!((x - 500_000.0).abs() < 1e-3);
        assert_eq!(forward.source_id(), GEOGRAPHIC);
        assert_eq!(forward.target_id(), "EPSG:25832");
        assert!(!registry.is_defined("EPSG:25832"));
    }

    #[test]
    fn test_unknown_projection() {
        let registry = ProjectionRegistry::new();
        let err = registry.from_geographic("EPSG:1").unwrap_err();
        assert!(matches!(err, ResolverError::UnknownProjection { .. }));
    }

    #[test]
    fn test_is_geographic() {
        assert!(is_geographic("+proj=longlat +datum=WGS84 +no_defs"));
        assert!(!is_geographic(UTM_32N));
    }
}
