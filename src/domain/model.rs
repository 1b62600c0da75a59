use crate::utils::error::ResolverError;
use serde::{Deserialize, Serialize};

pub const FALLBACK_PROJECTION: &str = "EPSG:3857";
pub const FALLBACK_CENTER: [f64; 2] = [0.0, 0.0];
pub const FALLBACK_ZOOM: f64 = 1.0;

/// Body of a registry search response. Anything but an array under `results` reads as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryResponse {
    #[serde(default, deserialize_with = "results_or_empty")]
    pub results: Vec<serde_json::Value>,
}

fn results_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items,
        _ => Vec::new(),
    })
}

/// One untyped candidate as the registry sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRegistryRecord {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub proj4: Option<serde_json::Value>,
    #[serde(default)]
    pub bbox: Option<serde_json::Value>,
}

impl RawRegistryRecord {
    /// Non-object entries (null, numbers, ...) become an empty record that never validates.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// A registry candidate that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryResult {
    pub code: String,
    pub name: String,
    pub projection_definition: String,
    /// `[south, west, north, east]` as delivered by the registry.
    pub bounding_box: [f64; 4],
}

impl RegistryResult {
    pub fn projection_id(&self) -> String {
        format!("EPSG:{}", self.code)
    }

    pub fn status_message(&self) -> String {
        format!("({}) {}", self.code, self.name)
    }
}

fn non_empty_string(value: Option<&serde_json::Value>, field: &str) -> Result<String, ResolverError> {
    match value.and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ResolverError::ValidationError {
            message: format!("registry field '{}' is missing or empty", field),
        }),
    }
}

impl TryFrom<RawRegistryRecord> for RegistryResult {
    type Error = ResolverError;

    fn try_from(raw: RawRegistryRecord) -> Result<Self, Self::Error> {
        let code = non_empty_string(raw.code.as_ref(), "code")?;
        let projection_definition = non_empty_string(raw.proj4.as_ref(), "proj4")?;

        let components = raw
            .bbox
            .as_ref()
            .and_then(|v| v.as_array())
            .ok_or_else(|| ResolverError::ValidationError {
                message: format!("registry entry {} has no bbox array", code),
            })?;
        if components.len() != 4 {
            return Err(ResolverError::ValidationError {
                message: format!(
                    "registry entry {} has a bbox with {} components",
                    code,
                    components.len()
                ),
            });
        }
        let mut bounding_box = [0.0; 4];
        for (slot, component) in bounding_box.iter_mut().zip(components) {
            *slot = component
                .as_f64()
                .filter(|n| n.is_finite())
                .ok_or_else(|| ResolverError::ValidationError {
                    message: format!("registry entry {} has a non-numeric bbox", code),
                })?;
        }

        let name = raw
            .name
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(RegistryResult {
            code,
            name,
            projection_definition,
            bounding_box,
        })
    }
}

/// `[min_x, min_y, max_x, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent(pub [f64; 4]);

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self([min_x, min_y, max_x, max_y])
    }

    pub fn min_x(&self) -> f64 {
        self.0[0]
    }

    pub fn min_y(&self) -> f64 {
        self.0[1]
    }

    pub fn max_x(&self) -> f64 {
        self.0[2]
    }

    pub fn max_y(&self) -> f64 {
        self.0[3]
    }

    pub fn width(&self) -> f64 {
        self.max_x() - self.min_x()
    }

    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_x() + self.max_x()) / 2.0,
            (self.min_y() + self.max_y()) / 2.0,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProjection {
    /// `EPSG:<code>`
    pub id: String,
    pub code: String,
    pub name: String,
    pub definition: String,
    /// Geographic validity area, `[west, south, east, north]` in degrees.
    pub world_extent: Extent,
    /// The world extent in projected coordinates.
    pub extent: Extent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportDescriptor {
    Fallback {
        projection: String,
        center: [f64; 2],
        zoom: f64,
    },
    /// Fit the view to `projection.extent`.
    Resolved { projection: ResolvedProjection },
}

impl ViewportDescriptor {
    pub fn fallback() -> Self {
        Self::fallback_to(FALLBACK_PROJECTION)
    }

    /// Fallback view centered on the origin of `projection`.
    pub fn fallback_to(projection: &str) -> Self {
        ViewportDescriptor::Fallback {
            projection: projection.to_string(),
            center: FALLBACK_CENTER,
            zoom: FALLBACK_ZOOM,
        }
    }

    pub fn projection_id(&self) -> &str {
        match self {
            ViewportDescriptor::Fallback { projection, .. } => projection,
            ViewportDescriptor::Resolved { projection } => &projection.id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ViewportDescriptor::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub viewport: ViewportDescriptor,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Searching,
    Resolved,
    NotFound,
}
