use crate::adapters::proj::ProjectionRegistry;
use crate::core::extent::{apply_transform, widen_antimeridian, world_extent, EXTENT_STOPS};
use crate::core::hint::extract_query_hint;
use crate::domain::model::{
    RawRegistryRecord, RegistryResult, Resolution, ResolvedProjection, ViewportDescriptor,
    FALLBACK_PROJECTION,
};
use crate::domain::ports::RegistryLookup;
use crate::utils::error::{ResolverError, Result};

pub const NOT_FOUND_STATUS: &str = "Nothing usable found, using EPSG:3857...";
pub const LOOKUP_FAILED_STATUS: &str = "Registry lookup failed, using EPSG:3857...";

/// First candidate that passes validation, in registry order.
pub fn select_first_usable<I>(records: I) -> Option<RegistryResult>
where
    I: IntoIterator<Item = RawRegistryRecord>,
{
    records
        .into_iter()
        .enumerate()
        .find_map(|(index, raw)| match RegistryResult::try_from(raw) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::debug!("Skipping registry candidate #{}: {}", index, e);
                None
            }
        })
}

/// Turns search queries into viewports. Owns the registry client and the projection
/// definitions registered so far.
pub struct Resolver<R: RegistryLookup> {
    registry: R,
    projections: ProjectionRegistry,
    fallback_projection: String,
}

impl<R: RegistryLookup> Resolver<R> {
    pub fn new(registry: R) -> Self {
        Self::with_projections(registry, ProjectionRegistry::new())
    }

    pub fn with_projections(registry: R, projections: ProjectionRegistry) -> Self {
        Self {
            registry,
            projections,
            fallback_projection: FALLBACK_PROJECTION.to_string(),
        }
    }

    /// Projection shown when nothing usable is found. Defaults to Web Mercator.
    pub fn with_fallback_projection(mut self, projection: &str) -> Self {
        if !self.projections.is_defined(projection) {
            tracing::warn!(
                "⚠️ Fallback projection {} has no registered definition",
                projection
            );
        }
        self.fallback_projection = projection.to_string();
        self
    }

    pub fn projections(&self) -> &ProjectionRegistry {
        &self.projections
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn fallback_projection(&self) -> &str {
        &self.fallback_projection
    }

    fn fallback(&self, status: String) -> Resolution {
        Resolution {
            viewport: ViewportDescriptor::fallback_to(&self.fallback_projection),
            status,
        }
    }

    /// Hint extraction, registry lookup and candidate selection.
    pub async fn find(&self, query: &str) -> Result<Option<RegistryResult>> {
        let hint = extract_query_hint(query);
        tracing::info!("🔍 Searching registry for '{}' (hint '{}')", query, hint);

        let records = self.registry.lookup(&hint).await?;
        let selected = select_first_usable(records);
        match &selected {
            Some(result) => tracing::debug!("Selected {} ({})", result.projection_id(), result.name),
            None => {
                let err = ResolverError::NotFound { hint };
                tracing::info!("{} (Category: {:?})", err.user_friendly_message(), err.category());
            }
        }
        Ok(selected)
    }

    /// Computes the projected extent and registers the projection once that succeeds.
    ///
    /// A definition that fails here never reaches the registry, so an earlier definition
    /// under the same id stays in place.
    pub fn resolve_projection(&self, selected: &RegistryResult) -> Result<ResolvedProjection> {
        let id = selected.projection_id();
        let from_geographic = self
            .projections
            .from_geographic_with(&id, &selected.projection_definition)?;

        let world = world_extent(selected.bounding_box);
        let working = widen_antimeridian(world);
        if working != world {
            tracing::debug!(
                "{} world extent crosses the antimeridian, widened east edge to {}",
                id,
                working.max_x()
            );
        }

        let extent = apply_transform(
            &working,
            |x, y| from_geographic.apply(x, y),
            EXTENT_STOPS,
        )
        .map_err(|e| ResolverError::InvalidProjectionDefinition {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            "Projected extent {} -> {}: {:?}",
            from_geographic.source_id(),
            from_geographic.target_id(),
            extent.0
        );

        self.projections
            .define(&id, &selected.projection_definition)?;

        Ok(ResolvedProjection {
            id,
            code: selected.code.clone(),
            name: selected.name.clone(),
            definition: selected.projection_definition.clone(),
            world_extent: world,
            extent,
        })
    }

    /// Viewport for a selection; anything unusable falls back to the fallback projection.
    pub fn resolve(&self, selected: Option<RegistryResult>) -> Resolution {
        let Some(selected) = selected else {
            return self.fallback(format!(
                "Nothing usable found, using {}...",
                self.fallback_projection
            ));
        };

        match self.resolve_projection(&selected) {
            Ok(projection) => {
                tracing::info!(
                    "✅ Resolved {} with extent {:?}",
                    projection.id,
                    projection.extent.0
                );
                Resolution {
                    viewport: ViewportDescriptor::Resolved { projection },
                    status: selected.status_message(),
                }
            }
            Err(e) => {
                tracing::warn!("❌ {} is unusable: {}", selected.projection_id(), e);
                self.fallback(format!(
                    "{} is not usable, using {}...",
                    selected.status_message(),
                    self.fallback_projection
                ))
            }
        }
    }

    pub fn lookup_failed(&self, error: &ResolverError) -> Resolution {
        tracing::warn!(
            "❌ Registry lookup failed: {} (Category: {:?})",
            error,
            error.category()
        );
        tracing::debug!("💡 {}", error.recovery_suggestion());
        self.fallback(format!(
            "Registry lookup failed, using {}...",
            self.fallback_projection
        ))
    }

    /// Full workflow for one query. Never fails; errors become a fallback viewport.
    pub async fn search(&self, query: &str) -> Resolution {
        match self.find(query).await {
            Ok(selected) => self.resolve(selected),
            Err(e) => self.lookup_failed(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FALLBACK_ZOOM;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const UTM_32N: &str =
        "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

    struct MockRegistry {
        results: Vec<serde_json::Value>,
        fail: bool,
        hints: Mutex<Vec<String>>,
    }

    impl MockRegistry {
        fn returning(results: Vec<serde_json::Value>) -> Self {
            Self {
                results,
                fail: false,
                hints: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                results: Vec::new(),
                fail: true,
                hints: Mutex::new(Vec::new()),
            }
        }

        fn hints(&self) -> Vec<String> {
            self.hints.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RegistryLookup for MockRegistry {
        async fn lookup(&self, hint: &str) -> Result<Vec<RawRegistryRecord>> {
            self.hints.lock().unwrap().push(hint.to_string());
            if self.fail {
                return Err(ResolverError::RegistryStatusError {
                    status: 503,
                    url: "http://registry.test/".to_string(),
                });
            }
            Ok(self
                .results
                .iter()
                .cloned()
                .map(RawRegistryRecord::from_value)
                .collect())
        }
    }

    fn raw(value: serde_json::Value) -> RawRegistryRecord {
        RawRegistryRecord::from_value(value)
    }

    fn wgs84() -> serde_json::Value {
        json!({
            "code": "4326",
            "name": "WGS84",
            "proj4": "+proj=longlat +datum=WGS84 +no_defs",
            "bbox": [-90, -180, 90, 180]
        })
    }

    fn utm_32n() -> serde_json::Value {
        json!({
            "code": "25832",
            "name": "ETRS89 / UTM zone 32N",
            "proj4": UTM_32N,
            "bbox": [47.27, 6.0, 55.09, 12.0]
        })
    }

    #[test]
    fn test_select_skips_unusable() {
        let records = vec![
            raw(json!({"code": "", "name": "broken", "proj4": "+proj=longlat", "bbox": [0, 0, 1, 1]})),
            raw(wgs84()),
        ];

        let selected = select_first_usable(records).unwrap();
        assert_eq!(selected.code, "4326");
        assert_eq!(selected.name, "WGS84");
    }

    #[test]
    fn test_select_keeps_registry_order() {
        let selected = select_first_usable(vec![raw(utm_32n()), raw(wgs84())]).unwrap();
        assert_eq!(selected.code, "25832");
    }

    #[test]
    fn test_select_not_found() {
        assert!(select_first_usable(Vec::new()).is_none());
        let unusable = vec![
            raw(json!(null)),
            raw(json!({"code": "4326", "proj4": "", "bbox": [0, 0, 1, 1]})),
            raw(json!({"code": "4326", "proj4": "+proj=longlat", "bbox": [0, 0]})),
        ];
        assert!(select_first_usable(unusable).is_none());
    }

    #[test]
    fn test_select_consumes_lazily() {
        let mut seen = 0;
        let records = [raw(wgs84()), raw(json!(null))].into_iter().inspect(|_| seen += 1);
        assert!(select_first_usable(records).is_some());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_resolve_not_found_is_fallback() {
        let resolver = Resolver::new(MockRegistry::returning(Vec::new()));
        let resolution = resolver.resolve(None);

        assert_eq!(
            resolution.viewport,
            ViewportDescriptor::Fallback {
                projection: "EPSG:3857".to_string(),
                center: [0.0, 0.0],
                zoom: FALLBACK_ZOOM,
            }
        );
        assert_eq!(resolution.status, NOT_FOUND_STATUS);
    }

    #[test]
    fn test_resolve_utm_extent() {
        let resolver = Resolver::new(MockRegistry::returning(Vec::new()));
        let selected = RegistryResult::try_from(raw(utm_32n())).unwrap();

        let resolution = resolver.resolve(Some(selected));

        assert_eq!(resolution.status, "(25832) ETRS89 / UTM zone 32N");
        let ViewportDescriptor::Resolved { projection } = resolution.viewport else {
            panic!("expected a resolved viewport");
        };
        assert_eq!(projection.id, "EPSG:25832");
        assert_eq!(projection.world_extent.0, [6.0, 47.27, 12.0, 55.09]);
        assert!(projection.extent.min_x() < 500_000.0);
        assert!(projection.extent.max_x() > 500_000.0);
        assert!(projection.extent.min_y() > 5_000_000.0);
        assert!(projection.extent.max_y() < 6_200_000.0);
        assert!(resolver.projections().is_defined("EPSG:25832"));
    }

    #[test]
    fn test_resolve_antimeridian_crossing() {
        let resolver = Resolver::new(MockRegistry::returning(Vec::new()));
        let selected = RegistryResult::try_from(raw(json!({
            "code": "3832",
            "name": "WGS 84 / PDC Mercator",
            "proj4": "+proj=merc +lon_0=150 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs",
            "bbox": [-60, 98.69, 66.67, -101.79]
        })))
        .unwrap();

        let resolution = resolver.resolve(Some(selected));
        let ViewportDescriptor::Resolved { projection } = resolution.viewport else {
            panic!("expected a resolved viewport");
        };

        // declared world extent keeps the registry's east edge
        assert_eq!(projection.world_extent.max_x(), -101.79);
        // 98.69° .. 258.21° around lon_0 150° spans roughly 17.7 million metres
        assert!(projection.extent.width() > 17_000_000.0);
        assert!(projection.extent.width() < 20_000_000.0);
    }

    #[test]
    fn test_resolve_invalid_definition_falls_back() {
        let resolver = Resolver::new(MockRegistry::returning(Vec::new()));
        let selected = RegistryResult::try_from(raw(json!({
            "code": "999999",
            "name": "Imaginary",
            "proj4": "+proj=imaginary +units=m",
            "bbox": [0, 0, 1, 1]
        })))
        .unwrap();

        let resolution = resolver.resolve(Some(selected));

        assert!(resolution.viewport.is_fallback());
        assert_eq!(resolution.status, "(999999) Imaginary is not usable, using EPSG:3857...");
        assert!(!resolver.projections().is_defined("EPSG:999999"));
    }

    #[test]
    fn test_extent_failure_leaves_registry_untouched() {
        let resolver = Resolver::new(MockRegistry::returning(Vec::new()));
        let web_mercator = resolver.projections().definition("EPSG:3857");
        // Mercator has no finite y at the pole, so every extent sample is rejected
        let polar = |code: &str| {
            RegistryResult::try_from(raw(json!({
                "code": code,
                "name": "Polar strip",
                "proj4": "+proj=merc +datum=WGS84 +units=m +no_defs",
                "bbox": [90, -10, 90, 10]
            })))
            .unwrap()
        };

        let replaced = resolver.resolve(Some(polar("3857")));
        let added = resolver.resolve(Some(polar("900913")));

        assert!(replaced.viewport.is_fallback());
        assert_eq!(replaced.status, "(3857) Polar strip is not usable, using EPSG:3857...");
        assert!(added.viewport.is_fallback());
        assert_eq!(resolver.projections().definition("EPSG:3857"), web_mercator);
        assert!(!resolver.projections().is_defined("EPSG:900913"));
    }

    #[tokio::test]
    async fn test_configured_fallback_projection() {
        let resolver = Resolver::new(MockRegistry::failing()).with_fallback_projection("EPSG:4326");

        let failed = resolver.search("25832").await;
        let not_found = resolver.resolve(None);

        assert_eq!(failed.viewport, ViewportDescriptor::fallback_to("EPSG:4326"));
        assert_eq!(failed.status, "Registry lookup failed, using EPSG:4326...");
        assert_eq!(not_found.viewport.projection_id(), "EPSG:4326");
        assert_eq!(not_found.status, "Nothing usable found, using EPSG:4326...");
    }

    #[tokio::test]
    async fn test_search_without_digits_sends_empty_hint() {
        let resolver = Resolver::new(MockRegistry::returning(Vec::new()));

        let resolution = resolver.search("Pseudo-Mercator").await;

        assert_eq!(resolver.registry().hints(), vec![String::new()]);
        assert!(resolution.viewport.is_fallback());
        assert_eq!(resolution.status, NOT_FOUND_STATUS);
    }

    #[tokio::test]
    async fn test_search_lookup_failure_falls_back() {
        let resolver = Resolver::new(MockRegistry::failing());

        let resolution = resolver.search("25832").await;

        assert!(resolution.viewport.is_fallback());
        assert_eq!(resolution.status, LOOKUP_FAILED_STATUS);
    }

    #[tokio::test]
    async fn test_search_resolves_code() {
        let resolver = Resolver::new(MockRegistry::returning(vec![json!(null), utm_32n()]));

        let resolution = resolver.search("25832").await;

        assert_eq!(resolver.registry().hints(), vec!["25832".to_string()]);
        assert_eq!(resolution.viewport.projection_id(), "EPSG:25832");
        assert_eq!(resolution.status, "(25832) ETRS89 / UTM zone 32N");
    }
}
