use crate::domain::model::{Extent, ViewportDescriptor, FALLBACK_CENTER, FALLBACK_ZOOM};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ResolverError, Result};
use serde::{Deserialize, Serialize};

pub const BASE_LAYERS: [&str; 3] = ["osm", "stamen-watercolor", "stamen-toner"];

/// Map view as the UI should build it. Replaced as a whole, never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub projection: String,
    pub center: Option<[f64; 2]>,
    pub zoom: Option<f64>,
    /// Extent the view is fitted to, when no explicit center/zoom is set.
    pub fit_extent: Option<Extent>,
}

impl View {
    pub fn from_viewport(viewport: &ViewportDescriptor) -> Self {
        match viewport {
            ViewportDescriptor::Fallback {
                projection,
                center,
                zoom,
            } => View {
                projection: projection.clone(),
                center: Some(*center),
                zoom: Some(*zoom),
                fit_extent: None,
            },
            ViewportDescriptor::Resolved { projection } => View {
                projection: projection.id.clone(),
                center: None,
                zoom: None,
                fit_extent: Some(projection.extent),
            },
        }
    }
}

impl Default for View {
    fn default() -> Self {
        View::from_viewport(&ViewportDescriptor::fallback())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeView {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl HomeView {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        HomeView {
            center: config.home_center(),
            zoom: config.home_zoom(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlays {
    pub graticule: bool,
    pub graticule_outline: bool,
    /// Draw reprojection triangle edges on tile-image layers.
    pub render_reprojection_edges: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    pub view: View,
    pub base_layers: Vec<BaseLayer>,
    pub overlays: Overlays,
}

impl MapState {
    /// First layer visible, the rest hidden.
    pub fn new<S: AsRef<str>>(layer_names: &[S]) -> Self {
        let base_layers = layer_names
            .iter()
            .enumerate()
            .map(|(i, name)| BaseLayer {
                name: name.as_ref().to_string(),
                visible: i == 0,
            })
            .collect();
        Self {
            view: View::default(),
            base_layers,
            overlays: Overlays::default(),
        }
    }

    pub fn with_overlays(mut self, overlays: Overlays) -> Self {
        self.overlays = overlays;
        self
    }

    pub fn apply_viewport(&mut self, viewport: &ViewportDescriptor) {
        self.view = View::from_viewport(viewport);
    }

    /// Centers the current view explicitly, dropping any fit extent.
    pub fn apply_home(&mut self, home: HomeView) {
        self.view = View {
            projection: self.view.projection.clone(),
            center: Some(home.center),
            zoom: Some(home.zoom),
            fit_extent: None,
        };
    }

    /// Flips layer `index` and hides every other base layer.
    pub fn toggle_base_layer(&mut self, index: usize) -> Result<()> {
        if index >= self.base_layers.len() {
            return Err(ResolverError::ValidationError {
                message: format!(
                    "base layer {} does not exist ({} layers)",
                    index + 1,
                    self.base_layers.len()
                ),
            });
        }
        for (i, layer) in self.base_layers.iter_mut().enumerate() {
            layer.visible = if i == index { !layer.visible } else { false };
        }
        tracing::debug!("Base layer {} toggled", self.base_layers[index].name);
        Ok(())
    }

    pub fn visible_base_layer(&self) -> Option<&BaseLayer> {
        self.base_layers.iter().find(|layer| layer.visible)
    }

    pub fn layer_switcher_labels(&self) -> Vec<String> {
        self.base_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let mark = if layer.visible { '✓' } else { '_' };
                format!("[{}] Layer {}", mark, i + 1)
            })
            .collect()
    }

    pub fn set_graticule(&mut self, visible: bool) {
        self.overlays.graticule = visible;
    }

    pub fn set_graticule_outline(&mut self, visible: bool) {
        self.overlays.graticule_outline = visible;
    }

    pub fn set_render_edges(&mut self, enabled: bool) {
        self.overlays.render_reprojection_edges = enabled;
    }

    /// True while the view sits at the fallback origin, whichever projection it uses.
    pub fn is_fallback_view(&self) -> bool {
        self.view.fit_extent.is_none()
            && self.view.center == Some(FALLBACK_CENTER)
            && self.view.zoom == Some(FALLBACK_ZOOM)
    }
}

impl Default for MapState {
    fn default() -> Self {
        MapState::new(&BASE_LAYERS)
    }
}
