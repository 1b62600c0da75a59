pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, Settings};

pub use adapters::{http::EpsgIoRegistry, proj::ProjectionRegistry};
pub use core::{
    extent::{apply_transform, widen_antimeridian, world_extent, EXTENT_STOPS},
    hint::{extract_query_hint, page_query_hint, startup_hint},
    map_state::{HomeView, MapState, Overlays},
    resolver::{select_first_usable, Resolver},
    session::{SearchOutcome, SearchSession},
};
pub use domain::model::{
    Extent, RawRegistryRecord, RegistryResult, Resolution, ResolvedProjection, SearchState,
    ViewportDescriptor,
};
pub use utils::error::{ResolverError, Result};
