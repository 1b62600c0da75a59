pub mod extent;
pub mod hint;
pub mod map_state;
pub mod resolver;
pub mod session;

pub use crate::domain::model::{
    Extent, RawRegistryRecord, RegistryResult, Resolution, ResolvedProjection, SearchState,
    ViewportDescriptor,
};
pub use crate::domain::ports::{ConfigProvider, RegistryLookup};
pub use crate::utils::error::Result;
