// Adapters layer: concrete implementations for external systems (registry http, projections).

pub mod http;
pub mod proj;
