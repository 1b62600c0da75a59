// Domain layer: registry/projection models and the ports the adapters implement.

pub mod model;
pub mod ports;
