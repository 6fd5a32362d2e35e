// Domain layer: core models, payload parsing and ports (interfaces).

pub mod model;
pub mod ports;
pub mod property;
