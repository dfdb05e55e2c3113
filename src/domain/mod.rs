// Domain layer: data model and ports (interfaces). Concrete clients live in core, backends in adapters.

pub mod model;
pub mod ports;
