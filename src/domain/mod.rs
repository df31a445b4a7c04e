// Domain layer: records exchanged with the rental service and the ports the client depends on.

pub mod model;
pub mod ports;
