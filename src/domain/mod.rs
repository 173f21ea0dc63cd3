// Domain layer: transient request/response models and the ports the router talks to.

pub mod model;
pub mod ports;
