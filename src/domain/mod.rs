// Domain layer: schedule models and the ports the pipelines are written against.

pub mod model;
pub mod ports;
