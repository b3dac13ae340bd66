// Domain layer: data model and ports. No transport or config code here.

pub mod model;
pub mod ports;
