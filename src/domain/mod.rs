// Domain layer: order model, the sales query and the aggregator. No I/O here.

pub mod aggregator;
pub mod model;
pub mod ports;
pub mod query;
