mod flow;
mod metrics;
mod topology;

pub use flow::*;
pub use metrics::*;
pub use topology::*;
