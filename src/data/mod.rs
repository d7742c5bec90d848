pub mod dataset;
pub mod partition;

pub use dataset::{load_csv, parse_csv, Example};
pub use partition::Partition;
