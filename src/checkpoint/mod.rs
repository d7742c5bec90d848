pub mod state;
pub mod text;

pub use state::Checkpoint;
pub use text::{read_network, write_network};
