pub mod builder;
pub mod network;
pub mod neuron;
pub mod spec;

pub use builder::{Initializer, NetworkBuilder};
pub use network::{Layout, ParameterStore, Parameters};
pub use neuron::{Connection, Neuron, ThreadSlot};
pub use spec::NetworkSpec;
