pub mod config;
pub mod error;
pub mod types;

pub use config::{CircuitConfig, DelayConfig, GainSet, InterneuronConfig};
pub use error::{ReflexError, Result};
pub use types::{rectify, ComponentKind, Handle, Time, ALL_SENSORS};
