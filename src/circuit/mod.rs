//! Reflex signal path: sensor resolution, interneuron, delay line, circuit

pub mod delay;
pub mod interneuron;
pub mod reflex;
pub mod resolve;

pub use delay::{DelayLine, Rewrite, Sample};
pub use interneuron::Interneuron;
pub use reflex::{
    direct_excitation, CircuitMode, ConnectReport, ReflexCircuit, SensorPair, AFFERENT_COUNT,
};
pub use resolve::{resolve_sensors, selects_all, Resolution};
