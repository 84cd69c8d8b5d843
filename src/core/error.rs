use crate::core::types::ComponentKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReflexError {
    #[error("{0} has no name")]
    EmptyName(ComponentKind),

    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: ComponentKind, name: String },

    #[error("Circuit '{circuit}': socket '{socket}' is not connected")]
    UnconnectedSocket {
        circuit: String,
        socket: &'static str,
    },

    #[error("Delay time must be at least machine epsilon, got {0}")]
    NonPositiveDelay(f64),

    #[error("Interneuron has {found} weights but {expected} afferent signals are connected")]
    WeightCountMismatch { expected: usize, found: usize },

    #[error("Muscle '{muscle}' has degenerate {parameter} ({value})")]
    DegenerateMuscle {
        muscle: String,
        parameter: &'static str,
        value: f64,
    },

    #[error("Circuit '{circuit}': inconsistent wiring: {reason}")]
    InconsistentWiring { circuit: String, reason: String },

    #[error("{kind} handle #{index} does not belong to this model")]
    UnknownHandle { kind: ComponentKind, index: usize },

    #[error("Circuit '{0}' has not been connected to a model")]
    NotConnected(String),

    #[error("Circuit '{0}' cannot be reconfigured while a run is in progress")]
    ReconfigureDuringRun(String),

    #[error("Circuit '{circuit}' is in {mode} mode; {operation} is not available")]
    ModeMismatch {
        circuit: String,
        mode: &'static str,
        operation: &'static str,
    },

    #[error("Controls vector has {found} entries but the model has {expected} actuators")]
    ControlsTooShort { expected: usize, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ReflexError>;
