//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Simulation time in seconds (solver time, never wall-clock)
pub type Time = f64;

/// Declared-list token meaning "every sensor instance of this kind"
pub const ALL_SENSORS: &str = "ALL";

/// Typed index into one of the model's component arenas.
///
/// Handles are only produced by [`crate::model::Model`], never own the
/// component, and stay valid for the lifetime of the model that issued them.
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Position in the owning arena (model-enumeration order)
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = std::any::type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full);
        write!(f, "{}#{}", short, self.index)
    }
}

/// Kind of named component (the first three live in the model registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Muscle,
    Spindle,
    Golgi,
    Circuit,
}

impl ComponentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Muscle => "muscle",
            ComponentKind::Spindle => "spindle",
            ComponentKind::Golgi => "golgi tendon",
            ComponentKind::Circuit => "reflex circuit",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-wave rectifier `0.5 * (|x| + x)`.
///
/// Passes lengthening (positive) signals through unchanged and clamps
/// shortening to zero, so the reflex is strictly excitatory.
#[inline]
pub fn rectify(x: f64) -> f64 {
    0.5 * (x.abs() + x)
}
