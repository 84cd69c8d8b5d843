//! Connect-time binding of declared sensor names to model handles

use crate::core::types::{Handle, ALL_SENSORS};
use crate::model::{Model, Registered};

/// Outcome of resolving one declared name list
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    /// Bound sensors in declared order (or model order for `ALL`)
    pub resolved: Vec<Handle<T>>,
    /// Declared names with no matching instance
    pub missing: Vec<String>,
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            missing: Vec::new(),
        }
    }
}

impl<T> Resolution<T> {
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// True when a declared list means "every instance of this kind"
pub fn selects_all(declared: &[String]) -> bool {
    declared
        .first()
        .is_some_and(|first| first.eq_ignore_ascii_case(ALL_SENSORS))
}

/// Bind `declared` against every instance of `C` in the model.
///
/// - empty list: nothing bound, feature disabled
/// - first entry `ALL` (any case): every instance in model order, rest ignored
/// - otherwise exact-name lookup per entry; misses are logged and skipped
///
/// A name declared twice is bound once.
pub fn resolve_sensors<C: Registered>(
    circuit: &str,
    declared: &[String],
    model: &Model,
) -> Resolution<C> {
    let mut resolution = Resolution::default();
    if declared.is_empty() {
        return resolution;
    }

    if selects_all(declared) {
        resolution.resolved = model.all::<C>().map(|(handle, _)| handle).collect();
        return resolution;
    }

    for name in declared {
        match model.find::<C>(name) {
            Some(handle) if resolution.resolved.contains(&handle) => {
                tracing::debug!("{}: {} {:?} declared twice", circuit, C::KIND, name);
            }
            Some(handle) => resolution.resolved.push(handle),
            None => {
                tracing::warn!(
                    "{}: {} {:?} was not found and will be ignored",
                    circuit,
                    C::KIND,
                    name
                );
                resolution.missing.push(name.clone());
            }
        }
    }

    resolution
}
