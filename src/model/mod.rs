//! Model registry - the externally owned component graph the reflex path reads
//!
//! Components live in typed arenas and are referenced by [`Handle`]s. Name
//! lookup happens only while circuits connect; evaluation works on handles.

pub mod muscle;
pub mod sensor;
pub mod state;

pub use muscle::{Muscle, MuscleId};
pub use sensor::{GolgiId, GolgiTendon, Sensor, Spindle, SpindleId};
pub use state::{MuscleKinematics, SimContext, SimState};

use crate::core::error::{ReflexError, Result};
use crate::core::types::{ComponentKind, Handle};
use ahash::AHashMap;

/// A named component stored in the model
pub trait Component: Sized {
    const KIND: ComponentKind;

    fn name(&self) -> &str;
}

/// Components with an arena in [`Model`]
pub trait Registered: Component {
    fn arena(model: &Model) -> &Arena<Self>;
}

/// Insertion-ordered storage with a by-name index
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
    by_name: AHashMap<String, Handle<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_name: AHashMap::new(),
        }
    }
}

impl<T: Component> Arena<T> {
    fn insert(&mut self, item: T) -> Result<Handle<T>> {
        if item.name().is_empty() {
            return Err(ReflexError::EmptyName(T::KIND));
        }
        if self.by_name.contains_key(item.name()) {
            return Err(ReflexError::DuplicateName {
                kind: T::KIND,
                name: item.name().to_string(),
            });
        }

        let handle = Handle::new(self.items.len());
        self.by_name.insert(item.name().to_string(), handle);
        self.items.push(item);
        Ok(handle)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    /// Exact-name lookup
    pub fn find(&self, name: &str) -> Option<Handle<T>> {
        self.by_name.get(name).copied()
    }

    /// All components in enumeration (insertion) order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Handle::new(i), item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Component for Muscle {
    const KIND: ComponentKind = ComponentKind::Muscle;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Registered for Muscle {
    fn arena(model: &Model) -> &Arena<Self> {
        &model.muscles
    }
}

impl Registered for Spindle {
    fn arena(model: &Model) -> &Arena<Self> {
        &model.spindles
    }
}

impl Registered for GolgiTendon {
    fn arena(model: &Model) -> &Arena<Self> {
        &model.golgis
    }
}

/// The assembled model: muscles and the proprioceptors attached to them
#[derive(Debug, Clone, Default)]
pub struct Model {
    muscles: Arena<Muscle>,
    spindles: Arena<Spindle>,
    golgis: Arena<GolgiTendon>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a muscle. Its arena index is its slot in the controls vector.
    pub fn add_muscle(&mut self, muscle: Muscle) -> Result<MuscleId> {
        self.muscles.insert(muscle)
    }

    pub fn add_spindle(&mut self, name: impl Into<String>, muscle: MuscleId) -> Result<SpindleId> {
        self.require(muscle)?;
        self.spindles.insert(Spindle::new(name, muscle))
    }

    pub fn add_golgi(&mut self, name: impl Into<String>, muscle: MuscleId) -> Result<GolgiId> {
        self.require(muscle)?;
        self.golgis.insert(GolgiTendon::new(name, muscle))
    }

    pub fn arena<C: Registered>(&self) -> &Arena<C> {
        C::arena(self)
    }

    pub fn get<C: Registered>(&self, handle: Handle<C>) -> Option<&C> {
        C::arena(self).get(handle)
    }

    /// Like [`Model::get`], but a foreign handle is an error
    pub fn require<C: Registered>(&self, handle: Handle<C>) -> Result<&C> {
        self.get(handle).ok_or(ReflexError::UnknownHandle {
            kind: C::KIND,
            index: handle.index(),
        })
    }

    pub fn find<C: Registered>(&self, name: &str) -> Option<Handle<C>> {
        C::arena(self).find(name)
    }

    pub fn all<'a, C: Registered + 'a>(
        &'a self,
    ) -> impl Iterator<Item = (Handle<C>, &'a C)> + 'a {
        C::arena(self).iter()
    }

    /// Length of the controls vector this model expects
    pub fn actuator_count(&self) -> usize {
        self.muscles.len()
    }
}
