//! Defines [`ComponentId`] and the sorted component set.

use thiserror::Error;

pub use self::set::*;
use crate::entity::Entity;
use crate::storage::MapKey;

mod set;

/// Id of a registered component kind.
///
/// A component is an entity: the id is drawn from the registry's single id
/// space and converts losslessly to and from [`Entity`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    /// The raw id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl From<ComponentId> for Entity {
    fn from(component: ComponentId) -> Self {
        Self(component.0)
    }
}

impl From<Entity> for ComponentId {
    fn from(entity: Entity) -> Self {
        Self(entity.0)
    }
}

impl MapKey for ComponentId {
    fn map_hash(&self) -> u32 {
        self.0.map_hash()
    }
}

/// Error when an operation names a component id that was never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("component {0:?} is not registered")]
pub struct ComponentNotFound(pub ComponentId);
