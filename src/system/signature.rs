use std::fmt;

use crate::component::{ComponentId, TypeSet};

/// The ordered component list a system declares.
///
/// The declared order is the column order the system's callback sees
/// through [`View`](crate::View); the sorted projection
/// ([`Signature::as_type_set`]) names the archetype the system binds to.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    components: Vec<ComponentId>,
}

impl Signature {
    /// Builds a signature from components in the caller's chosen order.
    pub fn new(components: impl IntoIterator<Item = ComponentId>) -> Self {
        let components = components.into_iter().collect();

        Self { components }
    }

    /// The number of declared components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no components are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The components in declared order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// The sorted, deduplicated set projection of this signature.
    pub fn as_type_set(&self) -> TypeSet {
        let mut type_set = TypeSet::with_capacity(self.len());

        for &component in &self.components {
            type_set.insert(component);
        }

        type_set
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.components.iter().map(|c| c.id()))
            .finish()
    }
}

impl From<Vec<ComponentId>> for Signature {
    fn from(components: Vec<ComponentId>) -> Self {
        Self { components }
    }
}
