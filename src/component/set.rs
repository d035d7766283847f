use std::fmt;

use super::ComponentId;
use crate::storage::MapKey;

/// A sorted set of component ids.
///
/// Elements are kept strictly ascending with no duplicates; equality is
/// structural. Two entities with an equal `TypeSet` share an archetype,
/// and the registry's type index canonicalizes archetypes by this set.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct TypeSet {
    elements: Vec<ComponentId>,
}

impl TypeSet {
    /// Returns an empty set.
    pub const fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Returns an empty set with room for `capacity` ids.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { elements: Vec::with_capacity(capacity) }
    }

    /// The number of ids in this set.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if this set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids in ascending order.
    pub fn elements(&self) -> &[ComponentId] {
        &self.elements
    }

    /// Returns `true` if this set contains the id.
    pub fn contains(&self, component: ComponentId) -> bool {
        self.elements.binary_search(&component).is_ok()
    }

    /// The position of an id within the sorted elements.
    pub fn index_of(&self, component: ComponentId) -> Option<usize> {
        self.elements.binary_search(&component).ok()
    }

    /// Inserts an id, preserving order. Inserting a present id is a no-op.
    pub fn insert(&mut self, component: ComponentId) {
        if let Err(i) = self.elements.binary_search(&component) {
            self.elements.insert(i, component);
        }
    }

    /// Inserts an id and returns `self`.
    pub fn with(mut self, component: ComponentId) -> Self {
        self.insert(component);

        self
    }

    /// Removes an id, preserving order. Removing an absent id is a no-op.
    pub fn remove(&mut self, component: ComponentId) {
        if let Ok(i) = self.elements.binary_search(&component) {
            self.elements.remove(i);
        }
    }

    /// Returns `true` if every id of `sub` is in this set.
    pub fn is_superset(&self, sub: &TypeSet) -> bool {
        if self.len() < sub.len() {
            return false;
        }

        // both sorted: one linear merge
        let mut left = 0;
        let mut right = 0;

        while left < self.len() && right < sub.len() {
            if self.elements[left] < sub.elements[right] {
                left += 1;
            } else if self.elements[left] == sub.elements[right] {
                left += 1;
                right += 1;
            } else {
                return false;
            }
        }

        right == sub.len()
    }

    /// The first id of this set that is absent from `other`.
    pub fn difference_one(&self, other: &TypeSet) -> Option<ComponentId> {
        self.elements
            .iter()
            .copied()
            .find(|&component| !other.contains(component))
    }
}

impl MapKey for TypeSet {
    fn map_hash(&self) -> u32 {
        // DJB2 folded over the sorted elements, so equal sets hash equally
        self.elements.iter().fold(5381u32, |hash, component| {
            (hash << 5).wrapping_add(hash).wrapping_add(component.id() as u32)
        })
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.elements.iter().map(|c| c.id())).finish()
    }
}

impl FromIterator<ComponentId> for TypeSet {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        let mut out = Self::new();

        for component in iter {
            out.insert(component);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: impl IntoIterator<Item = u64>) -> TypeSet {
        ids.into_iter().map(ComponentId).collect()
    }

    #[test]
    fn insert_keeps_elements_sorted() {
        let mut type_set = TypeSet::new();

        for id in [5, 1, 9, 3, 7] {
            type_set.insert(ComponentId(id));
        }

        let ids: Vec<_> =
            type_set.elements().iter().map(|c| c.id()).collect();

        assert_eq!(ids, [1, 3, 5, 7, 9]);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut type_set = set([1, 2, 3]);

        type_set.insert(ComponentId(2));

        assert_eq!(type_set, set([1, 2, 3]));
    }

    #[test]
    fn insert_then_index_of() {
        let mut type_set = TypeSet::new();

        assert_eq!(type_set.index_of(ComponentId(4)), None);

        type_set.insert(ComponentId(4));

        assert_eq!(type_set.index_of(ComponentId(4)), Some(0));

        type_set.insert(ComponentId(2));

        assert_eq!(type_set.index_of(ComponentId(4)), Some(1));
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut type_set = set([1, 3]);

        type_set.remove(ComponentId(2));

        assert_eq!(type_set, set([1, 3]));

        type_set.remove(ComponentId(3));

        assert_eq!(type_set, set([1]));
        assert_eq!(type_set.index_of(ComponentId(3)), None);
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(set([1, 2, 3]), set([3, 2, 1]));
        assert_ne!(set([1, 2]), set([1, 2, 3]));
        assert_ne!(set([1, 2]), set([1, 3]));
    }

    #[test]
    fn superset() {
        let a = set([1, 2, 3, 5]);

        assert!(a.is_superset(&set([])));
        assert!(a.is_superset(&set([1])));
        assert!(a.is_superset(&set([2, 5])));
        assert!(a.is_superset(&a.clone()));

        assert!(!a.is_superset(&set([4])));
        assert!(!a.is_superset(&set([1, 2, 3, 4, 5])));
        assert!(!set([]).is_superset(&a));
    }

    #[test]
    fn difference_one() {
        let a = set([1, 2, 3]);

        assert_eq!(a.difference_one(&set([1, 3])), Some(ComponentId(2)));
        assert_eq!(a.difference_one(&set([2, 3])), Some(ComponentId(1)));
        assert_eq!(a.difference_one(&set([1, 2])), Some(ComponentId(3)));
        assert_eq!(a.difference_one(&a.clone()), None);
    }

    #[test]
    fn equal_sets_hash_equally() {
        assert_eq!(set([1, 2, 3]).map_hash(), set([3, 1, 2]).map_hash());
        assert_ne!(set([1, 2]).map_hash(), set([1, 3]).map_hash());
    }
}
