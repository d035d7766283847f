//! Archetypes: tables of entities sharing one component set, arranged in
//! a graph whose edges add or remove a single component.

use std::fmt;

pub use self::edges::*;
use crate::component::{ComponentId, TypeSet};
use crate::entity::{Entity, Record};
use crate::storage::{Column, DenseMap};

mod edges;
mod graph;

/// Rows allocated for a fresh archetype.
const INITIAL_ROW_CAPACITY: usize = 16;

/// Stable index of an archetype within its [`Archetypes`] arena.
///
/// Edges and records store ids rather than references, which keeps the
/// graph free of self-referential ownership.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchetypeId(pub(crate) usize);

impl ArchetypeId {
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// A table storing every entity of one [`TypeSet`], column-major by
/// component, plus the vertex's edges in the archetype graph.
///
/// For every row `r`, `entities[r]` is an entity whose registry record
/// points back at `(this, r)`, and column `i` holds the payload for the
/// component `type_set.elements()[i]` at byte offset `size_i * r`. Columns
/// and the entity row vector move in lock-step.
pub struct Archetype {
    pub(crate) type_set: TypeSet,
    pub(crate) entities: Vec<Entity>,
    pub(crate) columns: Vec<Column>,
    pub(crate) left_edges: EdgeList,
    pub(crate) right_edges: EdgeList,
}

impl Archetype {
    /// Builds an empty table for `type_set`, sizing one column per element
    /// from the registered component sizes.
    ///
    /// # Panics
    ///
    /// Panics if an element of `type_set` has no registered size.
    fn new(
        type_set: TypeSet,
        component_index: &DenseMap<ComponentId, usize>,
    ) -> Self {
        let columns = type_set
            .elements()
            .iter()
            .map(|component| {
                let size =
                    *component_index.get(component).unwrap_or_else(|| {
                        panic!("no registered size for component {component:?}")
                    });

                Column::with_capacity(size, INITIAL_ROW_CAPACITY)
            })
            .collect();
        let entities = Vec::with_capacity(INITIAL_ROW_CAPACITY);

        Self {
            type_set,
            entities,
            columns,
            left_edges: EdgeList::new(),
            right_edges: EdgeList::new(),
        }
    }

    /// The component set of this archetype.
    pub fn type_set(&self) -> &TypeSet {
        &self.type_set
    }

    /// The number of entity rows.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the archetype holds no entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entity stored at a row.
    pub fn entity_at(&self, row: usize) -> Entity {
        self.entities[row]
    }

    /// The "add one component" edges.
    pub fn right_edges(&self) -> &EdgeList {
        &self.right_edges
    }

    /// The "remove one component" edges.
    pub fn left_edges(&self) -> &EdgeList {
        &self.left_edges
    }

    /// The payload bytes of `row` in column `column`.
    pub fn bytes(&self, row: usize, column: usize) -> &[u8] {
        self.columns[column].row(row)
    }

    /// Overwrites the payload of `row` in column `column`.
    pub(crate) fn write(&mut self, row: usize, column: usize, bytes: &[u8]) {
        self.columns[column].write(row, bytes);
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Appends an entity, growing every column by one zeroed row.
    ///
    /// The caller is responsible for the entity's record and for
    /// populating the new row's payloads.
    fn push(&mut self, entity: Entity) -> usize {
        let row = self.entities.len();

        self.entities.push(entity);

        for column in &mut self.columns {
            column.push_row();
        }

        row
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("type", &self.type_set)
            .field("entities", &self.entities)
            .field("left_edges", &self.left_edges)
            .field("right_edges", &self.right_edges)
            .finish_non_exhaustive()
    }
}

/// The arena owning every archetype of a registry.
///
/// Archetypes are created on demand, addressed by stable [`ArchetypeId`],
/// and never destroyed before the registry itself.
#[derive(Debug, Default)]
pub struct Archetypes {
    inner: Vec<Archetype>,
}

impl Archetypes {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// The number of archetypes in the arena.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ArchetypeId) -> &Archetype {
        &self.inner[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: ArchetypeId) -> &mut Archetype {
        &mut self.inner[id.index()]
    }

    /// Iterates the archetypes with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ArchetypeId, &Archetype)> {
        self.inner
            .iter()
            .enumerate()
            .map(|(index, archetype)| (ArchetypeId(index), archetype))
    }

    /// Creates the archetype for `type_set` and installs it in the type
    /// index.
    ///
    /// # Panics
    ///
    /// Panics if an archetype for this exact type already exists; the type
    /// index canonicalizes archetypes.
    pub(crate) fn create(
        &mut self,
        type_set: TypeSet,
        component_index: &DenseMap<ComponentId, usize>,
        type_index: &mut DenseMap<TypeSet, ArchetypeId>,
    ) -> ArchetypeId {
        assert!(
            type_index.get(&type_set).is_none(),
            "archetype already exists for type {type_set:?}",
        );

        let id = ArchetypeId(self.inner.len());

        log::debug!("creating archetype {:?} for type {:?}", id, type_set);

        type_index.set(type_set.clone(), id);
        self.inner.push(Archetype::new(type_set, component_index));

        id
    }

    /// Appends an entity row to an archetype.
    pub(crate) fn push_entity(
        &mut self,
        id: ArchetypeId,
        entity: Entity,
    ) -> usize {
        self.get_mut(id).push(entity)
    }

    /// Relocates the entity at `left_row` from `left` to `right`, where
    /// `right`'s type holds exactly one extra component.
    ///
    /// Payloads for every component of `left` are copied across; the
    /// vacated row is back-filled by the tail in both the entity vector
    /// and every column. The new component's column is left zeroed at the
    /// destination row, to be written by a subsequent `set`.
    ///
    /// Both affected records are updated: the moved entity's, and the
    /// tail-swap victim's whenever the vacated row was not the tail.
    ///
    /// Returns the entity's row in `right`.
    pub(crate) fn move_entity_right(
        &mut self,
        left_id: ArchetypeId,
        right_id: ArchetypeId,
        left_row: usize,
        entity_index: &mut DenseMap<Entity, Record>,
    ) -> usize {
        let (left, right) = self.pair_mut(left_id, right_id);

        assert!(left_row < left.entities.len(), "entity row out of bounds");

        let entity = left.entities[left_row];
        let right_row = right.push(entity);

        log::debug!(
            "moving entity {:?} from {:?} row {} to {:?} row {}",
            entity,
            left_id,
            left_row,
            right_id,
            right_row,
        );

        // walk both sorted types in lock-step; every left column has
        // exactly one matching right column
        let mut j = 0;

        for (i, &component) in left.type_set.elements().iter().enumerate() {
            while right.type_set.elements()[j] != component {
                j += 1;

                assert!(
                    j < right.type_set.len(),
                    "types mismatched while moving an entity",
                );
            }

            right.columns[j].copy_row_from(&left.columns[i], left_row, right_row);
            left.columns[i].swap_remove_row(left_row);
        }

        left.entities.swap_remove(left_row);

        entity_index
            .set(entity, Record { archetype: right_id, row: right_row });

        // the tail swap moved another entity into the vacated row
        if let Some(&victim) = left.entities.get(left_row) {
            entity_index
                .set(victim, Record { archetype: left_id, row: left_row });
        }

        right_row
    }

    /// Mutably borrows two distinct archetypes at once.
    fn pair_mut(
        &mut self,
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> (&mut Archetype, &mut Archetype) {
        assert_ne!(a, b, "cannot move an entity within one archetype");

        if a.index() < b.index() {
            let (head, tail) = self.inner.split_at_mut(b.index());

            (&mut head[a.index()], &mut tail[0])
        } else {
            let (head, tail) = self.inner.split_at_mut(a.index());

            (&mut tail[0], &mut head[b.index()])
        }
    }
}
