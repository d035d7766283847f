//! The registry: root object owning all state for one world.

use std::fmt;
use std::mem;

use thiserror::Error;

use crate::archetype::{ArchetypeId, Archetypes};
use crate::component::{ComponentId, ComponentNotFound, TypeSet};
use crate::entity::{Entity, Record};
use crate::storage::DenseMap;
use crate::system::{Signature, System, SystemId, View};

const ENTITY_INDEX_CAPACITY: usize = 16;
const COMPONENT_INDEX_CAPACITY: usize = 8;
const SYSTEM_INDEX_CAPACITY: usize = 4;
const TYPE_INDEX_CAPACITY: usize = 8;

/// The root object of an ECS world.
///
/// Owns every archetype, the indices over entities, components, systems,
/// and types, and the monotonic id counter shared by all three id kinds.
/// Dropping the registry tears everything down.
///
/// Structural operations ([`Registry::attach`]) take effect immediately;
/// there are no deferred command buffers. All operations are
/// single-threaded.
pub struct Registry {
    entity_index: DenseMap<Entity, Record>,
    component_index: DenseMap<ComponentId, usize>,
    system_index: DenseMap<SystemId, System>,
    type_index: DenseMap<TypeSet, ArchetypeId>,
    archetypes: Archetypes,
    root: ArchetypeId,
    next_id: u64,
}

impl Registry {
    /// Creates an empty registry with its root archetype (the empty type).
    pub fn new() -> Self {
        let entity_index = DenseMap::with_capacity(ENTITY_INDEX_CAPACITY);
        let component_index =
            DenseMap::with_capacity(COMPONENT_INDEX_CAPACITY);
        let system_index = DenseMap::with_capacity(SYSTEM_INDEX_CAPACITY);
        let mut type_index = DenseMap::with_capacity(TYPE_INDEX_CAPACITY);
        let mut archetypes = Archetypes::new();
        let root =
            archetypes.create(TypeSet::new(), &component_index, &mut type_index);

        Self {
            entity_index,
            component_index,
            system_index,
            type_index,
            archetypes,
            root,
            // id 0 is reserved and never issued
            next_id: 1,
        }
    }

    /// The number of live entities.
    pub fn len(&self) -> usize {
        self.entity_index.len()
    }

    /// Returns `true` if no entities have been created.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the id names a live entity.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_index.contains(&entity)
    }

    /// The number of archetypes, root included.
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// The archetypes of this registry, for inspection.
    pub fn archetypes(&self) -> &Archetypes {
        &self.archetypes
    }

    pub(crate) fn record(&self, entity: Entity) -> Option<Record> {
        self.entity_index.get(&entity).copied()
    }

    /// Creates a new entity in the root archetype.
    pub fn entity(&mut self) -> Entity {
        let entity = Entity(self.alloc_id());
        let row = self.archetypes.push_entity(self.root, entity);

        self.entity_index.set(entity, Record { archetype: self.root, row });

        entity
    }

    /// Registers a component kind of `size` bytes, returning its id.
    ///
    /// A component is an entity: the id comes from the same counter as
    /// [`Registry::entity`], but no row is allocated for it.
    pub fn component(&mut self, size: usize) -> ComponentId {
        let component = ComponentId(self.alloc_id());

        log::debug!("registered component {:?} ({} bytes)", component, size);

        self.component_index.set(component, size);

        component
    }

    /// Registers a system over `signature`, returning its id.
    ///
    /// The system binds to the archetype whose type is the signature's
    /// sorted set projection, creating it (and the path of archetypes
    /// leading to it) if it has never been seen.
    pub fn system(
        &mut self,
        signature: impl Into<Signature>,
        run: impl FnMut(&mut View<'_>, usize) + 'static,
    ) -> Result<SystemId, ComponentNotFound> {
        let signature = signature.into();

        for &component in signature.components() {
            if !self.component_index.contains(&component) {
                return Err(ComponentNotFound(component));
            }
        }

        let type_set = signature.as_type_set();
        let archetype = match self.type_index.get(&type_set) {
            Some(&archetype) => archetype,
            None => self.archetypes.traverse_and_create(
                self.root,
                &type_set,
                &self.component_index,
                &mut self.type_index,
            ),
        };

        let system = SystemId(self.alloc_id());

        log::debug!(
            "registered system {:?} for {:?} on archetype {:?}",
            system,
            signature,
            archetype,
        );

        self.system_index
            .set(system, System { archetype, signature, run: Box::new(run) });

        Ok(system)
    }

    /// Attaches a component to an entity, moving it one archetype to the
    /// right and creating that archetype if it does not exist yet.
    ///
    /// The new component's payload is zeroed until written by
    /// [`Registry::set`]. Attaching a component the entity already holds
    /// is rejected.
    pub fn attach(
        &mut self,
        entity: Entity,
        component: ComponentId,
    ) -> Result<(), AttachError> {
        if !self.component_index.contains(&component) {
            return Err(AttachError::ComponentNotFound(component));
        }

        let record = self
            .record(entity)
            .ok_or(AttachError::EntityNotFound(entity))?;
        let source = self.archetypes.get(record.archetype);

        if source.type_set().contains(component) {
            return Err(AttachError::AlreadyAttached { entity, component });
        }

        let target_type = source.type_set().clone().with(component);
        let target = match self.type_index.get(&target_type) {
            Some(&target) => target,
            None => self.archetypes.insert_vertex(
                self.root,
                record.archetype,
                target_type,
                component,
                &self.component_index,
                &mut self.type_index,
            ),
        };

        self.archetypes.move_entity_right(
            record.archetype,
            target,
            record.row,
            &mut self.entity_index,
        );

        Ok(())
    }

    /// Overwrites an entity's payload for a component it holds.
    pub fn set(
        &mut self,
        entity: Entity,
        component: ComponentId,
        data: &[u8],
    ) -> Result<(), AccessError> {
        let size = *self
            .component_index
            .get(&component)
            .ok_or(AccessError::ComponentNotFound(component))?;

        if data.len() != size {
            return Err(AccessError::SizeMismatch {
                component,
                expected: size,
                found: data.len(),
            });
        }

        let record = self
            .record(entity)
            .ok_or(AccessError::EntityNotFound(entity))?;
        let archetype = self.archetypes.get_mut(record.archetype);
        let column = archetype
            .type_set()
            .index_of(component)
            .ok_or(AccessError::MissingComponent { entity, component })?;

        archetype.write(record.row, column, data);

        Ok(())
    }

    /// Reads an entity's payload for a component it holds.
    pub fn get(
        &self,
        entity: Entity,
        component: ComponentId,
    ) -> Result<&[u8], AccessError> {
        if !self.component_index.contains(&component) {
            return Err(AccessError::ComponentNotFound(component));
        }

        let record = self
            .record(entity)
            .ok_or(AccessError::EntityNotFound(entity))?;
        let archetype = self.archetypes.get(record.archetype);
        let column = archetype
            .type_set()
            .index_of(component)
            .ok_or(AccessError::MissingComponent { entity, component })?;

        Ok(archetype.bytes(record.row, column))
    }

    /// Runs every registered system, in registration order.
    ///
    /// Each system visits its own archetype and every right-edge
    /// descendant depth-first (insertion order within each edge list),
    /// once per archetype, invoking the callback once per row in
    /// ascending row order. Archetypes created by `attach`es since the
    /// last step are reached automatically through the edges installed at
    /// their creation.
    pub fn step(&mut self) {
        let archetype_count = self.archetypes.len();

        for system in self.system_index.values_mut() {
            Self::dispatch(&mut self.archetypes, system, archetype_count);
        }
    }

    fn dispatch(
        archetypes: &mut Archetypes,
        system: &mut System,
        archetype_count: usize,
    ) {
        let mut columns = vec![0; system.signature.len()];
        let mut visited = vec![false; archetype_count];
        let mut stack = vec![system.archetype];

        while let Some(id) = stack.pop() {
            if mem::replace(&mut visited[id.index()], true) {
                continue;
            }

            let archetype = archetypes.get_mut(id);

            // every visited archetype is a superset of the signature, so
            // each declared component resolves to a column
            for (k, &component) in
                system.signature.components().iter().enumerate()
            {
                columns[k] = archetype
                    .type_set()
                    .index_of(component)
                    .expect("descendant archetype lacks a signature component");
            }

            let rows = archetype.len();
            let mut view = View::new(archetype.columns_mut(), &columns);

            for row in 0..rows {
                (system.run)(&mut view, row);
            }

            // reversed so the first-inserted edge is explored first
            for edge in archetype.right_edges().iter().rev() {
                stack.push(edge.archetype);
            }
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;

        self.next_id += 1;

        id
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entity_index.len())
            .field("components", &self.component_index.len())
            .field("systems", &self.system_index.len())
            .field("archetypes", &self.archetypes)
            .finish_non_exhaustive()
    }
}

/// Error when attaching a component to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("cannot attach to unknown entity {0:?}")]
    EntityNotFound(Entity),
    #[error("cannot attach unregistered component {0:?}")]
    ComponentNotFound(ComponentId),
    #[error("component {component:?} is already attached to entity {entity:?}")]
    AlreadyAttached { entity: Entity, component: ComponentId },
}

/// Error when reading or writing an entity's component payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("unknown entity {0:?}")]
    EntityNotFound(Entity),
    #[error("unregistered component {0:?}")]
    ComponentNotFound(ComponentId),
    #[error("entity {entity:?} does not hold component {component:?}")]
    MissingComponent { entity: Entity, component: ComponentId },
    #[error(
        "component {component:?} payload is {expected} bytes, got {found}"
    )]
    SizeMismatch { component: ComponentId, expected: usize, found: usize },
}
