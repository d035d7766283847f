//! Graph operations over the archetype arena: vertex insertion with edge
//! completion, and the traversal that reaches or creates the archetype
//! for a full component set.

use super::{ArchetypeId, Archetypes};
use crate::component::{ComponentId, TypeSet};
use crate::storage::DenseMap;

impl Archetypes {
    /// Links `left` and `right` by a `component`-labeled edge pair:
    /// `left.type ∪ {component} == right.type`.
    pub(crate) fn make_edges(
        &mut self,
        left: ArchetypeId,
        right: ArchetypeId,
        component: ComponentId,
    ) {
        self.get_mut(left).right_edges.add(component, right);
        self.get_mut(right).left_edges.add(component, left);
    }

    /// Creates the archetype for `new_type` and wires it into the graph.
    ///
    /// `left_neighbor` must be one component short of `new_type`;
    /// `component_for_edge` is the id it lacks. After the direct link, the
    /// graph is walked from `root` so every other archetype one component
    /// short of `new_type` gains its edge as well.
    pub(crate) fn insert_vertex(
        &mut self,
        root: ArchetypeId,
        left_neighbor: ArchetypeId,
        new_type: TypeSet,
        component_for_edge: ComponentId,
        component_index: &DenseMap<ComponentId, usize>,
        type_index: &mut DenseMap<TypeSet, ArchetypeId>,
    ) -> ArchetypeId {
        let vertex = self.create(new_type, component_index, type_index);

        log::debug!(
            "inserted vertex {:?} right of {:?} via component {:?}",
            vertex,
            left_neighbor,
            component_for_edge,
        );

        self.make_edges(left_neighbor, vertex, component_for_edge);
        self.connect_one_short(root, vertex);

        vertex
    }

    /// Descends right edges from `node`, linking every archetype whose
    /// type is one component short of `vertex`'s and a subset of it.
    fn connect_one_short(&mut self, node: ArchetypeId, vertex: ArchetypeId) {
        let node_len = self.get(node).type_set.len();
        let vertex_len = self.get(vertex).type_set.len();

        if node_len + 1 > vertex_len {
            return;
        }

        if node_len + 1 < vertex_len {
            let next: Vec<ArchetypeId> = self
                .get(node)
                .right_edges
                .iter()
                .map(|edge| edge.archetype)
                .collect();

            for neighbor in next {
                self.connect_one_short(neighbor, vertex);
            }

            return;
        }

        let node_type = &self.get(node).type_set;
        let vertex_type = &self.get(vertex).type_set;

        // wrong branch of the lattice
        if !vertex_type.is_superset(node_type) {
            return;
        }

        let Some(component) = vertex_type.difference_one(node_type) else {
            return;
        };

        // the direct neighbor is already linked, and diamond descents can
        // reach the same node twice
        if self.get(node).right_edges.find(component).is_some() {
            return;
        }

        self.make_edges(node, vertex, component);
    }

    /// Reaches the archetype for `target`, creating the missing stretch of
    /// the graph one component per hop.
    ///
    /// From each vertex, an existing right edge labeled with an id of
    /// `target` is followed when present; otherwise the first unconsumed
    /// id of `target` is materialized via [`Archetypes::insert_vertex`].
    ///
    /// # Panics
    ///
    /// Panics if the walk consumes every id of `target` without arriving
    /// at an archetype of exactly that type.
    pub(crate) fn traverse_and_create(
        &mut self,
        root: ArchetypeId,
        target: &TypeSet,
        component_index: &DenseMap<ComponentId, usize>,
        type_index: &mut DenseMap<TypeSet, ArchetypeId>,
    ) -> ArchetypeId {
        let mut consumed = TypeSet::with_capacity(target.len());
        let mut vertex = root;

        for _ in 0..target.len() {
            let existing = self
                .get(vertex)
                .right_edges
                .iter()
                .find(|edge| target.contains(edge.component))
                .map(|edge| (edge.component, edge.archetype));

            match existing {
                Some((component, next)) => {
                    consumed.insert(component);
                    vertex = next;
                }
                None => {
                    let component = target
                        .difference_one(&consumed)
                        .expect("traversal exhausted the target type");
                    let new_type = consumed.clone().with(component);

                    vertex = self.insert_vertex(
                        root,
                        vertex,
                        new_type,
                        component,
                        component_index,
                        type_index,
                    );
                    consumed.insert(component);
                }
            }
        }

        assert!(
            self.get(vertex).type_set == *target,
            "traversal ended at the wrong archetype",
        );

        vertex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;

    struct Graph {
        archetypes: Archetypes,
        components: DenseMap<ComponentId, usize>,
        type_index: DenseMap<TypeSet, ArchetypeId>,
        root: ArchetypeId,
    }

    fn graph(component_ids: &[u64]) -> Graph {
        let mut components = DenseMap::with_capacity(8);

        for &id in component_ids {
            components.set(ComponentId(id), 4);
        }

        let mut type_index = DenseMap::with_capacity(8);
        let mut archetypes = Archetypes::new();
        let root =
            archetypes.create(TypeSet::new(), &components, &mut type_index);

        Graph { archetypes, components, type_index, root }
    }

    fn assert_edge_invariants(archetypes: &Archetypes) {
        for (id, archetype) in archetypes.iter() {
            for edge in archetype.right_edges().iter() {
                let target: &Archetype = archetypes.get(edge.archetype);

                // right edge (A, c) -> B implies B.type == A.type ∪ {c}
                assert_eq!(
                    *target.type_set(),
                    archetype.type_set().clone().with(edge.component),
                );

                // and a matching left edge (B, c) -> A
                assert_eq!(
                    target.left_edges().find(edge.component),
                    Some(id),
                );
            }
        }
    }

    #[test]
    fn traverse_creates_the_full_path() {
        let mut g = graph(&[1, 2, 3]);
        let target: TypeSet =
            [ComponentId(1), ComponentId(2), ComponentId(3)]
                .into_iter()
                .collect();

        let vertex = g.archetypes.traverse_and_create(
            g.root,
            &target,
            &g.components,
            &mut g.type_index,
        );

        // {} -> {1} -> {1,2} -> {1,2,3}
        assert_eq!(g.archetypes.len(), 4);
        assert_eq!(*g.archetypes.get(vertex).type_set(), target);
        assert_edge_invariants(&g.archetypes);
    }

    #[test]
    fn traverse_is_idempotent() {
        let mut g = graph(&[1, 2]);
        let target: TypeSet =
            [ComponentId(1), ComponentId(2)].into_iter().collect();

        let first = g.archetypes.traverse_and_create(
            g.root,
            &target,
            &g.components,
            &mut g.type_index,
        );
        let second = g.archetypes.traverse_and_create(
            g.root,
            &target,
            &g.components,
            &mut g.type_index,
        );

        assert_eq!(first, second);
        assert_eq!(g.archetypes.len(), 3);
    }

    #[test]
    fn insert_vertex_completes_diamonds() {
        let mut g = graph(&[1, 2]);

        // build {1} and {2} as siblings of the root
        let one: TypeSet = [ComponentId(1)].into_iter().collect();
        let two: TypeSet = [ComponentId(2)].into_iter().collect();

        let one = g.archetypes.traverse_and_create(
            g.root,
            &one,
            &g.components,
            &mut g.type_index,
        );
        let two = g.archetypes.traverse_and_create(
            g.root,
            &two,
            &g.components,
            &mut g.type_index,
        );

        // creating {1,2} from {1} must also link it from {2}
        let both: TypeSet =
            [ComponentId(1), ComponentId(2)].into_iter().collect();
        let both = g.archetypes.insert_vertex(
            g.root,
            one,
            both,
            ComponentId(2),
            &g.components,
            &mut g.type_index,
        );

        assert_eq!(
            g.archetypes.get(one).right_edges().find(ComponentId(2)),
            Some(both),
        );
        assert_eq!(
            g.archetypes.get(two).right_edges().find(ComponentId(1)),
            Some(both),
        );
        assert_edge_invariants(&g.archetypes);
    }

    #[test]
    fn three_component_lattice_converges() {
        let mut g = graph(&[1, 2, 3]);

        let mut reach = |ids: &[u64]| {
            let target: TypeSet =
                ids.iter().map(|&id| ComponentId(id)).collect();

            g.archetypes.traverse_and_create(
                g.root,
                &target,
                &g.components,
                &mut g.type_index,
            )
        };

        // every singleton, then every pair, then the full set, exercising
        // edge completion across the whole lattice
        let singles = [reach(&[1]), reach(&[2]), reach(&[3])];

        reach(&[1, 2]);
        reach(&[1, 3]);
        reach(&[2, 3]);

        let full = reach(&[1, 2, 3]);

        // the 8 subsets of {1, 2, 3}, each created exactly once
        assert_eq!(g.archetypes.len(), 8);
        assert_edge_invariants(&g.archetypes);

        // every singleton reaches the full archetype in two right hops
        for single in singles {
            let reached = g
                .archetypes
                .get(single)
                .right_edges()
                .iter()
                .any(|edge| {
                    g.archetypes
                        .get(edge.archetype)
                        .right_edges()
                        .iter()
                        .any(|edge| edge.archetype == full)
                });

            assert!(reached);
        }
    }

    #[test]
    fn completion_does_not_duplicate_edges() {
        let mut g = graph(&[1, 2]);
        let both: TypeSet =
            [ComponentId(1), ComponentId(2)].into_iter().collect();

        g.archetypes.traverse_and_create(
            g.root,
            &both,
            &g.components,
            &mut g.type_index,
        );

        for (_, archetype) in g.archetypes.iter() {
            for edge in archetype.right_edges().iter() {
                let matching = archetype
                    .right_edges()
                    .iter()
                    .filter(|other| other.component == edge.component)
                    .count();

                assert_eq!(matching, 1);
            }
        }
    }
}
