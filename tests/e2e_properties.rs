//! Property tests over randomly generated family graphs.
//!
//! Graphs are acyclic by construction: a child only gets parents with a
//! smaller id. Unions are sprinkled between arbitrary pairs.

use kinship::layout::compute_layout;
use kinship::storage::MemoryRepository;
use kinship::{
    Kinship, LayoutConfig, ParentalKind, PathKindFilter, PersonId, PersonNode, RelationshipEdge,
    RelationshipKind,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Family {
    size: u64,
    edges: Vec<RelationshipEdge>,
}

fn family() -> impl Strategy<Value = Family> {
    (3u64..24).prop_flat_map(|size| {
        let parents = proptest::collection::vec(
            (1..size, any::<prop::sample::Index>(), any::<prop::sample::Index>(), 0u8..4),
            0..(size as usize * 2),
        );
        let unions = proptest::collection::vec((0..size, 0..size), 0..(size as usize / 2 + 1));
        (Just(size), parents, unions).prop_map(|(size, parents, unions)| {
            let kinds = [
                ParentalKind::Biological,
                ParentalKind::Adoptive,
                ParentalKind::Step,
                ParentalKind::Foster,
            ];
            let mut edges = Vec::new();
            for (child, first, second, kind) in parents {
                let kind = kinds[kind as usize];
                edges.push(RelationshipEdge::parent_child(first.index(child as usize) as u64, child, kind));
                if second.index(3) == 0 {
                    edges.push(RelationshipEdge::parent_child(second.index(child as usize) as u64, child, kind));
                }
            }
            for (a, b) in unions {
                if a != b {
                    edges.push(RelationshipEdge::new(a, b, RelationshipKind::SpouseCurrent));
                }
            }
            Family { size, edges }
        })
    })
}

fn repository(family: &Family, reversed: bool) -> MemoryRepository {
    let repo = MemoryRepository::new();
    repo.add_people(0..family.size);
    let mut edges = family.edges.clone();
    if reversed {
        edges.reverse();
    }
    for edge in edges {
        repo.relate(edge);
    }
    repo
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

proptest! {
    #[test]
    fn prop_layout_rows_never_overlap(family in family()) {
        let config = LayoutConfig::default();
        let nodes: Vec<PersonNode> = (0..family.size).map(PersonNode::new).collect();
        let positions = compute_layout(&nodes, &family.edges, None, &config);

        prop_assert_eq!(positions.len(), nodes.len());
        for pair in positions.windows(2) {
            if pair[0].generation == pair[1].generation {
                prop_assert!(pair[1].x - pair[0].x >= config.node_spacing - 1e-9);
            }
        }
    }

    #[test]
    fn prop_parents_above_children(family in family()) {
        let nodes: Vec<PersonNode> = (0..family.size).map(PersonNode::new).collect();
        let positions = compute_layout(&nodes, &family.edges, None, &LayoutConfig::default());
        let generation = |id: PersonId| positions.iter().find(|p| p.person_id == id).map(|p| p.generation);

        for edge in family.edges.iter().filter(|e| e.kind.is_parental() && !e.is_self_loop()) {
            prop_assert!(generation(edge.person_b) > generation(edge.person_a));
        }
    }

    #[test]
    fn prop_layout_is_deterministic(family in family()) {
        let config = LayoutConfig::default();
        let nodes: Vec<PersonNode> = (0..family.size).map(PersonNode::new).collect();
        let mut shuffled = family.edges.clone();
        shuffled.reverse();
        prop_assert_eq!(
            compute_layout(&nodes, &family.edges, None, &config),
            compute_layout(&nodes, &shuffled, None, &config)
        );
    }

    #[test]
    fn prop_traversal_independent_of_storage_order(family in family(), focus in 0u64..24) {
        let focus = PersonId(focus % family.size);
        let forward = Kinship::in_memory(repository(&family, false));
        let backward = Kinship::in_memory(repository(&family, true));

        runtime().block_on(async {
            let a = forward.get_ancestors(focus, 6, PathKindFilter::All, None).await.unwrap();
            let b = backward.get_ancestors(focus, 6, PathKindFilter::All, None).await.unwrap();
            prop_assert_eq!(a.ids().collect::<Vec<_>>(), b.ids().collect::<Vec<_>>());
            prop_assert_eq!(&a, &b);

            let a = forward.get_lateral(focus, 3, None).await.unwrap();
            let b = backward.get_lateral(focus, 3, None).await.unwrap();
            prop_assert_eq!(a.ids().collect::<Vec<_>>(), b.ids().collect::<Vec<_>>());

            let a = forward.get_viewport(focus, None).await.unwrap();
            let b = backward.get_viewport(focus, None).await.unwrap();
            prop_assert_eq!(a, b);
            Ok(())
        })?;
    }

    #[test]
    fn prop_relatedness_symmetric(family in family(), x in 0u64..24, y in 0u64..24) {
        let (x, y) = (PersonId(x % family.size), PersonId(y % family.size));
        let kinship = Kinship::in_memory(repository(&family, false));

        runtime().block_on(async {
            let there = kinship.describe_relationship(x, y, 5, None).await.unwrap();
            let back = kinship.describe_relationship(y, x, 5, None).await.unwrap();
            prop_assert_eq!(there.is_related(), back.is_related());
            if let (Some(there), Some(back)) = (there.descriptor(), back.descriptor()) {
                prop_assert_eq!(there.classification.degree, back.classification.degree);
            }
            Ok(())
        })?;
    }
}
