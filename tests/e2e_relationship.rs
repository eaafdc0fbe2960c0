//! End-to-end integration tests for relationship classification.
//!
//! Tests lowest-common-ancestor search, sibling kinds, cousin arithmetic,
//! symmetry between the two argument orders, and the NotRelated outcome.
//!
//! Each test exercises: Kinship::describe_relationship -> TraversalEngine -> classify.

use kinship::storage::MemoryRepository;
use kinship::{
    Kinship, PathKindFilter, Person, PersonId, RelationshipLabel, RelationshipOutcome, SiblingKind,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

/// Grandparents 1 ══ 2; children 3, 4; 3 has 7, 4 has 9; 9 has 10.
fn cousins() -> Kinship<MemoryRepository, MemoryRepository> {
    let repo = MemoryRepository::new();
    repo.add_people([1, 2, 3, 4, 7, 9, 10]);
    repo.spouses(1, 2);
    for child in [3, 4] {
        repo.parent_of(1, child);
        repo.parent_of(2, child);
    }
    repo.parent_of(3, 7);
    repo.parent_of(4, 9);
    repo.parent_of(9, 10);
    Kinship::in_memory(repo)
}

async fn label(kinship: &Kinship<MemoryRepository, MemoryRepository>, a: u64, b: u64) -> RelationshipLabel {
    kinship
        .describe_relationship(PersonId(a), PersonId(b), 6, None)
        .await
        .unwrap()
        .descriptor()
        .unwrap()
        .classification
        .label
}

// ============================================================================
// 1. End-to-end family
// ============================================================================

#[tokio::test]
async fn test_alice_bob_carol_dave() {
    let repo = MemoryRepository::new();
    repo.add_person(Person::new(1).with_name("Alice"));
    repo.add_person(Person::new(2).with_name("Bob"));
    repo.add_person(Person::new(3).with_name("Carol"));
    repo.add_person(Person::new(4).with_name("Dave"));
    repo.spouses(1, 2);
    for child in [3, 4] {
        repo.parent_of(1, child);
        repo.parent_of(2, child);
    }
    let kinship = Kinship::in_memory(repo);

    let report = kinship.describe_relationship(PersonId(3), PersonId(4), 5, None).await.unwrap();
    let descriptor = report.descriptor().unwrap();
    assert_eq!(descriptor.classification.label, RelationshipLabel::Sibling { kind: SiblingKind::Full });
    assert_eq!(descriptor.classification.degree, 2);
    assert_eq!(
        descriptor.common_ancestors.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![PersonId(1), PersonId(2)]
    );

    let ancestors = kinship
        .get_ancestors(PersonId(3), 5, PathKindFilter::All, None)
        .await
        .unwrap();
    assert_eq!(ancestors.len(), 2);
    assert_eq!(ancestors.depth_of(PersonId(1)), Some(1));
    assert_eq!(ancestors.depth_of(PersonId(2)), Some(1));

    let viewport = kinship.get_viewport(PersonId(3), None).await.unwrap();
    let positions = kinship.compute_layout(&viewport.nodes, &viewport.edges, None);
    let at = |id: u64| positions.iter().find(|p| p.person_id == PersonId(id)).unwrap();

    assert_eq!(at(1).generation, 0);
    assert_eq!(at(2).generation, 0);
    assert_eq!(at(3).generation, 1);
    assert_eq!(at(4).generation, 1);
    let spacing = kinship.config().layout.node_spacing;
    assert_eq!((at(1).x - at(2).x).abs(), spacing);
}

// ============================================================================
// 2. Siblings
// ============================================================================

#[tokio::test]
async fn test_half_sibling_through_one_parent() {
    // 1 ══ 2 have 3; 1 and 5 (no union) have 6.
    let repo = MemoryRepository::new();
    repo.add_people([1, 2, 3, 5, 6]);
    repo.spouses(1, 2);
    repo.parent_of(1, 3);
    repo.parent_of(2, 3);
    repo.parent_of(1, 6);
    repo.parent_of(5, 6);
    let kinship = Kinship::in_memory(repo);

    assert_eq!(label(&kinship, 3, 6).await, RelationshipLabel::Sibling { kind: SiblingKind::Half });
}

#[tokio::test]
async fn test_shared_parents_without_union_are_half() {
    let repo = MemoryRepository::new();
    repo.add_people(1..=4);
    for child in [3, 4] {
        repo.parent_of(1, child);
        repo.parent_of(2, child);
    }
    let kinship = Kinship::in_memory(repo);

    assert_eq!(label(&kinship, 3, 4).await, RelationshipLabel::Sibling { kind: SiblingKind::Half });
}

// ============================================================================
// 3. Cousins, aunts, lineal
// ============================================================================

#[tokio::test]
async fn test_cousin_classification() {
    let kinship = cousins();
    assert_eq!(label(&kinship, 7, 9).await, RelationshipLabel::Cousin { degree: 1, removed: 0 });
    assert_eq!(label(&kinship, 7, 10).await, RelationshipLabel::Cousin { degree: 1, removed: 1 });
    assert_eq!(label(&kinship, 7, 4).await, RelationshipLabel::AuntUncle { generations: 1 });
    assert_eq!(label(&kinship, 4, 7).await, RelationshipLabel::NieceNephew { generations: 1 });
    assert_eq!(label(&kinship, 10, 1).await, RelationshipLabel::Ancestor { generations: 3 });
    assert_eq!(label(&kinship, 1, 10).await, RelationshipLabel::Descendant { generations: 3 });

    let report = kinship.describe_relationship(PersonId(7), PersonId(10), 6, None).await.unwrap();
    let text = report.descriptor().unwrap().classification.to_string();
    assert_eq!(text, "first cousin once removed (degree 5)");
}

#[tokio::test]
async fn test_classification_is_symmetric() {
    let kinship = cousins();
    let people = [1, 2, 3, 4, 7, 9, 10];
    for a in people {
        for b in people {
            let forward = kinship.describe_relationship(PersonId(a), PersonId(b), 6, None).await.unwrap();
            let backward = kinship.describe_relationship(PersonId(b), PersonId(a), 6, None).await.unwrap();
            match (forward.descriptor(), backward.descriptor()) {
                (Some(there), Some(back)) => {
                    assert_eq!(there.classification.inverse(), back.classification, "{a} vs {b}");
                    assert_eq!(there.classification.degree, back.classification.degree);
                }
                (None, None) => {}
                _ => panic!("relatedness of {a} and {b} depends on argument order"),
            }
        }
    }
}

#[tokio::test]
async fn test_self_relation() {
    let kinship = cousins();
    assert_eq!(label(&kinship, 7, 7).await, RelationshipLabel::SelfRelation);
}

// ============================================================================
// 4. Not related
// ============================================================================

#[tokio::test]
async fn test_disconnected_people_not_related() {
    let repo = MemoryRepository::new();
    repo.add_people([1, 2, 3, 4]);
    repo.parent_of(1, 2);
    repo.parent_of(3, 4);
    let kinship = Kinship::in_memory(repo);

    let report = kinship.describe_relationship(PersonId(2), PersonId(4), 5, None).await.unwrap();
    assert_eq!(report.outcome, RelationshipOutcome::NotRelated);
    assert!(!report.is_related());
    assert!(!report.truncated);
}

#[tokio::test]
async fn test_depth_bound_hides_distant_relation() {
    let kinship = cousins();
    let near = kinship.describe_relationship(PersonId(7), PersonId(9), 1, None).await.unwrap();
    assert_eq!(near.outcome, RelationshipOutcome::NotRelated);

    let far = kinship.describe_relationship(PersonId(7), PersonId(9), 2, None).await.unwrap();
    assert!(far.is_related());
}

#[tokio::test]
async fn test_spouses_alone_are_not_blood_relatives() {
    let repo = MemoryRepository::new();
    repo.add_people([1, 2]);
    repo.spouses(1, 2);
    let kinship = Kinship::in_memory(repo);

    let report = kinship.describe_relationship(PersonId(1), PersonId(2), 5, None).await.unwrap();
    assert_eq!(report.outcome, RelationshipOutcome::NotRelated);
}
