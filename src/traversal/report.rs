//! Outputs of the two-person and full-tree queries.

use serde::{Deserialize, Serialize};
use crate::classify::Classification;
use crate::model::*;

/// A person reachable as an ancestor (or self) of both query individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonAncestor {
    pub id: PersonId,
    pub depth_a: u32,
    pub depth_b: u32,
    /// `None` when the ancestor is `person_a` itself.
    pub lineage_a: Option<Lineage>,
    /// `None` when the ancestor is `person_b` itself.
    pub lineage_b: Option<Lineage>,
    /// Weakest certainty over both paths.
    pub certainty: Certainty,
}

impl CommonAncestor {
    pub fn total_depth(&self) -> u32 {
        self.depth_a + self.depth_b
    }
}

/// How two related people are related.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    pub classification: Classification,
    /// Depths through the primary (first) lowest common ancestor.
    pub depth_a: u32,
    pub depth_b: u32,
    /// Every common ancestor at the minimal combined depth, ordered by
    /// (combined depth, depth_a, id).
    pub common_ancestors: Vec<CommonAncestor>,
}

impl RelationshipDescriptor {
    pub fn primary_ancestor(&self) -> Option<&CommonAncestor> {
        self.common_ancestors.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelationshipOutcome {
    Related(RelationshipDescriptor),
    /// No common ancestor within the depth bound. A normal answer.
    NotRelated,
}

/// Answer to `describe_relationship`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipReport {
    pub person_a: PersonId,
    pub person_b: PersonId,
    pub outcome: RelationshipOutcome,
    pub truncated: bool,
    pub warnings: Vec<GraphWarning>,
}

impl RelationshipReport {
    pub fn descriptor(&self) -> Option<&RelationshipDescriptor> {
        match &self.outcome {
            RelationshipOutcome::Related(descriptor) => Some(descriptor),
            RelationshipOutcome::NotRelated => None,
        }
    }

    pub fn is_related(&self) -> bool {
        self.descriptor().is_some()
    }
}

/// Everything reachable for a full-tree view around one focus person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub focus: PersonId,
    /// Each root followed by its newly found descendants, then partners
    /// who married in.
    pub nodes: Vec<PersonNode>,
    /// All valid edges among `nodes`.
    pub edges: Vec<RelationshipEdge>,
    pub truncated: bool,
    pub warnings: Vec<GraphWarning>,
}

impl Viewport {
    pub fn ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }
}
