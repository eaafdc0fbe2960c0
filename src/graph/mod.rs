//! # Graph Model
//!
//! Materializes only the part of the family graph one request touches.
//! Neighbour lists are pulled from the Relationship Repository on first use
//! and memoized for the lifetime of the model, which is one request.
//!
//! Every edge handed out is:
//! - normalized (lower id first for undirected kinds),
//! - deduplicated (symmetric rows collapse; the weaker certainty is kept),
//! - screened (self-loops, unrelated rows and dangling endpoints are
//!   skipped and reported as [`GraphWarning::MalformedEdge`]),
//! - sorted by (kind priority, other-person id).

use std::sync::Arc;
use hashbrown::{HashMap, HashSet};

use crate::model::*;
use crate::storage::{PersonRepository, RelationshipRepository};
use crate::{Error, Result};

/// Per-request view over the two repositories.
pub struct GraphModel<'r, P: ?Sized, R: ?Sized> {
    people: &'r P,
    relationships: &'r R,
    neighbors: HashMap<PersonId, Arc<[RelationshipEdge]>>,
    existence: HashMap<PersonId, bool>,
    nodes: HashMap<PersonId, PersonNode>,
    reported: HashSet<(RelationshipEdge, MalformedReason)>,
    warnings: Vec<GraphWarning>,
}

impl<'r, P, R> GraphModel<'r, P, R>
where
    P: PersonRepository + ?Sized,
    R: RelationshipRepository + ?Sized,
{
    pub fn new(people: &'r P, relationships: &'r R) -> Self {
        Self {
            people,
            relationships,
            neighbors: HashMap::new(),
            existence: HashMap::new(),
            nodes: HashMap::new(),
            reported: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    // ========================================================================
    // Repository access (memoized)
    // ========================================================================

    /// Whether the person exists. One repository call per id per request.
    pub async fn exists(&mut self, id: PersonId) -> Result<bool> {
        if let Some(known) = self.existence.get(&id) {
            return Ok(*known);
        }
        let exists = self.people.exists(id).await?;
        self.existence.insert(id, exists);
        Ok(exists)
    }

    /// Fail with `NotFound` unless the person exists.
    pub async fn require(&mut self, id: PersonId) -> Result<()> {
        if self.exists(id).await? { Ok(()) } else { Err(Error::NotFound(id)) }
    }

    /// The graph-facing node for a person.
    pub async fn person(&mut self, id: PersonId) -> Result<PersonNode> {
        if let Some(node) = self.nodes.get(&id) {
            return Ok(node.clone());
        }
        let person = self.people.get(id).await?.ok_or(Error::NotFound(id))?;
        let node = PersonNode::from(&person);
        self.existence.insert(id, true);
        self.nodes.insert(id, node.clone());
        Ok(node)
    }

    /// All valid edges touching `id`, normalized and in expansion order.
    pub async fn load_neighbors(&mut self, id: PersonId) -> Result<Arc<[RelationshipEdge]>> {
        if let Some(edges) = self.neighbors.get(&id) {
            return Ok(Arc::clone(edges));
        }
        self.require(id).await?;

        let raw = self.relationships.neighbors_of(id).await?;
        let mut edges: Vec<RelationshipEdge> = Vec::with_capacity(raw.len());
        for edge in raw {
            let edge = edge.normalized();
            if edge.is_self_loop() {
                self.report(edge, MalformedReason::SelfLoop);
                continue;
            }
            let Some(other) = edge.other(id) else {
                self.report(edge, MalformedReason::Unrelated);
                continue;
            };
            if !self.exists(other).await? {
                self.report(edge, MalformedReason::DanglingEndpoint);
                continue;
            }
            edges.push(edge);
        }

        edges.sort_by_key(|e| (e.kind, e.other(id), e.person_a, e.certainty));
        edges.dedup_by(|later, kept| {
            later.kind == kept.kind && later.person_a == kept.person_a && later.person_b == kept.person_b
        });

        let edges: Arc<[RelationshipEdge]> = edges.into();
        self.neighbors.insert(id, Arc::clone(&edges));
        Ok(edges)
    }

    // ========================================================================
    // Typed neighbour views
    // ========================================================================

    /// Parental edges where `id` is the child, in expansion order.
    pub async fn parent_edges(&mut self, id: PersonId) -> Result<Vec<RelationshipEdge>> {
        let edges = self.load_neighbors(id).await?;
        Ok(edges.iter().filter(|e| e.child() == Some(id)).copied().collect())
    }

    /// Parental edges where `id` is the parent, in expansion order.
    pub async fn child_edges(&mut self, id: PersonId) -> Result<Vec<RelationshipEdge>> {
        let edges = self.load_neighbors(id).await?;
        Ok(edges.iter().filter(|e| e.parent() == Some(id)).copied().collect())
    }

    /// Spouse and partner edges of `id`, current spouse first.
    pub async fn union_edges(&mut self, id: PersonId) -> Result<Vec<RelationshipEdge>> {
        let edges = self.load_neighbors(id).await?;
        Ok(edges.iter().filter(|e| e.kind.is_union()).copied().collect())
    }

    /// Whether `a` and `b` are recorded as a couple (current, former or partner).
    pub async fn are_united(&mut self, a: PersonId, b: PersonId) -> Result<bool> {
        let edges = self.union_edges(a).await?;
        Ok(edges.iter().any(|e| e.other(a) == Some(b)))
    }

    /// Every valid edge with both endpoints in `ids`, deduplicated and
    /// sorted by (kind, person_a, person_b).
    pub async fn edges_among(&mut self, ids: &[PersonId]) -> Result<Vec<RelationshipEdge>> {
        let members: HashSet<PersonId> = ids.iter().copied().collect();
        let mut out = Vec::new();
        for id in ids {
            let edges = self.load_neighbors(*id).await?;
            out.extend(
                edges
                    .iter()
                    .filter(|e| members.contains(&e.person_a) && members.contains(&e.person_b))
                    .copied(),
            );
        }
        out.sort_by_key(|e| (e.kind, e.person_a, e.person_b, e.certainty));
        out.dedup_by(|later, kept| {
            later.kind == kept.kind && later.person_a == kept.person_a && later.person_b == kept.person_b
        });
        Ok(out)
    }

    // ========================================================================
    // Warnings
    // ========================================================================

    fn report(&mut self, edge: RelationshipEdge, reason: MalformedReason) {
        if !self.reported.insert((edge, reason)) {
            return;
        }
        tracing::warn!(
            person_a = %edge.person_a,
            person_b = %edge.person_b,
            kind = ?edge.kind,
            ?reason,
            "skipping malformed relationship edge"
        );
        self.warnings.push(GraphWarning::MalformedEdge { edge, reason });
    }

    /// Drain the warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<GraphWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Number of distinct people whose neighbours were loaded.
    pub fn loaded_count(&self) -> usize {
        self.neighbors.len()
    }
}
