//! In-memory repository.
//!
//! The reference implementation of both repository traits. People and
//! edges live in HashMaps behind `RwLock`s; cloning the repository shares
//! the same underlying data.
//!
//! ## Limitations
//!
//! - **No validation on insert**: `relate()` stores whatever it is given,
//!   including self-loops and edges to unknown ids. That is deliberate so
//!   tests can feed malformed rows to the graph model.
//! - **Raw orientation**: edges are returned exactly as inserted, in
//!   insertion order.
//!
//! Use this repository for:
//! - Testing traversal, classification and layout
//! - Embedding the engine where the tree fits in memory

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::{Error, Result};
use super::{PersonRepository, RelationshipRepository};

// ============================================================================
// MemoryRepository
// ============================================================================

/// In-memory person and relationship store.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    people: RwLock<HashMap<PersonId, Person>>,
    edges: RwLock<Vec<RelationshipEdge>>,
    /// person id → indexes into `edges`
    adjacency: RwLock<HashMap<PersonId, Vec<usize>>>,
    unavailable: AtomicBool,
    neighbor_calls: AtomicU64,
    person_calls: AtomicU64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_person(&self, person: Person) -> PersonId {
        let id = person.id;
        self.inner.people.write().insert(id, person);
        id
    }

    /// Insert anonymous people with the given raw ids.
    pub fn add_people(&self, ids: impl IntoIterator<Item = u64>) {
        let mut people = self.inner.people.write();
        for raw in ids {
            people.insert(PersonId(raw), Person::new(raw));
        }
    }

    /// Store an edge as-is.
    pub fn relate(&self, edge: RelationshipEdge) {
        let mut edges = self.inner.edges.write();
        let idx = edges.len();
        edges.push(edge);
        drop(edges);

        let mut adj = self.inner.adjacency.write();
        adj.entry(edge.person_a).or_default().push(idx);
        if edge.person_a != edge.person_b {
            adj.entry(edge.person_b).or_default().push(idx);
        }
    }

    pub fn parent_of(&self, parent: u64, child: u64) {
        self.relate(RelationshipEdge::parent_child(parent, child, ParentalKind::Biological));
    }

    pub fn spouses(&self, a: u64, b: u64) {
        self.relate(RelationshipEdge::new(a, b, RelationshipKind::SpouseCurrent));
    }

    /// Simulate the backing store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of `neighbors_of` calls served so far.
    pub fn neighbor_calls(&self) -> u64 {
        self.inner.neighbor_calls.load(Ordering::Relaxed)
    }

    /// Number of `get`/`exists` calls served so far.
    pub fn person_calls(&self) -> u64 {
        self.inner.person_calls.load(Ordering::Relaxed)
    }

    pub fn person_count(&self) -> usize {
        self.inner.people.read().len()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(Error::RepositoryUnavailable("memory repository switched off".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Repository impls
// ============================================================================

#[async_trait]
impl PersonRepository for MemoryRepository {
    async fn get(&self, id: PersonId) -> Result<Option<Person>> {
        self.inner.person_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;
        Ok(self.inner.people.read().get(&id).cloned())
    }

    async fn exists(&self, id: PersonId) -> Result<bool> {
        self.inner.person_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;
        Ok(self.inner.people.read().contains_key(&id))
    }
}

#[async_trait]
impl RelationshipRepository for MemoryRepository {
    async fn neighbors_of(&self, id: PersonId) -> Result<Vec<RelationshipEdge>> {
        self.inner.neighbor_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_available()?;

        let adj = self.inner.adjacency.read();
        let edges = self.inner.edges.read();
        Ok(adj
            .get(&id)
            .map(|idxs| idxs.iter().filter_map(|i| edges.get(*i).copied()).collect())
            .unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================
