//! # Repository Traits
//!
//! The contract between the kinship core and whatever store holds person
//! and relationship records. The core only ever reads through these two
//! traits; persistence, retries and connection handling are the
//! implementor's business.
//!
//! ## Implementations
//!
//! | Repository | Module | Description |
//! |------------|--------|-------------|
//! | `MemoryRepository` | `memory` | In-memory, for tests and embedding |

pub mod memory;

use async_trait::async_trait;
use crate::model::*;
use crate::Result;

pub use memory::MemoryRepository;

/// Read access to person records.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Get a person by id. Returns `None` if not found.
    ///
    /// An unreachable store must surface as `Error::RepositoryUnavailable`.
    async fn get(&self, id: PersonId) -> Result<Option<Person>>;

    /// Whether a person with this id exists.
    ///
    /// Default: derived from `get`.
    async fn exists(&self, id: PersonId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

/// Read access to relationship records.
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Every edge where `id` appears as either endpoint.
    ///
    /// Rows may come back in any order, in either orientation for
    /// undirected kinds, and duplicated; the graph model normalizes them.
    async fn neighbors_of(&self, id: PersonId) -> Result<Vec<RelationshipEdge>>;
}

#[async_trait]
impl<T: PersonRepository + ?Sized> PersonRepository for std::sync::Arc<T> {
    async fn get(&self, id: PersonId) -> Result<Option<Person>> {
        (**self).get(id).await
    }

    async fn exists(&self, id: PersonId) -> Result<bool> {
        (**self).exists(id).await
    }
}

#[async_trait]
impl<T: RelationshipRepository + ?Sized> RelationshipRepository for std::sync::Arc<T> {
    async fn neighbors_of(&self, id: PersonId) -> Result<Vec<RelationshipEdge>> {
        (**self).neighbors_of(id).await
    }
}
