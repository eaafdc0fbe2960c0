//! # kinship-rs: Genealogical Graph Traversal and Layout
//!
//! Bounded traversal, relationship classification and generational layout
//! over a family graph kept behind two repository traits.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `PersonRepository` / `RelationshipRepository` are the
//!    contract between the engine and storage
//! 2. **Per-request state**: every call builds its own graph view, visited
//!    sets and budget, so a `Kinship` handle is freely shared
//! 3. **Partial over failed**: budgets truncate, malformed edges warn, an
//!    unrelated pair is an answer. Only missing people and an unreachable
//!    store are errors
//! 4. **Deterministic**: identical graph and arguments give identical output
//!
//! ## Quick Start
//!
//! ```rust
//! use kinship::{Kinship, PathKindFilter, PersonId};
//! use kinship::storage::MemoryRepository;
//!
//! # async fn example() -> kinship::Result<()> {
//! let repo = MemoryRepository::new();
//! repo.add_people([1, 2, 3]);
//! repo.parent_of(1, 2);
//! repo.parent_of(2, 3);
//!
//! let kinship = Kinship::in_memory(repo);
//! let result = kinship
//!     .get_ancestors(PersonId(3), 5, PathKindFilter::All, None)
//!     .await?;
//! assert_eq!(result.depth_of(PersonId(1)), Some(2));
//!
//! let report = kinship.describe_relationship(PersonId(3), PersonId(1), 5, None).await?;
//! println!("{}", report.descriptor().unwrap().classification);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Person, edge and result DTOs |
//! | [`storage`] | Repository traits + in-memory reference store |
//! | [`graph`] | Memoized, screened per-request graph view |
//! | [`traversal`] | Bounded BFS queries |
//! | [`classify`] | Depth pair → named relationship |
//! | [`layout`] | Generations and x/y placement |
//! | [`config`] | `EngineConfig`, budgets, spacing |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod graph;
pub mod traversal;
pub mod classify;
pub mod layout;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Person, PersonId, PersonNode,
    RelationshipEdge, RelationshipKind, ParentalKind, Certainty,
    TraversalResult, TraversalEntry, PathDirection, Lineage,
    GraphWarning, MalformedReason, LayoutPosition,
};

pub use storage::{PersonRepository, RelationshipRepository};

pub use traversal::{
    PathKindFilter, TraversalEngine,
    RelationshipReport, RelationshipOutcome, RelationshipDescriptor, CommonAncestor, Viewport,
};

pub use classify::{Classification, RelationshipLabel, SiblingKind};

pub use config::{EngineConfig, LayoutConfig, VisitBudget};

// ============================================================================
// Top-level handle
// ============================================================================

/// The primary entry point. Wraps the two repositories and a configuration.
pub struct Kinship<P, R> {
    people: P,
    relationships: R,
    config: EngineConfig,
}

impl<P, R> Kinship<P, R>
where
    P: PersonRepository,
    R: RelationshipRepository,
{
    /// Create a handle with the default configuration.
    pub fn with_repositories(people: P, relationships: R) -> Self {
        Self { people, relationships, config: EngineConfig::default() }
    }

    /// Replace the configuration after validating it.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn engine(&self, budget: Option<VisitBudget>) -> TraversalEngine<'_, P, R> {
        let budget = budget.unwrap_or(self.config.default_budget);
        TraversalEngine::new(&self.people, &self.relationships, &self.config, budget)
    }

    /// Ancestors of `person_id`, nearest generation first.
    #[tracing::instrument(skip(self, budget))]
    pub async fn get_ancestors(
        &self,
        person_id: PersonId,
        max_depth: u32,
        filter: PathKindFilter,
        budget: Option<VisitBudget>,
    ) -> Result<TraversalResult> {
        self.engine(budget).ancestors(person_id, max_depth, filter).await
    }

    /// Descendants of `person_id`, nearest generation first.
    #[tracing::instrument(skip(self, budget))]
    pub async fn get_descendants(
        &self,
        person_id: PersonId,
        max_depth: u32,
        filter: PathKindFilter,
        budget: Option<VisitBudget>,
    ) -> Result<TraversalResult> {
        self.engine(budget).descendants(person_id, max_depth, filter).await
    }

    /// Siblings, aunts, uncles, cousins and their partners.
    #[tracing::instrument(skip(self, budget))]
    pub async fn get_lateral(
        &self,
        person_id: PersonId,
        max_depth: u32,
        budget: Option<VisitBudget>,
    ) -> Result<TraversalResult> {
        self.engine(budget).lateral(person_id, max_depth).await
    }

    /// How `b` is related to `a`.
    #[tracing::instrument(skip(self, budget))]
    pub async fn describe_relationship(
        &self,
        a: PersonId,
        b: PersonId,
        max_depth: u32,
        budget: Option<VisitBudget>,
    ) -> Result<RelationshipReport> {
        self.engine(budget).relationship_between(a, b, max_depth).await
    }

    /// Nodes and edges of the whole tree around `focus`.
    #[tracing::instrument(skip(self, budget))]
    pub async fn get_viewport(&self, focus: PersonId, budget: Option<VisitBudget>) -> Result<Viewport> {
        self.engine(budget).full_tree(focus).await
    }

    /// Place `nodes` using the configured spacing. Pure; no repository access.
    #[tracing::instrument(skip(self, nodes, edges), fields(node_count = nodes.len(), edge_count = edges.len()))]
    pub fn compute_layout(
        &self,
        nodes: &[PersonNode],
        edges: &[RelationshipEdge],
        anchor: Option<PersonId>,
    ) -> Vec<LayoutPosition> {
        layout::compute_layout(nodes, edges, anchor, &self.config.layout)
    }
}

/// Both repositories backed by one shared in-memory store.
impl Kinship<storage::MemoryRepository, storage::MemoryRepository> {
    pub fn in_memory(repo: storage::MemoryRepository) -> Self {
        Self::with_repositories(repo.clone(), repo)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Person not found: {0}")]
    NotFound(PersonId),

    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
