//! # Traversal Engine
//!
//! Bounded, level-synchronous breadth-first search over the family graph.
//!
//! ```text
//! focus ──parents──► depth 1 ──parents──► depth 2 ...      ancestors
//! focus ──children─► depth 1 ──children─► depth 2 ...      descendants
//! ancestor X (up) ──children × k──► relative at up + k     lateral
//! ancestors(a) ∩ ancestors(b) ──min(depth_a + depth_b)──► classify
//! ```
//!
//! Ordering: every neighbour list of a level is loaded before any entry of
//! that level is admitted, frontier nodes expand in discovery order and
//! each node's edges in (kind priority, other id) order. Identical input
//! yields identical output.
//!
//! An engine is built for exactly one request: it owns the memoizing
//! [`GraphModel`] and the [`BudgetTracker`], and every query consumes it.

pub mod report;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::classify::{self, SharedAncestry};
use crate::config::{BudgetTracker, EngineConfig, VisitBudget};
use crate::graph::GraphModel;
use crate::model::*;
use crate::storage::{PersonRepository, RelationshipRepository};
use crate::{Error, Result};

pub use report::{
    CommonAncestor, RelationshipDescriptor, RelationshipOutcome, RelationshipReport, Viewport,
};

/// Which parental edges an ancestor/descendant search may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKindFilter {
    /// Every parental kind; paths crossing kinds are tagged `Mixed`.
    #[default]
    All,
    Only(ParentalKind),
}

impl PathKindFilter {
    pub fn admits(self, kind: ParentalKind) -> bool {
        match self {
            PathKindFilter::All => true,
            PathKindFilter::Only(only) => only == kind,
        }
    }
}

impl TryFrom<RelationshipKind> for PathKindFilter {
    type Error = Error;

    fn try_from(kind: RelationshipKind) -> Result<Self> {
        kind.parental()
            .map(PathKindFilter::Only)
            .ok_or_else(|| Error::InvalidArgument(format!("{kind:?} is not a parent/child kind")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Up,
    Down,
}

/// A frontier slot: who, how we got there, how sure we are.
type Frontier = Vec<(PersonId, Option<Lineage>, Certainty)>;

enum Admission {
    Admitted,
    Lowered,
    Known,
    Exhausted,
}

/// Single-request traversal engine.
pub struct TraversalEngine<'r, P: ?Sized, R: ?Sized> {
    graph: GraphModel<'r, P, R>,
    budget: BudgetTracker,
    config: &'r EngineConfig,
    /// People already charged against the budget earlier in this request.
    prepaid: HashSet<PersonId>,
}

impl<'r, P, R> TraversalEngine<'r, P, R>
where
    P: PersonRepository + ?Sized,
    R: RelationshipRepository + ?Sized,
{
    pub fn new(people: &'r P, relationships: &'r R, config: &'r EngineConfig, budget: VisitBudget) -> Self {
        Self {
            graph: GraphModel::new(people, relationships),
            budget: BudgetTracker::new(budget),
            config,
            prepaid: HashSet::new(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Ancestors of `focus` up to `max_depth` generations.
    pub async fn ancestors(mut self, focus: PersonId, max_depth: u32, filter: PathKindFilter) -> Result<TraversalResult> {
        self.graph.require(focus).await?;
        let mut result = TraversalResult::new(focus);
        let mut visited = HashSet::from([focus]);
        self.climb(focus, max_depth, filter, Vertical::Up, &mut visited, &mut result).await?;
        Ok(self.finish(result))
    }

    /// Descendants of `focus` down to `max_depth` generations.
    pub async fn descendants(mut self, focus: PersonId, max_depth: u32, filter: PathKindFilter) -> Result<TraversalResult> {
        self.graph.require(focus).await?;
        let mut result = TraversalResult::new(focus);
        let mut visited = HashSet::from([focus]);
        self.climb(focus, max_depth, filter, Vertical::Down, &mut visited, &mut result).await?;
        Ok(self.finish(result))
    }

    /// Collateral relatives: siblings, their partners, nieces and nephews,
    /// then aunts, uncles and cousins further up.
    ///
    /// `max_depth` bounds how many generations the ancestor climb goes and
    /// is clamped to `EngineConfig::lateral_depth_cap`. A relative found
    /// `k` generations below an ancestor at depth `up` gets depth `up + k`;
    /// descent from that ancestor stops at `k = up + 1`.
    pub async fn lateral(mut self, focus: PersonId, max_depth: u32) -> Result<TraversalResult> {
        let max_depth = max_depth.min(self.config.lateral_depth_cap);
        self.graph.require(focus).await?;

        let mut line = TraversalResult::new(focus);
        let mut visited = HashSet::from([focus]);
        self.climb(focus, max_depth, PathKindFilter::All, Vertical::Up, &mut visited, &mut line).await?;

        // The direct line (focus + ancestors) is never a lateral entry.
        let excluded = visited;
        let mut result = TraversalResult::new(focus);
        for (ancestor, entry) in &line.entries {
            if self.budget.is_truncated() {
                break;
            }
            self.descend_collateral(*ancestor, entry, &excluded, &mut result).await?;
        }
        Ok(self.finish(result))
    }

    /// Relationship between `a` and `b` through their lowest common
    /// ancestor(s), each side searched up to `max_depth` generations.
    pub async fn relationship_between(mut self, a: PersonId, b: PersonId, max_depth: u32) -> Result<RelationshipReport> {
        self.graph.require(a).await?;
        self.graph.require(b).await?;

        let outcome = if a == b {
            RelationshipOutcome::Related(RelationshipDescriptor {
                classification: classify::classify(0, 0),
                depth_a: 0,
                depth_b: 0,
                common_ancestors: vec![CommonAncestor {
                    id: a,
                    depth_a: 0,
                    depth_b: 0,
                    lineage_a: None,
                    lineage_b: None,
                    certainty: Certainty::HIGHEST,
                }],
            })
        } else {
            let mut from_a = TraversalResult::new(a);
            let mut visited = HashSet::from([a]);
            self.climb(a, max_depth, PathKindFilter::All, Vertical::Up, &mut visited, &mut from_a).await?;

            let mut from_b = TraversalResult::new(b);
            let mut visited = HashSet::from([b]);
            self.climb(b, max_depth, PathKindFilter::All, Vertical::Up, &mut visited, &mut from_b).await?;

            let common = lowest_common_ancestors(&from_a, &from_b);
            match common.first().copied() {
                None => RelationshipOutcome::NotRelated,
                Some(primary) => {
                    let shared = self.shared_ancestry(&common, primary).await?;
                    RelationshipOutcome::Related(RelationshipDescriptor {
                        classification: classify::classify_shared(primary.depth_a, primary.depth_b, shared),
                        depth_a: primary.depth_a,
                        depth_b: primary.depth_b,
                        common_ancestors: common,
                    })
                }
            }
        };

        let truncated = self.budget.is_truncated();
        let warnings = self.graph.take_warnings();
        tracing::debug!(
            person_a = %a,
            person_b = %b,
            related = matches!(outcome, RelationshipOutcome::Related(_)),
            truncated,
            "relationship classified"
        );
        Ok(RelationshipReport { person_a: a, person_b: b, outcome, truncated, warnings })
    }

    /// Everything needed to draw the whole tree around `focus`.
    ///
    /// Climbs to every root above the focus, walks down from each root and
    /// pulls in partners of everyone found. "Unbounded" depth is capped at
    /// `EngineConfig::max_traversal_depth`.
    ///
    /// Everyone but the focus is charged against the visit budget once, so
    /// a viewport never holds more than `max_visits + 1` people.
    pub async fn full_tree(mut self, focus: PersonId) -> Result<Viewport> {
        self.graph.require(focus).await?;
        let limit = self.config.max_traversal_depth;

        let mut line = TraversalResult::new(focus);
        let mut line_visited: HashSet<PersonId> = HashSet::from([focus]);
        self.climb(focus, limit, PathKindFilter::All, Vertical::Up, &mut line_visited, &mut line).await?;

        // A root has no parent inside the climbed set.
        let mut roots = Vec::new();
        for id in std::iter::once(focus).chain(line.ids()) {
            let parents = self.graph.parent_edges(id).await?;
            if !parents.iter().any(|e| line_visited.contains(&e.person_a)) {
                roots.push(id);
            }
        }
        if roots.is_empty() {
            // Pure parent cycle above the focus: break it at the smallest id.
            roots.extend(line_visited.iter().copied().min());
        }
        roots.sort();
        // Roots and the way back down to the focus were paid for on the climb.
        self.prepaid = line_visited.clone();

        let mut order: Vec<PersonId> = Vec::new();
        let mut included: HashSet<PersonId> = HashSet::new();
        for root in roots {
            if included.insert(root) {
                order.push(root);
            }
            let mut below = TraversalResult::new(root);
            self.climb(root, limit, PathKindFilter::All, Vertical::Down, &mut included, &mut below).await?;
            order.extend(below.ids());
            if self.budget.is_truncated() {
                break;
            }
        }
        // A truncated walk can stop above people the climb already admitted.
        for id in std::iter::once(focus).chain(line.ids()) {
            if included.insert(id) {
                order.push(id);
            }
        }

        let blood = order.clone();
        'partners: for id in blood {
            for edge in self.graph.union_edges(id).await? {
                let Some(partner) = edge.other(id) else { continue };
                if included.contains(&partner) {
                    continue;
                }
                if !self.budget.try_admit() {
                    break 'partners;
                }
                included.insert(partner);
                order.push(partner);
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for id in &order {
            nodes.push(self.graph.person(*id).await?);
        }
        let edges = self.graph.edges_among(&order).await?;

        let truncated = self.budget.is_truncated();
        tracing::debug!(
            focus = %focus,
            nodes = nodes.len(),
            edges = edges.len(),
            truncated,
            "viewport assembled"
        );
        Ok(Viewport { focus, nodes, edges, truncated, warnings: self.graph.take_warnings() })
    }

    // ========================================================================
    // BFS internals
    // ========================================================================

    /// Vertical BFS from `focus`, writing new people into `result`.
    ///
    /// `visited` is the caller's: seeded with whatever must never be
    /// entered (at least the focus), and guarantees termination on cyclic
    /// parent data.
    async fn climb(
        &mut self,
        focus: PersonId,
        max_depth: u32,
        filter: PathKindFilter,
        vertical: Vertical,
        visited: &mut HashSet<PersonId>,
        result: &mut TraversalResult,
    ) -> Result<()> {
        let direction = match vertical {
            Vertical::Up => PathDirection::Ancestor,
            Vertical::Down => PathDirection::Descendant,
        };
        let mut frontier: Frontier = vec![(focus, None, Certainty::HIGHEST)];

        for depth in 1..=max_depth {
            if frontier.is_empty() || !self.budget.check_deadline() {
                break;
            }
            let expansions = self.expand_level(&frontier, vertical).await?;

            let mut next = Frontier::new();
            'level: for ((from, lineage, certainty), edges) in frontier.iter().zip(expansions) {
                for edge in edges.iter() {
                    let Some(kind) = edge.kind.parental() else { continue };
                    if !filter.admits(kind) {
                        continue;
                    }
                    let to = match vertical {
                        Vertical::Up if edge.person_b == *from => edge.person_a,
                        Vertical::Down if edge.person_a == *from => edge.person_b,
                        _ => continue,
                    };
                    if visited.contains(&to) {
                        continue;
                    }
                    if !self.prepaid.contains(&to) && !self.budget.try_admit() {
                        break 'level;
                    }
                    visited.insert(to);

                    let lineage = Lineage::extend(*lineage, kind);
                    let certainty = (*certainty).min(edge.certainty);
                    result.entries.insert(to, TraversalEntry {
                        depth,
                        direction,
                        lineage,
                        certainty,
                        via: Some(*from),
                    });
                    next.push((to, Some(lineage), certainty));
                }
            }

            if self.budget.is_truncated() {
                break;
            }
            frontier = next;
        }
        Ok(())
    }

    /// Load the whole level before admitting anything from it.
    async fn expand_level(&mut self, frontier: &Frontier, vertical: Vertical) -> Result<Vec<Vec<RelationshipEdge>>> {
        let mut expansions = Vec::with_capacity(frontier.len());
        for (id, _, _) in frontier {
            let edges = match vertical {
                Vertical::Up => self.graph.parent_edges(*id).await?,
                Vertical::Down => self.graph.child_edges(*id).await?,
            };
            expansions.push(edges);
        }
        Ok(expansions)
    }

    /// Walk down from one ancestor, skipping the focus's own line.
    async fn descend_collateral(
        &mut self,
        ancestor: PersonId,
        ancestor_entry: &TraversalEntry,
        excluded: &HashSet<PersonId>,
        result: &mut TraversalResult,
    ) -> Result<()> {
        let up = ancestor_entry.depth;
        let mut seen: HashSet<PersonId> = HashSet::from([ancestor]);
        let mut frontier: Frontier = vec![(ancestor, Some(ancestor_entry.lineage), ancestor_entry.certainty)];

        for k in 1..=up + 1 {
            if frontier.is_empty() || !self.budget.check_deadline() {
                break;
            }
            let expansions = self.expand_level(&frontier, Vertical::Down).await?;
            let depth = up + k;

            let mut next = Frontier::new();
            for ((from, lineage, certainty), edges) in frontier.iter().zip(expansions) {
                for edge in edges.iter() {
                    let Some(kind) = edge.kind.parental() else { continue };
                    let to = edge.person_b;
                    if edge.person_a != *from || excluded.contains(&to) || !seen.insert(to) {
                        continue;
                    }
                    let lineage = Lineage::extend(*lineage, kind);
                    let certainty = (*certainty).min(edge.certainty);
                    let entry = TraversalEntry {
                        depth,
                        direction: PathDirection::Lateral,
                        lineage,
                        certainty,
                        via: Some(*from),
                    };
                    match self.admit_lateral(result, to, entry) {
                        Admission::Admitted | Admission::Lowered => next.push((to, Some(lineage), certainty)),
                        Admission::Known => {}
                        Admission::Exhausted => return Ok(()),
                    }
                }
            }

            if k == up {
                self.add_partners(&next, depth + 1, excluded, result).await?;
                if self.budget.is_truncated() {
                    return Ok(());
                }
            }
            frontier = next;
        }
        Ok(())
    }

    /// Partners of same-generation relatives, one hop further out.
    async fn add_partners(
        &mut self,
        relatives: &Frontier,
        depth: u32,
        excluded: &HashSet<PersonId>,
        result: &mut TraversalResult,
    ) -> Result<()> {
        for (relative, _, certainty) in relatives {
            for edge in self.graph.union_edges(*relative).await? {
                let Some(partner) = edge.other(*relative) else { continue };
                if excluded.contains(&partner) {
                    continue;
                }
                let entry = TraversalEntry {
                    depth,
                    direction: PathDirection::Lateral,
                    lineage: Lineage::Affinal,
                    certainty: (*certainty).min(edge.certainty),
                    via: Some(*relative),
                };
                if let Admission::Exhausted = self.admit_lateral(result, partner, entry) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn admit_lateral(&mut self, result: &mut TraversalResult, id: PersonId, entry: TraversalEntry) -> Admission {
        if let Some(existing) = result.entries.get_mut(&id) {
            if entry.depth < existing.depth {
                *existing = entry;
                return Admission::Lowered;
            }
            return Admission::Known;
        }
        if !self.budget.try_admit() {
            return Admission::Exhausted;
        }
        result.entries.insert(id, entry);
        Admission::Admitted
    }

    async fn shared_ancestry(&mut self, common: &[CommonAncestor], primary: CommonAncestor) -> Result<SharedAncestry> {
        let peers: Vec<PersonId> = common
            .iter()
            .filter(|c| c.depth_a == primary.depth_a && c.depth_b == primary.depth_b)
            .map(|c| c.id)
            .collect();
        if peers.len() < 2 {
            return Ok(SharedAncestry::Single);
        }
        for (i, x) in peers.iter().enumerate() {
            for y in &peers[i + 1..] {
                if self.graph.are_united(*x, *y).await? {
                    return Ok(SharedAncestry::Couple);
                }
            }
        }
        Ok(SharedAncestry::Unpaired)
    }

    fn finish(mut self, mut result: TraversalResult) -> TraversalResult {
        result.truncated = self.budget.is_truncated();
        result.warnings = self.graph.take_warnings();
        tracing::debug!(
            focus = %result.focus,
            found = result.len(),
            loaded = self.graph.loaded_count(),
            visits = self.budget.admitted(),
            truncated = result.truncated,
            "traversal finished"
        );
        result
    }
}

/// Common ancestors (self included at depth 0) at the minimal combined
/// depth, ordered by (combined depth, depth_a, id).
fn lowest_common_ancestors(from_a: &TraversalResult, from_b: &TraversalResult) -> Vec<CommonAncestor> {
    let side = |result: &TraversalResult, id: PersonId| -> Option<(u32, Option<Lineage>, Certainty)> {
        if id == result.focus {
            Some((0, None, Certainty::HIGHEST))
        } else {
            result.get(id).map(|e| (e.depth, Some(e.lineage), e.certainty))
        }
    };

    let mut common: Vec<CommonAncestor> = std::iter::once(from_a.focus)
        .chain(from_a.ids())
        .filter_map(|id| {
            let (depth_a, lineage_a, cert_a) = side(from_a, id)?;
            let (depth_b, lineage_b, cert_b) = side(from_b, id)?;
            Some(CommonAncestor {
                id,
                depth_a,
                depth_b,
                lineage_a,
                lineage_b,
                certainty: cert_a.min(cert_b),
            })
        })
        .collect();

    let Some(best) = common.iter().map(CommonAncestor::total_depth).min() else {
        return common;
    };
    common.retain(|c| c.total_depth() == best);
    common.sort_by_key(|c| (c.total_depth(), c.depth_a, c.id));
    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{RelationshipLabel, SiblingKind};
    use crate::storage::MemoryRepository;

    fn engine<'r>(repo: &'r MemoryRepository, config: &'r EngineConfig) -> TraversalEngine<'r, MemoryRepository, MemoryRepository> {
        TraversalEngine::new(repo, repo, config, VisitBudget::unlimited())
    }

    /// 1 ─┬─ 2
    ///    ├── 3
    ///    └── 4 ── 5 (spouse)
    ///         └── 6 (child of 4 & 5)
    fn family() -> MemoryRepository {
        let repo = MemoryRepository::new();
        repo.add_people(1..=6);
        repo.spouses(1, 2);
        for child in [3, 4] {
            repo.parent_of(1, child);
            repo.parent_of(2, child);
        }
        repo.spouses(4, 5);
        repo.parent_of(4, 6);
        repo.parent_of(5, 6);
        repo
    }

    #[tokio::test]
    async fn test_ancestors_by_generation() {
        let repo = family();
        let config = EngineConfig::default();
        let result = engine(&repo, &config).ancestors(PersonId(6), 5, PathKindFilter::All).await.unwrap();

        let ids: Vec<PersonId> = result.ids().collect();
        assert_eq!(ids, vec![PersonId(4), PersonId(5), PersonId(1), PersonId(2)]);
        assert_eq!(result.depth_of(PersonId(1)), Some(2));
        assert_eq!(result.get(PersonId(1)).unwrap().via, Some(PersonId(4)));
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_descendants_stop_at_depth() {
        let repo = family();
        let config = EngineConfig::default();
        let result = engine(&repo, &config).descendants(PersonId(1), 1, PathKindFilter::All).await.unwrap();
        let ids: Vec<PersonId> = result.ids().collect();
        assert_eq!(ids, vec![PersonId(3), PersonId(4)]);
        assert!(result.entries.values().all(|e| e.direction == PathDirection::Descendant));
    }

    #[tokio::test]
    async fn test_lateral_orders_siblings_then_partners_then_nieces() {
        let repo = family();
        let config = EngineConfig::default();
        let result = engine(&repo, &config).lateral(PersonId(3), 3).await.unwrap();

        let ids: Vec<PersonId> = result.ids().collect();
        assert_eq!(ids, vec![PersonId(4), PersonId(5), PersonId(6)]);
        assert_eq!(result.depth_of(PersonId(4)), Some(2));
        assert_eq!(result.depth_of(PersonId(5)), Some(3));
        assert_eq!(result.get(PersonId(5)).unwrap().lineage, Lineage::Affinal);
        assert_eq!(result.depth_of(PersonId(6)), Some(3));
    }

    #[tokio::test]
    async fn test_relationship_between_siblings() {
        let repo = family();
        let config = EngineConfig::default();
        let report = engine(&repo, &config)
            .relationship_between(PersonId(3), PersonId(4), 5)
            .await
            .unwrap();
        let descriptor = report.descriptor().unwrap();
        assert_eq!(descriptor.classification.label, RelationshipLabel::Sibling { kind: SiblingKind::Full });
        assert_eq!(descriptor.common_ancestors.len(), 2);
    }

    #[tokio::test]
    async fn test_relationship_with_own_ancestor() {
        let repo = family();
        let config = EngineConfig::default();
        let report = engine(&repo, &config)
            .relationship_between(PersonId(6), PersonId(1), 5)
            .await
            .unwrap();
        let descriptor = report.descriptor().unwrap();
        assert_eq!(descriptor.classification.label, RelationshipLabel::Ancestor { generations: 2 });
        assert_eq!(descriptor.primary_ancestor().unwrap().id, PersonId(1));
    }

    #[tokio::test]
    async fn test_full_tree_collects_married_in_partners() {
        let repo = family();
        let config = EngineConfig::default();
        let viewport = engine(&repo, &config).full_tree(PersonId(6)).await.unwrap();

        let ids: Vec<PersonId> = viewport.ids().collect();
        assert_eq!(ids, vec![
            PersonId(1), PersonId(3), PersonId(4), PersonId(6), PersonId(2), PersonId(5),
        ]);
        // 2 spouse edges + 6 parent edges
        assert_eq!(viewport.edges.len(), 8);
    }

    #[test]
    fn test_filter_from_kind() {
        assert_eq!(
            PathKindFilter::try_from(RelationshipKind::StepParentChild).unwrap(),
            PathKindFilter::Only(ParentalKind::Step)
        );
        assert!(matches!(
            PathKindFilter::try_from(RelationshipKind::SpouseCurrent),
            Err(Error::InvalidArgument(_))
        ));
    }
}
