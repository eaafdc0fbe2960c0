//! Traversal results: the plain data handed back to callers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use super::{Certainty, ParentalKind, PersonId, RelationshipEdge};

/// Which way a discovered path runs from the focus person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathDirection {
    Ancestor,
    Descendant,
    Lateral,
}

/// What kinds of parent/child links a path is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lineage {
    Biological,
    Adoptive,
    Step,
    Foster,
    /// The path crosses more than one parental kind.
    Mixed,
    /// The last hop is a spouse or partner link.
    Affinal,
}

impl Lineage {
    /// Lineage after appending one more parental hop.
    pub fn extend(current: Option<Lineage>, hop: ParentalKind) -> Lineage {
        let hop = Lineage::from(hop);
        match current {
            None => hop,
            Some(prev) if prev == hop => prev,
            Some(_) => Lineage::Mixed,
        }
    }
}

impl From<ParentalKind> for Lineage {
    fn from(kind: ParentalKind) -> Self {
        match kind {
            ParentalKind::Biological => Lineage::Biological,
            ParentalKind::Adoptive => Lineage::Adoptive,
            ParentalKind::Step => Lineage::Step,
            ParentalKind::Foster => Lineage::Foster,
        }
    }
}

/// One discovered person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalEntry {
    /// Shortest discovered path length from the focus.
    pub depth: u32,
    pub direction: PathDirection,
    pub lineage: Lineage,
    /// Weakest certainty along the path.
    pub certainty: Certainty,
    /// Predecessor on the discovered path. Depth-1 entries point at the
    /// focus; lateral entries bottom out at an ancestor of the focus.
    pub via: Option<PersonId>,
}

/// Why an edge was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    SelfLoop,
    /// The repository returned an edge that does not involve the queried person.
    Unrelated,
    /// The far endpoint is not in the Person Repository.
    DanglingEndpoint,
}

/// Non-fatal data-quality findings reported alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphWarning {
    MalformedEdge { edge: RelationshipEdge, reason: MalformedReason },
}

/// Result of an ancestor, descendant or lateral traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    pub focus: PersonId,
    /// Entries in discovery order.
    pub entries: IndexMap<PersonId, TraversalEntry>,
    /// The visit budget or deadline cut the search short.
    pub truncated: bool,
    pub warnings: Vec<GraphWarning>,
}

impl TraversalResult {
    pub fn new(focus: PersonId) -> Self {
        Self {
            focus,
            entries: IndexMap::new(),
            truncated: false,
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: PersonId) -> Option<&TraversalEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn depth_of(&self, id: PersonId) -> Option<u32> {
        self.get(id).map(|e| e.depth)
    }

    pub fn ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.entries.keys().copied()
    }

    /// Person ids at exactly the given depth, in discovery order.
    pub fn at_depth(&self, depth: u32) -> Vec<PersonId> {
        self.entries
            .iter()
            .filter(|(_, e)| e.depth == depth)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Reconstruct the discovered chain focus → ... → `id`.
    ///
    /// Returns `None` if `id` was not discovered.
    pub fn path_to(&self, id: PersonId) -> Option<Vec<PersonId>> {
        if id == self.focus {
            return Some(vec![id]);
        }
        let mut chain = vec![id];
        let mut cursor = self.entries.get(&id)?.via;
        // A chain can never be longer than the entry count.
        for _ in 0..=self.entries.len() {
            match cursor {
                None => {
                    chain.push(self.focus);
                    chain.reverse();
                    return Some(chain);
                }
                Some(step) if step == self.focus => {
                    chain.push(step);
                    chain.reverse();
                    return Some(chain);
                }
                Some(step) => {
                    chain.push(step);
                    cursor = self.entries.get(&step)?.via;
                }
            }
        }
        None
    }
}
