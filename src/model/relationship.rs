//! Typed relationship edges between two people.

use serde::{Deserialize, Serialize};
use super::PersonId;

/// Closed set of relationship kinds.
///
/// Declaration order is the expansion priority used by traversal:
/// parental kinds first (biological, adoptive, step, foster), then unions,
/// then siblings, then everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    BiologicalParentChild,
    AdoptiveParentChild,
    StepParentChild,
    FosterParentChild,
    SpouseCurrent,
    SpouseFormer,
    Partner,
    SiblingFull,
    SiblingHalf,
    Other,
}

impl RelationshipKind {
    /// Directed parent→child kinds.
    pub fn is_parental(self) -> bool {
        self.parental().is_some()
    }

    /// Spouse and partner kinds.
    pub fn is_union(self) -> bool {
        matches!(
            self,
            RelationshipKind::SpouseCurrent | RelationshipKind::SpouseFormer | RelationshipKind::Partner
        )
    }

    pub fn is_sibling(self) -> bool {
        matches!(self, RelationshipKind::SiblingFull | RelationshipKind::SiblingHalf)
    }

    /// Undirected kinds are normalized with the lower id as `person_a`.
    pub fn is_directed(self) -> bool {
        self.is_parental()
    }

    pub fn parental(self) -> Option<ParentalKind> {
        match self {
            RelationshipKind::BiologicalParentChild => Some(ParentalKind::Biological),
            RelationshipKind::AdoptiveParentChild => Some(ParentalKind::Adoptive),
            RelationshipKind::StepParentChild => Some(ParentalKind::Step),
            RelationshipKind::FosterParentChild => Some(ParentalKind::Foster),
            RelationshipKind::SpouseCurrent
            | RelationshipKind::SpouseFormer
            | RelationshipKind::Partner
            | RelationshipKind::SiblingFull
            | RelationshipKind::SiblingHalf
            | RelationshipKind::Other => None,
        }
    }
}

/// The four parent/child flavours a lineage path can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentalKind {
    Biological,
    Adoptive,
    Step,
    Foster,
}

impl ParentalKind {
    pub fn relationship_kind(self) -> RelationshipKind {
        match self {
            ParentalKind::Biological => RelationshipKind::BiologicalParentChild,
            ParentalKind::Adoptive => RelationshipKind::AdoptiveParentChild,
            ParentalKind::Step => RelationshipKind::StepParentChild,
            ParentalKind::Foster => RelationshipKind::FosterParentChild,
        }
    }
}

/// Confidence in a recorded relationship, 1 (weakest) to 5 (strongest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Certainty(u8);

impl Certainty {
    pub const LOWEST: Certainty = Certainty(1);
    pub const HIGHEST: Certainty = Certainty(5);

    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Certainty(value))
    }

    /// Unknown or out-of-range values count as fully certain.
    pub fn or_highest(value: Option<i64>) -> Self {
        value
            .and_then(|v| u8::try_from(v).ok())
            .and_then(Certainty::new)
            .unwrap_or(Certainty::HIGHEST)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Certainty {
    fn default() -> Self {
        Certainty::HIGHEST
    }
}

impl TryFrom<u8> for Certainty {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Certainty::new(value).ok_or_else(|| format!("certainty {value} outside 1..=5"))
    }
}

impl From<Certainty> for u8 {
    fn from(c: Certainty) -> u8 {
        c.0
    }
}

/// An edge between two people.
///
/// For parental kinds `person_a` is the parent and `person_b` the child.
/// Undirected kinds carry no meaning in the order until normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub person_a: PersonId,
    pub person_b: PersonId,
    pub kind: RelationshipKind,
    #[serde(default)]
    pub certainty: Certainty,
}

impl RelationshipEdge {
    pub fn new(person_a: impl Into<PersonId>, person_b: impl Into<PersonId>, kind: RelationshipKind) -> Self {
        Self {
            person_a: person_a.into(),
            person_b: person_b.into(),
            kind,
            certainty: Certainty::HIGHEST,
        }
    }

    pub fn parent_child(parent: impl Into<PersonId>, child: impl Into<PersonId>, kind: ParentalKind) -> Self {
        Self::new(parent, child, kind.relationship_kind())
    }

    pub fn with_certainty(mut self, certainty: Certainty) -> Self {
        self.certainty = certainty;
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.person_a == self.person_b
    }

    pub fn touches(&self, id: PersonId) -> bool {
        self.person_a == id || self.person_b == id
    }

    /// The "other" end of the edge from the given person.
    pub fn other(&self, from: PersonId) -> Option<PersonId> {
        if from == self.person_a { Some(self.person_b) }
        else if from == self.person_b { Some(self.person_a) }
        else { None }
    }

    /// Canonical form: undirected kinds put the lower id first.
    pub fn normalized(mut self) -> Self {
        if !self.kind.is_directed() && self.person_b < self.person_a {
            std::mem::swap(&mut self.person_a, &mut self.person_b);
        }
        self
    }

    /// Parent of a parental edge.
    pub fn parent(&self) -> Option<PersonId> {
        self.kind.is_parental().then_some(self.person_a)
    }

    /// Child of a parental edge.
    pub fn child(&self) -> Option<PersonId> {
        self.kind.is_parental().then_some(self.person_b)
    }
}
