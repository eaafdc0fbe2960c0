//! # Relationship Classifier
//!
//! Turns the two path lengths to a lowest common ancestor into a named
//! relationship. Pure integer arithmetic; the graph search that produces
//! the depths lives in [`traversal`](crate::traversal).
//!
//! Labels describe `person_b` as seen from `person_a`:
//!
//! | depth_a | depth_b | label |
//! |---------|---------|-------|
//! | 0 | 0 | self |
//! | n | 0 | ancestor (1 = parent, 2 = grandparent, ...) |
//! | 0 | n | descendant |
//! | 1 | 1 | sibling |
//! | n | n | (n-1)th cousin |
//! | n ≥ 2 | 1 | aunt/uncle, (n-1) generations up |
//! | 1 | n ≥ 2 | niece/nephew, (n-1) generations down |
//! | a | b | (min-1)th cousin, \|a-b\| times removed |

use std::fmt;
use serde::{Deserialize, Serialize};

/// Full or half, for siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingKind {
    /// Both parents shared, and the parents are a recorded couple.
    Full,
    Half,
    /// Depth arithmetic alone cannot tell.
    Unspecified,
}

/// How the minimal common ancestors relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedAncestry {
    /// Exactly one common ancestor at the minimal distance.
    Single,
    /// Two or more, and at least two of them are spouses or partners.
    Couple,
    /// Two or more with no recorded union between any of them.
    Unpaired,
}

/// A named relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "relation", rename_all = "snake_case")]
pub enum RelationshipLabel {
    SelfRelation,
    Ancestor { generations: u32 },
    Descendant { generations: u32 },
    Sibling { kind: SiblingKind },
    AuntUncle { generations: u32 },
    NieceNephew { generations: u32 },
    Cousin { degree: u32, removed: u32 },
}

/// Label plus the civil-law degree of consanguinity (`depth_a + depth_b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub label: RelationshipLabel,
    pub degree: u32,
}

/// Classify from depths alone.
pub fn classify(depth_a: u32, depth_b: u32) -> Classification {
    let label = match (depth_a, depth_b) {
        (0, 0) => RelationshipLabel::SelfRelation,
        (n, 0) => RelationshipLabel::Ancestor { generations: n },
        (0, n) => RelationshipLabel::Descendant { generations: n },
        (1, 1) => RelationshipLabel::Sibling { kind: SiblingKind::Unspecified },
        (a, b) if a == b => RelationshipLabel::Cousin { degree: a - 1, removed: 0 },
        (a, 1) => RelationshipLabel::AuntUncle { generations: a - 1 },
        (1, b) => RelationshipLabel::NieceNephew { generations: b - 1 },
        (a, b) => RelationshipLabel::Cousin {
            degree: a.min(b) - 1,
            removed: a.abs_diff(b),
        },
    };
    Classification { label, degree: depth_a + depth_b }
}

/// Classify, settling full vs half siblings from the shared ancestry.
///
/// Only a couple among the common ancestors makes a full sibling.
pub fn classify_shared(depth_a: u32, depth_b: u32, shared: SharedAncestry) -> Classification {
    let mut classification = classify(depth_a, depth_b);
    if let RelationshipLabel::Sibling { kind } = &mut classification.label {
        *kind = match shared {
            SharedAncestry::Couple => SiblingKind::Full,
            SharedAncestry::Single | SharedAncestry::Unpaired => SiblingKind::Half,
        };
    }
    classification
}

impl RelationshipLabel {
    /// The same relationship seen from the other person.
    pub fn inverse(self) -> Self {
        match self {
            RelationshipLabel::Ancestor { generations } => RelationshipLabel::Descendant { generations },
            RelationshipLabel::Descendant { generations } => RelationshipLabel::Ancestor { generations },
            RelationshipLabel::AuntUncle { generations } => RelationshipLabel::NieceNephew { generations },
            RelationshipLabel::NieceNephew { generations } => RelationshipLabel::AuntUncle { generations },
            RelationshipLabel::SelfRelation
            | RelationshipLabel::Sibling { .. }
            | RelationshipLabel::Cousin { .. } => self,
        }
    }

    /// Whether the label reads the same from both sides.
    pub fn is_symmetric(self) -> bool {
        self.inverse() == self
    }
}

impl Classification {
    pub fn inverse(self) -> Self {
        Self { label: self.label.inverse(), degree: self.degree }
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl fmt::Display for RelationshipLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RelationshipLabel::SelfRelation => f.write_str("self"),
            RelationshipLabel::Ancestor { generations } => lineal(f, generations, "parent"),
            RelationshipLabel::Descendant { generations } => lineal(f, generations, "child"),
            RelationshipLabel::Sibling { kind: SiblingKind::Full } => f.write_str("full sibling"),
            RelationshipLabel::Sibling { kind: SiblingKind::Half } => f.write_str("half sibling"),
            RelationshipLabel::Sibling { kind: SiblingKind::Unspecified } => f.write_str("sibling"),
            RelationshipLabel::AuntUncle { generations } => collateral(f, generations, "aunt", "uncle"),
            RelationshipLabel::NieceNephew { generations } => collateral(f, generations, "niece", "nephew"),
            RelationshipLabel::Cousin { degree, removed } => {
                write!(f, "{} cousin", ordinal_word(degree))?;
                match removed {
                    0 => Ok(()),
                    1 => f.write_str(" once removed"),
                    2 => f.write_str(" twice removed"),
                    n => write!(f, " {n} times removed"),
                }
            }
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (degree {})", self.label, self.degree)
    }
}

/// parent, grandparent, great-grandparent, 2nd great-grandparent, ...
fn lineal(f: &mut fmt::Formatter<'_>, generations: u32, base: &str) -> fmt::Result {
    match generations {
        0 => f.write_str("self"),
        1 => f.write_str(base),
        2 => write!(f, "grand{base}"),
        3 => write!(f, "great-grand{base}"),
        n => write!(f, "{} great-grand{base}", ordinal(n - 2)),
    }
}

/// aunt/uncle, grandaunt/granduncle, great-grandaunt/granduncle, ...
fn collateral(f: &mut fmt::Formatter<'_>, generations: u32, female: &str, male: &str) -> fmt::Result {
    match generations {
        0 | 1 => write!(f, "{female}/{male}"),
        2 => write!(f, "grand{female}/grand{male}"),
        3 => write!(f, "great-grand{female}/great-grand{male}"),
        n => {
            let prefix = ordinal(n - 2);
            write!(f, "{prefix} great-grand{female}/{prefix} great-grand{male}")
        }
    }
}

fn ordinal_word(n: u32) -> String {
    const WORDS: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth",
        "sixth", "seventh", "eighth", "ninth", "tenth",
    ];
    match n {
        1..=10 => WORDS[(n - 1) as usize].to_string(),
        _ => ordinal(n),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
