//! # Genealogy Graph Model
//!
//! Clean DTOs for people, typed relationship edges, traversal results and
//! layout positions. These types cross every boundary:
//! repository ↔ graph model ↔ traversal ↔ layout ↔ caller.
//!
//! Design rule: this module is pure data with no I/O and no async.

pub mod person;
pub mod relationship;
pub mod result;
pub mod layout;

pub use person::{Person, PersonId, PersonNode};
pub use relationship::{Certainty, ParentalKind, RelationshipEdge, RelationshipKind};
pub use result::{
    GraphWarning, Lineage, MalformedReason, PathDirection, TraversalEntry, TraversalResult,
};
pub use layout::LayoutPosition;
