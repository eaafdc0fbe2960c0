//! Layout output.

use serde::{Deserialize, Serialize};
use super::PersonId;

/// Where one person lands in the rendered tree.
///
/// `generation` may be negative when the layout is anchored on a focus
/// person and this person sits above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPosition {
    pub person_id: PersonId,
    pub generation: i32,
    pub x: f64,
    pub y: f64,
}
