//! Person records and their graph-facing view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque person identifier.
///
/// The natural ordering is part of the contract: every deterministic
/// tie-break in traversal and layout falls back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(raw: u64) -> Self {
        PersonId(raw)
    }
}

/// A person as returned by the Person Repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub display_name: Option<String>,
    pub is_living: bool,
    pub birth_date: Option<NaiveDate>,
}

impl Person {
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            is_living: false,
            birth_date: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn living(mut self, is_living: bool) -> Self {
        self.is_living = is_living;
        self
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }
}

/// A person as seen by one traversal or layout pass.
///
/// Built fresh per request; `generation_hint` is only filled in by layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonNode {
    pub id: PersonId,
    pub generation_hint: Option<i32>,
    pub is_living: bool,
    pub birth_date: Option<NaiveDate>,
}

impl PersonNode {
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            generation_hint: None,
            is_living: false,
            birth_date: None,
        }
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }
}

impl From<&Person> for PersonNode {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            generation_hint: None,
            is_living: person.is_living,
            birth_date: person.birth_date,
        }
    }
}
