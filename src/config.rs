//! Engine configuration.
//!
//! Depth bounds, the default visit budget and layout spacing. Everything is
//! `#[serde(default)]`, so a partial JSON document overrides only the keys
//! it names.

use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Configuration for a [`Kinship`](crate::Kinship) handle.
///
/// # Examples
///
/// ```
/// use kinship::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.lateral_depth_cap, 3);
///
/// let config = EngineConfig::from_json_str(r#"{"lateral_depth_cap": 2}"#).unwrap();
/// assert_eq!(config.lateral_depth_cap, 2);
/// assert_eq!(config.default_max_depth, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Depth used by callers that do not specify one.
    /// Default: 5
    pub default_max_depth: u32,

    /// Hard cap on `lateral` depth; collateral search fans out fast.
    /// Default: 3
    pub lateral_depth_cap: u32,

    /// Safety limit standing in for "unbounded" in full-tree traversal.
    /// Default: 64
    pub max_traversal_depth: u32,

    /// Budget applied when an operation is called without one.
    /// Default: 10 000 visits, no deadline
    pub default_budget: VisitBudget,

    pub layout: LayoutConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_depth: 5,
            lateral_depth_cap: 3,
            max_traversal_depth: 64,
            default_budget: VisitBudget::visits(10_000),
            layout: LayoutConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lateral_depth_cap == 0 {
            return Err(Error::Config("lateral_depth_cap must be at least 1".into()));
        }
        if self.max_traversal_depth == 0 {
            return Err(Error::Config("max_traversal_depth must be at least 1".into()));
        }
        self.layout.validate()
    }
}

/// Fixed spacing units for layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between neighbouring nodes in a row; also the
    /// minimum separation guaranteed within a generation.
    pub node_spacing: f64,
    /// Vertical distance between generation rows.
    pub generation_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 120.0,
            generation_spacing: 100.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.node_spacing.is_finite() && self.node_spacing > 0.0) {
            return Err(Error::Config(format!("node_spacing must be positive, got {}", self.node_spacing)));
        }
        if !(self.generation_spacing.is_finite() && self.generation_spacing > 0.0) {
            return Err(Error::Config(format!(
                "generation_spacing must be positive, got {}",
                self.generation_spacing
            )));
        }
        Ok(())
    }
}

/// Caller-supplied bound on how much work one traversal may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitBudget {
    /// Maximum number of people admitted into results.
    pub max_visits: Option<usize>,
    /// Wall-clock cut-off. Not serializable; set it in code.
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl VisitBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn visits(max_visits: usize) -> Self {
        Self { max_visits: Some(max_visits), deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }
}

/// Running budget for one request.
///
/// Shared by every traversal phase of the request and latches
/// `truncated` on the first refusal.
#[derive(Debug)]
pub struct BudgetTracker {
    budget: VisitBudget,
    admitted: usize,
    truncated: bool,
}

impl BudgetTracker {
    pub fn new(budget: VisitBudget) -> Self {
        Self { budget, admitted: 0, truncated: false }
    }

    /// Claim one visit. Returns false once the budget is spent.
    pub fn try_admit(&mut self) -> bool {
        if self.truncated {
            return false;
        }
        if self.budget.max_visits.is_some_and(|max| self.admitted >= max) || self.deadline_passed() {
            self.truncated = true;
            return false;
        }
        self.admitted += 1;
        true
    }

    /// Check the deadline without claiming a visit.
    pub fn check_deadline(&mut self) -> bool {
        if self.deadline_passed() {
            self.truncated = true;
        }
        !self.truncated
    }

    fn deadline_passed(&self) -> bool {
        self.budget.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn admitted(&self) -> usize {
        self.admitted
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}
