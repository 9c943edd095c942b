//! Range bounds for indexed node families.
//!
//! A ranged node stands for `[lower..upper]` structurally identical
//! instances (e.g. one per relay channel). Inbound commands carry an index
//! that selects one instance; this module validates that index and turns
//! it into the [`RangeContext`] handed to input handlers.

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

/// Which member of an indexed node family a command targets.
///
/// `index` is only meaningful when `is_range` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeContext {
    pub is_range: bool,
    pub index: u16,
}

impl RangeContext {
    /// Context for a command addressed to a non-range node.
    pub fn single() -> Self {
        Self {
            is_range: false,
            index: 0,
        }
    }

    /// Context for a command addressed to instance `index` of a ranged node.
    pub fn at(index: u16) -> Self {
        Self {
            is_range: true,
            index,
        }
    }

    /// The targeted index, if this is a range context.
    pub fn index(&self) -> Option<u16> {
        self.is_range.then_some(self.index)
    }
}

/// Inclusive `[lower, upper]` bounds of a ranged node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    lower: u16,
    upper: u16,
}

impl RangeBounds {
    /// Create bounds, rejecting `lower > upper`.
    pub fn new(lower: u16, upper: u16) -> Result<Self, RangeError> {
        if lower > upper {
            return Err(RangeError::InvertedBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> u16 {
        self.lower
    }

    pub fn upper(&self) -> u16 {
        self.upper
    }

    /// Check if `index` lies within the bounds (both ends inclusive).
    pub fn contains(&self, index: u16) -> bool {
        (self.lower..=self.upper).contains(&index)
    }

    /// Number of instances in the family. Never zero.
    pub fn count(&self) -> usize {
        usize::from(self.upper - self.lower) + 1
    }

    /// All valid indices in ascending order.
    pub fn indices(&self) -> RangeInclusive<u16> {
        self.lower..=self.upper
    }

    /// Validate an inbound index and build the context for the handler.
    ///
    /// A ranged node requires an index; a missing one is as invalid as an
    /// out-of-bounds one.
    pub fn resolve(&self, index: Option<u16>) -> Result<RangeContext, RangeError> {
        let index = index.ok_or(RangeError::MissingIndex)?;
        if !self.contains(index) {
            return Err(RangeError::OutOfBounds {
                index,
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(RangeContext::at(index))
    }
}

impl fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

/// Errors raised by range declaration and index validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Range lower bound {lower} exceeds upper bound {upper}")]
    InvertedBounds { lower: u16, upper: u16 },

    #[error("Missing range index for ranged node")]
    MissingIndex,

    #[error("Range index {index} outside [{lower}, {upper}]")]
    OutOfBounds { index: u16, lower: u16, upper: u16 },
}
