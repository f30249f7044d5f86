//! Error types for panel analysis operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::statistic::Undefined;

/// Panel analysis errors
///
/// Structural variants (`ShapeMismatch`, `InvalidWindow`, `UnknownEntity`,
/// `DuplicateEntity`, `InvalidPeriodRange`, `Config`) abort a whole call.
/// `InsufficientData` and `UndefinedStatistic` are scoped to one entity and
/// end up in that entity's slot of a [`BatchResult`](crate::BatchResult).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum StatsError {
    /// Inputs are not aligned in entities, periods or lengths
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Rolling window outside `1..=len`
    #[error("Invalid window {window} for series of length {len}")]
    InvalidWindow { window: usize, len: usize },

    /// Too few usable observations for one entity
    #[error("Insufficient data for {entity}: {reason}")]
    InsufficientData { entity: String, reason: String },

    /// Result for one entity is mathematically undefined
    #[error("Undefined statistic for {entity}: {reason}")]
    UndefinedStatistic { entity: String, reason: Undefined },

    /// Entity key not present in the panel
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Entity key inserted twice into a panel
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    /// Period range is inverted or selects no periods
    #[error("Invalid period range {start}..={end}")]
    InvalidPeriodRange { start: i32, end: i32 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StatsError {
    pub(crate) fn insufficient(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is scoped to a single entity rather than the call
    pub fn is_entity_scoped(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::UndefinedStatistic { .. }
        )
    }
}

/// Result type alias for panel analysis
pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StatsError::InvalidWindow { window: 7, len: 5 };
        assert_eq!(err.to_string(), "Invalid window 7 for series of length 5");

        let err = StatsError::insufficient("Ireland", "series is entirely missing");
        assert_eq!(
            err.to_string(),
            "Insufficient data for Ireland: series is entirely missing"
        );

        let err = StatsError::UndefinedStatistic {
            entity: "Japan".to_string(),
            reason: Undefined::ZeroVariance,
        };
        assert_eq!(err.to_string(), "Undefined statistic for Japan: zero variance");
    }

    #[test]
    fn test_entity_scope() {
        assert!(StatsError::insufficient("China", "empty").is_entity_scoped());
        assert!(!StatsError::ShapeMismatch("rows".to_string()).is_entity_scoped());
        assert!(!StatsError::UnknownEntity("Atlantis".to_string()).is_entity_scoped());
    }
}
