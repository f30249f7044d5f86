//! Per-entity result collection
//!
//! Every analyzer returns a [`BatchResult`]: one slot per entity holding
//! either the typed result or the error that was isolated to that entity.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};
use crate::panel::EntityKey;

/// Ordered per-entity outcomes of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult<T> {
    entries: Vec<(EntityKey, Result<T>)>,
}

impl<T> BatchResult<T> {
    pub fn from_entries(entries: Vec<(EntityKey, Result<T>)>) -> Self {
        Self { entries }
    }

    /// Outcome for one entity, `None` if the entity was not part of the call
    pub fn get(&self, entity: &str) -> Option<&Result<T>> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_str() == entity)
            .map(|(_, outcome)| outcome)
    }

    /// Successful value for one entity
    pub fn value(&self, entity: &str) -> Option<&T> {
        self.get(entity).and_then(|outcome| outcome.as_ref().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &Result<T>)> {
        self.entries.iter().map(|(key, outcome)| (key, outcome))
    }

    pub fn successes(&self) -> impl Iterator<Item = (&EntityKey, &T)> {
        self.entries
            .iter()
            .filter_map(|(key, outcome)| outcome.as_ref().ok().map(|v| (key, v)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&EntityKey, &StatsError)> {
        self.entries
            .iter()
            .filter_map(|(key, outcome)| outcome.as_ref().err().map(|e| (key, e)))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no entity failed
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, outcome)| outcome.is_ok())
    }

    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.successes().count() as f64 / self.entries.len() as f64
    }

    pub fn into_entries(self) -> Vec<(EntityKey, Result<T>)> {
        self.entries
    }
}

impl<T> IntoIterator for BatchResult<T> {
    type Item = (EntityKey, Result<T>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Run `task` once per entity, isolating failures to their slot.
///
/// Output order follows `items` regardless of scheduling.
pub(crate) fn run_per_entity<I, T, F>(items: Vec<(EntityKey, I)>, parallel: bool, task: F) -> BatchResult<T>
where
    I: Send,
    T: Send,
    F: Fn(&EntityKey, I) -> Result<T> + Sync,
{
    let run = |(key, input): (EntityKey, I)| {
        let outcome = task(&key, input);
        if let Err(e) = &outcome {
            tracing::debug!(entity = %key, error = %e, "entity analysis failed");
        }
        (key, outcome)
    };

    let entries: Vec<(EntityKey, Result<T>)> = if parallel {
        items.into_par_iter().map(run).collect()
    } else {
        items.into_iter().map(run).collect()
    };

    BatchResult::from_entries(entries)
}
