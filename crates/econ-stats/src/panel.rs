//! Country-by-year indicator panel
//!
//! A [`Panel`] is a rectangular entity × period matrix. Every entity shares
//! the same ascending period vector and missing observations are `None`.
//! Panels are immutable once built; [`Panel::slice`] produces a new panel.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, StatsError};

/// Unique key of a panel row (a country name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Immutable entity × period matrix with explicit missing markers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    periods: Vec<i32>,
    entities: Vec<EntityKey>,
    rows: Vec<Vec<Option<f64>>>,
    #[serde(skip)]
    index: HashMap<EntityKey, usize>,
}

impl Panel {
    /// Start building a panel over the given ascending periods
    pub fn builder(periods: impl Into<Vec<i32>>) -> PanelBuilder {
        PanelBuilder {
            periods: periods.into(),
            entities: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Ordered period labels shared by every entity
    pub fn periods(&self) -> &[i32] {
        &self.periods
    }

    /// Entity keys in insertion order
    pub fn entities(&self) -> &[EntityKey] {
        &self.entities
    }

    pub fn n_entities(&self) -> usize {
        self.entities.len()
    }

    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.index.contains_key(entity)
    }

    /// Row of one entity; an absent key is a contract violation
    pub fn series(&self, entity: &str) -> Result<&[Option<f64>]> {
        self.index
            .get(entity)
            .map(|&i| self.rows[i].as_slice())
            .ok_or_else(|| StatsError::UnknownEntity(entity.to_string()))
    }

    /// Iterate `(entity, row)` pairs in panel order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &[Option<f64>])> {
        self.entities
            .iter()
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Restrict to `entities` (in the given order) and the closed period range `[start, end]`
    pub fn slice<S: AsRef<str>>(&self, entities: &[S], start: i32, end: i32) -> Result<Panel> {
        if start > end {
            return Err(StatsError::InvalidPeriodRange { start, end });
        }

        let columns: Vec<usize> = self
            .periods
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p >= start && p <= end)
            .map(|(i, _)| i)
            .collect();
        if columns.is_empty() {
            return Err(StatsError::InvalidPeriodRange { start, end });
        }

        let periods: Vec<i32> = columns.iter().map(|&c| self.periods[c]).collect();
        let mut builder = Panel::builder(periods);
        for entity in entities {
            let key = entity.as_ref();
            let row = self.series(key)?;
            builder = builder.entity(key, columns.iter().map(|&c| row[c]))?;
        }

        tracing::debug!(
            entities = entities.len(),
            start,
            end,
            "sliced panel"
        );
        builder.build()
    }

    /// Check that `other` has the same entity set and the same periods
    pub(crate) fn ensure_aligned(&self, other: &Panel) -> Result<()> {
        if self.periods != other.periods {
            return Err(StatsError::ShapeMismatch(format!(
                "period vectors differ ({} vs {} periods)",
                self.periods.len(),
                other.periods.len()
            )));
        }
        if self.entities.len() != other.entities.len() {
            return Err(StatsError::ShapeMismatch(format!(
                "entity counts differ ({} vs {})",
                self.entities.len(),
                other.entities.len()
            )));
        }
        if let Some(missing) = self.entities.iter().find(|e| !other.contains(e.as_str())) {
            return Err(StatsError::ShapeMismatch(format!(
                "entity {missing} is absent from the second panel"
            )));
        }
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entities
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, key)| (key, i))
            .collect();
    }
}

/// Builder for [`Panel`]
#[derive(Debug)]
pub struct PanelBuilder {
    periods: Vec<i32>,
    entities: Vec<EntityKey>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PanelBuilder {
    /// Append an entity row; NaN cells are normalised to missing
    pub fn entity<I>(mut self, key: impl Into<EntityKey>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let key = key.into();
        if self.entities.contains(&key) {
            return Err(StatsError::DuplicateEntity(key.to_string()));
        }

        let row: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        if row.len() != self.periods.len() {
            return Err(StatsError::ShapeMismatch(format!(
                "row for {key} has {} values but the panel has {} periods",
                row.len(),
                self.periods.len()
            )));
        }

        self.entities.push(key);
        self.rows.push(row);
        Ok(self)
    }

    /// Append a fully observed row
    pub fn dense(self, key: impl Into<EntityKey>, values: &[f64]) -> Result<Self> {
        self.entity(key, values.iter().map(|&v| Some(v)))
    }

    pub fn build(self) -> Result<Panel> {
        if self.periods.windows(2).any(|w| w[0] >= w[1]) {
            return Err(StatsError::ShapeMismatch(
                "periods must be strictly ascending".to_string(),
            ));
        }

        let mut panel = Panel {
            periods: self.periods,
            entities: self.entities,
            rows: self.rows,
            index: HashMap::new(),
        };
        panel.rebuild_index();
        Ok(panel)
    }
}
