//! Static table validation and weighted selection.
//!
//! Every table the simulation draws from (archetype weights, effect weights,
//! pickup weights) is validated once when the session is built. A bad table is
//! a startup failure, never a mid-run one.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use thiserror::Error;

/// Invalid static configuration. Fatal at session construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weight table `{table}` is empty")]
    EmptyTable { table: &'static str },
    #[error("weight table `{table}` contains invalid weight {weight}")]
    InvalidWeight { table: &'static str, weight: f32 },
    #[error("weight table `{table}` has no positive weight")]
    ZeroTotalWeight { table: &'static str },
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("boss wave interval must be at least 1")]
    ZeroBossInterval,
    #[error("spawn region `{field}` has zero area")]
    DegenerateRegion { field: &'static str },
}

/// Fails with [`ConfigError::NonPositive`] unless `value` is finite and > 0.
pub fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// A fixed set of choices with relative weights, validated up front.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    items: Vec<T>,
    index: WeightedIndex<f32>,
}

impl<T: Copy> WeightedTable<T> {
    /// Builds a table from `(item, weight)` pairs.
    ///
    /// Weights must be finite and non-negative with at least one positive entry.
    pub fn new(table: &'static str, entries: &[(T, f32)]) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyTable { table });
        }
        if let Some(&(_, weight)) = entries
            .iter()
            .find(|(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(ConfigError::InvalidWeight { table, weight });
        }
        let index = WeightedIndex::new(entries.iter().map(|(_, w)| *w))
            .map_err(|_| ConfigError::ZeroTotalWeight { table })?;
        Ok(Self {
            items: entries.iter().map(|(item, _)| *item).collect(),
            index,
        })
    }

    /// Draws one item according to the weights.
    pub fn pick(&self, rng: &mut impl Rng) -> T {
        self.items[self.index.sample(rng)]
    }

    /// All items in declaration order.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
