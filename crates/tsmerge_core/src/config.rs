//! Selector configuration.

use crate::error::{MergeError, MergeResult};
use crate::selector::CostModel;

/// Configuration for one file selector.
///
/// Every knob that shapes a selection is passed in explicitly, so selection
/// stays a function of its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Maximum estimated memory cost of one merge cycle, in bytes.
    pub budget: u64,

    /// Maximum number of unsequential files folded in one merge cycle.
    pub max_unseq_files: usize,

    /// Cost model used to price candidate files.
    pub cost_model: CostModel,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            budget: 500 * 1024 * 1024, // 500 MB
            max_unseq_files: 100,
            cost_model: CostModel::default(),
        }
    }
}

impl SelectorConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with neither a budget nor a cap.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            budget: u64::MAX,
            max_unseq_files: usize::MAX,
            cost_model: CostModel::default(),
        }
    }

    /// Sets the memory budget per merge cycle.
    #[must_use]
    pub const fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the maximum number of unsequential files per merge cycle.
    #[must_use]
    pub const fn with_max_unseq_files(mut self, max: usize) -> Self {
        self.max_unseq_files = max;
        self
    }

    /// Sets the cost model.
    #[must_use]
    pub const fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidConfig`] if the cost model prices every
    /// file at zero, which would make the budget meaningless.
    pub fn validate(&self) -> MergeResult<()> {
        if self.cost_model.is_zero() {
            return Err(MergeError::invalid_config(
                "cost model coefficients are all zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SelectorConfig::default();
        assert_eq!(config.budget, 500 * 1024 * 1024);
        assert_eq!(config.max_unseq_files, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = SelectorConfig::new()
            .with_budget(1024)
            .with_max_unseq_files(3)
            .with_cost_model(CostModel::new().with_chunk_cost(1));

        assert_eq!(config.budget, 1024);
        assert_eq!(config.max_unseq_files, 3);
        assert_eq!(config.cost_model.chunk_cost, 1);
    }

    #[test]
    fn zero_cost_model_rejected() {
        let zero = CostModel::new()
            .with_file_overhead(0)
            .with_device_overhead(0)
            .with_chunk_cost(0);
        let config = SelectorConfig::new().with_cost_model(zero);
        assert!(matches!(
            config.validate(),
            Err(MergeError::InvalidConfig { .. })
        ));
    }
}
