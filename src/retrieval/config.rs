//! Retrieval and batch configuration

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RetrievalError};
use crate::pcst::{EdgeCostModel, PruningStrategy};
use crate::scoring::SimilarityMetric;

/// Options for a single retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Max nodes eligible for a positive prize
    pub topk_nodes: usize,
    /// Max edges eligible for a positive prize; 0 disables edge prizes
    pub topk_edges: usize,
    pub edge_cost_model: EdgeCostModel,
    /// Scales the cost derived from `edge_cost_model`
    pub node_cost_multiplier: f64,
    pub max_output_nodes: usize,
    pub max_output_edges: usize,
    pub enforce_connectivity: bool,
    pub virtual_root_cost: f64,
    pub similarity: SimilarityMetric,
    pub pruning: PruningStrategy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            topk_nodes: 3,
            topk_edges: 3,
            edge_cost_model: EdgeCostModel::default(),
            node_cost_multiplier: 1.0,
            max_output_nodes: 100,
            max_output_edges: 200,
            enforce_connectivity: true,
            virtual_root_cost: 1.0e6,
            similarity: SimilarityMetric::default(),
            pruning: PruningStrategy::default(),
        }
    }
}

impl RetrievalConfig {
    /// Reject configurations no query could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.topk_nodes == 0 {
            return Err(RetrievalError::InvalidConfig(
                "topk_nodes must be positive".to_string(),
            ));
        }
        if self.enforce_connectivity && self.max_output_nodes < 1 {
            return Err(RetrievalError::InvalidConfig(
                "max_output_nodes must be at least 1 when connectivity is enforced".to_string(),
            ));
        }
        if !self.node_cost_multiplier.is_finite() || self.node_cost_multiplier < 0.0 {
            return Err(RetrievalError::InvalidConfig(format!(
                "node_cost_multiplier must be finite and non-negative, got {}",
                self.node_cost_multiplier
            )));
        }
        if let EdgeCostModel::Constant { cost } = self.edge_cost_model {
            if !cost.is_finite() || cost < 0.0 {
                return Err(RetrievalError::InvalidConfig(format!(
                    "constant edge cost must be finite and non-negative, got {}",
                    cost
                )));
            }
        }
        if !self.virtual_root_cost.is_finite() || self.virtual_root_cost < 0.0 {
            return Err(RetrievalError::InvalidConfig(format!(
                "virtual_root_cost must be finite and non-negative, got {}",
                self.virtual_root_cost
            )));
        }
        Ok(())
    }
}

/// Worker pool options for batched retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub workers: usize,
    /// Per-query wall-clock bound
    pub timeout_ms: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            timeout_ms: None,
        }
    }
}

impl BatchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// At least one worker
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topk_nodes, 3);
        assert!(config.enforce_connectivity);
    }

    #[test]
    fn test_zero_topk_rejected() {
        let config = RetrievalConfig {
            topk_nodes: 0,
            ..RetrievalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_node_cap_needs_connectivity_off() {
        let mut config = RetrievalConfig {
            max_output_nodes: 0,
            ..RetrievalConfig::default()
        };
        assert!(config.validate().is_err());
        config.enforce_connectivity = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_costs_rejected() {
        let config = RetrievalConfig {
            edge_cost_model: EdgeCostModel::Constant { cost: -1.0 },
            ..RetrievalConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RetrievalConfig {
            node_cost_multiplier: f64::NAN,
            ..RetrievalConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RetrievalConfig =
            serde_json::from_str(r#"{"topk_nodes": 5, "pruning": "simple"}"#).unwrap();
        assert_eq!(config.topk_nodes, 5);
        assert_eq!(config.pruning, PruningStrategy::Simple);
        assert_eq!(config.max_output_edges, 200);
    }

    #[test]
    fn test_batch_workers_floor() {
        let batch = BatchConfig::default().with_workers(0);
        assert_eq!(batch.effective_workers(), 1);
        assert!(BatchConfig::default().workers >= 1);
    }
}
