//! Adapter configuration.

use crate::types::IndexStyle;
use serde::{Deserialize, Serialize};

/// Ceiling on any single dimension, guarding slice construction from raw sizes.
pub const DEFAULT_MAX_PROBLEM_SIZE: usize = 10_000_000;

/// Construction-time settings. Missing fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Base of sparse coordinates reported to the optimizer.
    pub index_style: IndexStyle,
    /// Largest accepted n, m or nonzero count.
    pub max_problem_size: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            index_style: IndexStyle::Zero,
            max_problem_size: DEFAULT_MAX_PROBLEM_SIZE,
        }
    }
}

impl AdapterConfig {
    pub fn with_index_style(mut self, index_style: IndexStyle) -> Self {
        self.index_style = index_style;
        self
    }

    pub fn with_max_problem_size(mut self, max_problem_size: usize) -> Self {
        self.max_problem_size = max_problem_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.index_style, IndexStyle::Zero);
        assert_eq!(config.max_problem_size, DEFAULT_MAX_PROBLEM_SIZE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AdapterConfig = serde_json::from_str(r#"{ "index_style": "one" }"#).unwrap();
        assert_eq!(config.index_style, IndexStyle::One);
        assert_eq!(config.max_problem_size, DEFAULT_MAX_PROBLEM_SIZE);
    }

    #[test]
    fn test_unknown_index_style_rejected() {
        let result: Result<AdapterConfig, _> = serde_json::from_str(r#"{ "index_style": "two" }"#);
        assert!(result.is_err());
    }
}
