//! Weighted-threshold interneuron
//!
//! Models a simple excitatory reflex interneuron: it fires with the weighted
//! sum of its afferents once that sum strictly exceeds the firing threshold,
//! and is silent otherwise. There is no membrane state; each solver query is
//! evaluated from the afferents alone.

use crate::core::config::InterneuronConfig;
use crate::core::error::{ReflexError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Interneuron {
    weights: Vec<f64>,
    threshold: f64,
}

impl Interneuron {
    /// Build for a fixed number of connected afferents.
    ///
    /// The weight count is checked here, once, so `evaluate` never has to.
    pub fn new(config: &InterneuronConfig, afferent_count: usize) -> Result<Self> {
        if config.weights.len() != afferent_count {
            return Err(ReflexError::WeightCountMismatch {
                expected: afferent_count,
                found: config.weights.len(),
            });
        }
        Ok(Self {
            weights: config.weights.clone(),
            threshold: config.threshold,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// A threshold below machine epsilon never gates the output
    pub fn always_fires(&self) -> bool {
        self.threshold < f64::EPSILON
    }

    pub fn weighted_sum(&self, afferents: &[f64]) -> f64 {
        debug_assert_eq!(afferents.len(), self.weights.len());
        self.weights
            .iter()
            .zip(afferents)
            .map(|(w, a)| w * a)
            .sum()
    }

    /// Weighted sum if it exceeds the threshold, otherwise 0
    pub fn evaluate(&self, afferents: &[f64]) -> f64 {
        let sum = self.weighted_sum(afferents);
        if self.always_fires() || sum > self.threshold {
            sum
        } else {
            0.0
        }
    }
}
