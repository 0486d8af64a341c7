//! Discrete actions and action spaces

use serde::{Deserialize, Serialize};

/// Index into the environment's routing action space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteAction(pub usize);

impl DiscreteAction {
    /// Get the raw action index
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Discrete action space
#[derive(Debug, Clone)]
pub struct DiscreteSpace {
    /// Number of discrete actions
    pub n: usize,
}

impl DiscreteSpace {
    /// Create a new discrete action space
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Sample a random action from the space
    #[must_use]
    pub fn sample(&self) -> DiscreteAction {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        DiscreteAction(rng.gen_range(0..self.n))
    }

    /// Check if an action is valid within this space
    #[must_use]
    pub fn contains(&self, action: &DiscreteAction) -> bool {
        action.0 < self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_in_space() {
        let space = DiscreteSpace::new(7);
        for _ in 0..100 {
            assert!(space.contains(&space.sample()));
        }
    }
}
