//! Route observations and observation spaces
//!
//! A route observation is a per-action feature matrix: one row per action
//! index, with a designated column flagging which actions are currently
//! accessible (not yet visited, within capacity). The agent's exploration
//! branch samples only from that feasibility column.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Number of feature columns per action row
pub const FEATURE_COLS: usize = 3;

/// Column index of the feasibility flag
pub const FEASIBLE_COL: usize = 1;

/// Observation of the routing state: one feature row per action index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteObservation {
    /// Feature matrix of shape `[num_actions, FEATURE_COLS]`
    pub features: Array2<f32>,
}

impl RouteObservation {
    /// Create an observation from a feature matrix.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the matrix does not have
    /// `FEATURE_COLS` columns.
    pub fn new(features: Array2<f32>) -> crate::Result<Self> {
        if features.ncols() != FEATURE_COLS {
            return Err(crate::RlError::DimensionMismatch {
                expected: FEATURE_COLS,
                actual: features.ncols(),
            });
        }
        Ok(Self { features })
    }

    /// Number of action rows in this observation
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.features.nrows()
    }

    /// Flattened dimension of the network input
    #[must_use]
    pub fn dim(&self) -> usize {
        self.features.len()
    }

    /// Indices of actions whose feasibility entry is non-zero
    #[must_use]
    pub fn accessible(&self) -> Vec<usize> {
        self.features
            .column(FEASIBLE_COL)
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag != 0.0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Row-major flattened feature vector, the network input
    #[must_use]
    pub fn flat(&self) -> Array1<f32> {
        Array1::from_iter(self.features.iter().copied())
    }
}

/// Observation space: a fixed number of action rows
#[derive(Debug, Clone)]
pub struct RouteObservationSpace {
    /// Number of action rows per observation
    pub num_actions: usize,
}

impl RouteObservationSpace {
    /// Create a new observation space
    #[must_use]
    pub fn new(num_actions: usize) -> Self {
        Self { num_actions }
    }

    /// Shape of observations in this space
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_actions, FEATURE_COLS)
    }

    /// Flattened dimension of network inputs built from this space
    #[must_use]
    pub fn dim(&self) -> usize {
        self.num_actions * FEATURE_COLS
    }

    /// Check if an observation belongs to this space
    #[must_use]
    pub fn contains(&self, obs: &RouteObservation) -> bool {
        obs.features.dim() == self.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn accessible_reads_feasibility_column() {
        let obs = RouteObservation::new(arr2(&[
            [3.0, 1.0, 1.0],
            [5.0, 0.0, 1.0],
            [2.0, 1.0, 0.0],
        ]))
        .unwrap();
        assert_eq!(obs.accessible(), vec![0, 2]);
    }

    #[test]
    fn flat_is_row_major() {
        let obs = RouteObservation::new(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])).unwrap();
        assert_eq!(obs.flat().to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(obs.dim(), 6);
    }

    #[test]
    fn wrong_column_count_is_rejected() {
        let err = RouteObservation::new(Array2::zeros((4, 2))).unwrap_err();
        assert!(matches!(
            err,
            crate::RlError::DimensionMismatch { expected: FEATURE_COLS, actual: 2 }
        ));
    }
}
