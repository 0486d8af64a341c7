//! Experience replay memory
//!
//! Fixed-capacity ring: a pre-sized arena plus a write cursor. Pushing
//! past capacity silently overwrites the oldest entry; sampling draws
//! uniformly without replacement.

use rand::seq::SliceRandom;

use lvrp_rl_core::{Result, RlError, Transition};

/// Ring buffer of transitions sampled for training
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    slots: Vec<Transition>,
    capacity: usize,
    cursor: usize,
}

impl ReplayMemory {
    /// Create a replay memory holding at most `capacity` transitions.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    /// Save a transition, evicting the oldest once at capacity.
    pub fn push(&mut self, transition: Transition) {
        if self.slots.len() < self.capacity {
            self.slots.push(transition);
        } else {
            self.slots[self.cursor] = transition;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Sample `batch_size` distinct transitions uniformly at random.
    ///
    /// # Errors
    /// Returns `InsufficientData` if fewer transitions are stored;
    /// never partially samples.
    pub fn sample(&self, batch_size: usize) -> Result<Vec<&Transition>> {
        if self.slots.len() < batch_size {
            return Err(RlError::InsufficientData {
                requested: batch_size,
                available: self.slots.len(),
            });
        }
        let mut rng = rand::thread_rng();
        let indices: Vec<usize> = (0..self.slots.len()).collect();
        Ok(indices
            .choose_multiple(&mut rng, batch_size)
            .map(|&i| &self.slots[i])
            .collect())
    }

    /// Current occupied count
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the memory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of transitions held
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
