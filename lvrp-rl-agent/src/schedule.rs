//! Decay schedules for exploration

/// Trait for schedules (e.g., for epsilon decay)
pub trait Schedule: Send + Sync {
    /// Get value at step t
    fn value(&self, t: usize) -> f64;
}

/// Exponential decay toward a floor: `end + (start - end) * exp(-t / decay)`.
///
/// Never reaches `end`, so exploration persists for any finite step.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    /// Value at step 0
    pub start: f64,
    /// Asymptotic floor
    pub end: f64,
    /// Decay time constant, in steps
    pub decay: f64,
}

impl ExponentialDecay {
    /// Create a new exponential decay schedule
    #[must_use]
    pub fn new(start: f64, end: f64, decay: f64) -> Self {
        Self { start, end, decay }
    }
}

impl Schedule for ExponentialDecay {
    fn value(&self, t: usize) -> f64 {
        self.end + (self.start - self.end) * (-(t as f64) / self.decay).exp()
    }
}
