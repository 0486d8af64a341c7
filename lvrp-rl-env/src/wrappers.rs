//! Environment wrappers

use async_trait::async_trait;

use lvrp_rl_core::{
    DiscreteAction, DiscreteSpace, Environment, Result, RouteObservation, RouteObservationSpace,
    Step,
};

/// Wrapper that truncates episodes after a fixed number of steps
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    limit: usize,
    elapsed: usize,
}

impl<E> TimeLimit<E> {
    /// Wrap an environment with a step limit
    pub fn new(env: E, limit: usize) -> Self {
        Self {
            env,
            limit,
            elapsed: 0,
        }
    }
}

#[async_trait]
impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    fn observation_space(&self) -> RouteObservationSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DiscreteSpace {
        self.env.action_space()
    }

    async fn reset(&mut self) -> Result<RouteObservation> {
        self.elapsed = 0;
        self.env.reset().await
    }

    async fn step(&mut self, action: DiscreteAction) -> Result<Step> {
        let mut step = self.env.step(action).await?;
        self.elapsed += 1;
        if self.elapsed >= self.limit && !step.done {
            step.truncated = true;
        }
        Ok(step)
    }
}
