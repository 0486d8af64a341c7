//! Depot/customer routing environment
//!
//! A single vehicle starts at the depot (the origin), serves customers
//! scattered over a square region and returns to the depot whenever its
//! capacity runs out. Action index `i < customers` drives to customer
//! `i`; the last action index drives back to the depot and reloads.
//! Rewards are negative travel distances, so minimizing cost is
//! maximizing return.
//!
//! The feasibility column of the observation flags unvisited customers
//! (while capacity remains) and the depot whenever the vehicle is away
//! from it. Infeasible actions are still accepted: the vehicle drives
//! there and pays the distance, it just serves nothing.

use async_trait::async_trait;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use lvrp_rl_core::{
    DiscreteAction, DiscreteSpace, Environment, Result, Reward, RlError, RouteObservation,
    RouteObservationSpace, Step, StepInfo, FEATURE_COLS,
};

/// Trace entry marking a depot visit
pub const DEPOT_TRACE: i64 = -1;

/// Geometry and capacity parameters of a routing instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LvrpConfig {
    /// Number of customer nodes
    pub customers: usize,
    /// Customers the vehicle can serve before returning to the depot
    pub capacity: usize,
    /// Half-width of the square customer coordinates are drawn from
    pub region: f64,
    /// Seed for the instance geometry
    pub seed: u64,
}

impl Default for LvrpConfig {
    fn default() -> Self {
        Self {
            customers: 10,
            capacity: 4,
            region: 100.0,
            seed: 0,
        }
    }
}

/// Logistics vehicle-routing environment
pub struct LvrpEnv {
    config: LvrpConfig,
    coords: Vec<(f64, f64)>,
    visited: Vec<bool>,
    load: usize,
    /// Current customer index; `None` means the vehicle is at the depot
    position: Option<usize>,
    trace: Vec<i64>,
    cost: f64,
    steps: usize,
}

impl LvrpEnv {
    /// Create an instance with geometry drawn from the config's seed.
    ///
    /// # Errors
    /// Returns `RlError::Environment` if the config has no customers or
    /// zero capacity.
    pub fn new(config: LvrpConfig) -> Result<Self> {
        if config.customers == 0 {
            return Err(RlError::Environment("instance needs customers".into()));
        }
        if config.capacity == 0 {
            return Err(RlError::Environment("vehicle capacity must be positive".into()));
        }
        let mut rng = StdRng::seed_from_u64(config.seed);
        let coords = (0..config.customers)
            .map(|_| {
                (
                    rng.gen_range(-config.region..config.region),
                    rng.gen_range(-config.region..config.region),
                )
            })
            .collect();
        let visited = vec![false; config.customers];
        Ok(Self {
            load: config.capacity,
            config,
            coords,
            visited,
            position: None,
            trace: Vec::new(),
            cost: 0.0,
            steps: 0,
        })
    }

    /// Action index that drives back to the depot
    #[must_use]
    pub fn depot_action(&self) -> usize {
        self.config.customers
    }

    /// Coordinates of all customers, in action-index order
    #[must_use]
    pub fn all_coord(&self) -> &[(f64, f64)] {
        &self.coords
    }

    /// Visited node indices so far, `DEPOT_TRACE` for depot returns
    #[must_use]
    pub fn trace(&self) -> &[i64] {
        &self.trace
    }

    /// Total travel cost accumulated this episode
    #[must_use]
    pub fn split_cost(&self) -> f64 {
        self.cost
    }

    fn served_all(&self) -> bool {
        self.visited.iter().all(|&v| v)
    }

    fn coord_of(&self, position: Option<usize>) -> (f64, f64) {
        position.map_or((0.0, 0.0), |idx| self.coords[idx])
    }

    fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    fn observation(&self) -> RouteObservation {
        let n = self.config.customers + 1;
        let here = self.coord_of(self.position);
        let mut features = Array2::<f32>::zeros((n, FEATURE_COLS));
        for idx in 0..self.config.customers {
            let feasible = !self.visited[idx] && self.load > 0;
            features[[idx, 0]] = Self::distance(here, self.coords[idx]) as f32;
            features[[idx, 1]] = f32::from(u8::from(feasible));
            features[[idx, 2]] = f32::from(u8::from(!self.visited[idx]));
        }
        let depot = self.config.customers;
        features[[depot, 0]] = Self::distance(here, (0.0, 0.0)) as f32;
        features[[depot, 1]] = f32::from(u8::from(self.position.is_some()));
        features[[depot, 2]] = self.load as f32 / self.config.capacity as f32;
        RouteObservation { features }
    }
}

#[async_trait]
impl Environment for LvrpEnv {
    fn observation_space(&self) -> RouteObservationSpace {
        RouteObservationSpace::new(self.config.customers + 1)
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(self.config.customers + 1)
    }

    async fn reset(&mut self) -> Result<RouteObservation> {
        self.visited.iter_mut().for_each(|v| *v = false);
        self.load = self.config.capacity;
        self.position = None;
        self.trace.clear();
        self.cost = 0.0;
        self.steps = 0;
        Ok(self.observation())
    }

    async fn step(&mut self, action: DiscreteAction) -> Result<Step> {
        let idx = action.index();
        if idx > self.config.customers {
            return Err(RlError::InvalidAction(format!(
                "action {idx} outside space of {}",
                self.config.customers + 1
            )));
        }

        let here = self.coord_of(self.position);
        let mut done = false;
        let travel;
        if idx == self.depot_action() {
            travel = Self::distance(here, (0.0, 0.0));
            self.position = None;
            self.load = self.config.capacity;
            self.trace.push(DEPOT_TRACE);
            done = self.served_all();
        } else {
            travel = Self::distance(here, self.coords[idx]);
            self.position = Some(idx);
            if !self.visited[idx] && self.load > 0 {
                self.visited[idx] = true;
                self.load -= 1;
            }
            self.trace.push(idx as i64);
        }
        self.cost += travel;
        self.steps += 1;

        Ok(Step {
            observation: self.observation(),
            reward: Reward::new(-travel),
            done,
            truncated: false,
            info: StepInfo::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_env() -> LvrpEnv {
        LvrpEnv::new(LvrpConfig {
            customers: 3,
            capacity: 2,
            region: 10.0,
            seed: 7,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn reset_marks_customers_feasible_and_depot_not() {
        let mut env = small_env();
        let obs = env.reset().await.unwrap();
        assert_eq!(obs.accessible(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn serving_a_customer_removes_it_from_the_mask() {
        let mut env = small_env();
        env.reset().await.unwrap();
        let step = env.step(DiscreteAction(1)).await.unwrap();
        let accessible = step.observation.accessible();
        assert!(!accessible.contains(&1));
        // depot becomes feasible once away from it
        assert!(accessible.contains(&env.depot_action()));
        assert!(step.reward.value() < 0.0);
    }

    #[tokio::test]
    async fn capacity_exhaustion_leaves_only_the_depot() {
        let mut env = small_env();
        env.reset().await.unwrap();
        env.step(DiscreteAction(0)).await.unwrap();
        let step = env.step(DiscreteAction(1)).await.unwrap();
        assert_eq!(step.observation.accessible(), vec![env.depot_action()]);
    }

    #[tokio::test]
    async fn full_tour_terminates_at_the_depot() {
        let mut env = small_env();
        env.reset().await.unwrap();
        let depot = env.depot_action();
        env.step(DiscreteAction(0)).await.unwrap();
        env.step(DiscreteAction(1)).await.unwrap();
        let mid = env.step(DiscreteAction(depot)).await.unwrap();
        assert!(!mid.done, "customers remain unserved");
        env.step(DiscreteAction(2)).await.unwrap();
        let last = env.step(DiscreteAction(depot)).await.unwrap();
        assert!(last.done);
        assert_eq!(env.trace(), &[0, 1, DEPOT_TRACE, 2, DEPOT_TRACE]);
        assert!(env.split_cost() > 0.0);
    }

    #[tokio::test]
    async fn infeasible_action_pays_travel_but_serves_nothing() {
        let mut env = small_env();
        env.reset().await.unwrap();
        env.step(DiscreteAction(2)).await.unwrap();
        let cost_before = env.split_cost();
        let step = env.step(DiscreteAction(2)).await.unwrap();
        // revisit of a served customer: zero travel, nothing served
        assert_relative_eq!(env.split_cost(), cost_before);
        assert!(!step.done);
        assert_eq!(env.trace(), &[2, 2]);
    }

    #[tokio::test]
    async fn geometry_is_reproducible_from_the_seed() {
        let a = small_env();
        let b = small_env();
        assert_eq!(a.all_coord(), b.all_coord());
    }

    #[tokio::test]
    async fn out_of_space_action_is_rejected() {
        let mut env = small_env();
        env.reset().await.unwrap();
        let err = env.step(DiscreteAction(17)).await.unwrap_err();
        assert!(matches!(err, RlError::InvalidAction(_)));
    }
}
