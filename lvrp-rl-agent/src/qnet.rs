//! Q-network capability trait and the ndarray MLP implementation
//!
//! The training core only ever needs three capabilities from a network:
//! a batched forward pass, a flat parameter snapshot, and loading such a
//! snapshot (target sync, checkpoint restore). `MlpQNet` is the shipped
//! implementation; it additionally exposes the batched backward pass the
//! optimizer step drives.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use lvrp_rl_core::{Result, RlError};

/// Capability interface of a value network
pub trait QNetwork: Send + Sync {
    /// Forward pass: `[batch, state_dim]` in, `[batch, num_actions]` out
    fn forward(&self, batch: &Array2<f32>) -> Array2<f32>;

    /// Size of the action-value output
    fn num_actions(&self) -> usize;

    /// Flat snapshot of all parameters
    fn parameters(&self) -> Vec<f32>;

    /// Load a parameter snapshot produced by [`QNetwork::parameters`].
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the snapshot length differs.
    fn load_parameters(&mut self, params: &[f32]) -> Result<()>;
}

/// Multi-layer perceptron Q-network (ReLU hidden layers, linear head)
#[derive(Debug, Clone)]
pub struct MlpQNet {
    input_dim: usize,
    output_dim: usize,
    /// Weights for each layer
    weights: Vec<Array2<f32>>,
    /// Biases for each layer
    biases: Vec<Array1<f32>>,
}

impl MlpQNet {
    /// Create a new network with Xavier-initialized weights
    #[must_use]
    pub fn new(input_dim: usize, hidden_dims: &[usize], output_dim: usize) -> Self {
        let mut weights = Vec::with_capacity(hidden_dims.len() + 1);
        let mut biases = Vec::with_capacity(hidden_dims.len() + 1);

        let mut prev_dim = input_dim;
        for &hidden_dim in hidden_dims {
            weights.push(Self::xavier_init(prev_dim, hidden_dim));
            biases.push(Array1::zeros(hidden_dim));
            prev_dim = hidden_dim;
        }
        weights.push(Self::xavier_init(prev_dim, output_dim));
        biases.push(Array1::zeros(output_dim));

        Self {
            input_dim,
            output_dim,
            weights,
            biases,
        }
    }

    /// Xavier initialization for weights
    fn xavier_init(in_dim: usize, out_dim: usize) -> Array2<f32> {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let mut rng = rand::thread_rng();
        Array2::from_shape_fn((in_dim, out_dim), |_| rng.gen_range(-limit..limit))
    }

    /// Flattened input dimension
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Total parameter count
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.weights.iter().map(|w| w.len()).sum::<usize>()
            + self.biases.iter().map(|b| b.len()).sum::<usize>()
    }

    /// Forward pass keeping every layer's input for backprop.
    ///
    /// Returns the output and the activations, where `acts[0]` is the
    /// input batch and `acts[i]` the post-ReLU output of hidden layer `i`.
    #[must_use]
    pub fn forward_cached(&self, batch: &Array2<f32>) -> (Array2<f32>, Vec<Array2<f32>>) {
        let n_hidden = self.weights.len() - 1;
        let mut acts = Vec::with_capacity(self.weights.len());
        let mut hidden = batch.to_owned();
        acts.push(hidden.clone());
        for i in 0..n_hidden {
            hidden = hidden.dot(&self.weights[i]) + &self.biases[i];
            hidden.mapv_inplace(|v| v.max(0.0));
            acts.push(hidden.clone());
        }
        let out = hidden.dot(&self.weights[n_hidden]) + &self.biases[n_hidden];
        (out, acts)
    }

    /// Backward pass given the cached activations and the gradient of
    /// the loss with respect to the network output. Returns a flat
    /// gradient aligned with [`QNetwork::parameters`].
    #[must_use]
    pub fn backward(&self, acts: &[Array2<f32>], grad_out: &Array2<f32>) -> Vec<f32> {
        let n_layers = self.weights.len();
        let mut grads_w_rev = Vec::with_capacity(n_layers);
        let mut grads_b_rev = Vec::with_capacity(n_layers);

        let mut g = grad_out.clone();
        for i in (0..n_layers).rev() {
            grads_w_rev.push(acts[i].t().dot(&g));
            grads_b_rev.push(g.sum_axis(Axis(0)));
            if i > 0 {
                g = g.dot(&self.weights[i].t());
                // ReLU gate: no gradient through inactive units
                g.zip_mut_with(&acts[i], |gv, &av| {
                    if av <= 0.0 {
                        *gv = 0.0;
                    }
                });
            }
        }

        let mut flat = Vec::with_capacity(self.num_params());
        for (w, b) in grads_w_rev.iter().rev().zip(grads_b_rev.iter().rev()) {
            flat.extend(w.iter().copied());
            flat.extend(b.iter().copied());
        }
        flat
    }
}

impl QNetwork for MlpQNet {
    fn forward(&self, batch: &Array2<f32>) -> Array2<f32> {
        let (out, _) = self.forward_cached(batch);
        out
    }

    fn num_actions(&self) -> usize {
        self.output_dim
    }

    fn parameters(&self) -> Vec<f32> {
        let mut params = Vec::with_capacity(self.num_params());
        for (w, b) in self.weights.iter().zip(&self.biases) {
            params.extend(w.iter().copied());
            params.extend(b.iter().copied());
        }
        params
    }

    fn load_parameters(&mut self, params: &[f32]) -> Result<()> {
        if params.len() != self.num_params() {
            return Err(RlError::DimensionMismatch {
                expected: self.num_params(),
                actual: params.len(),
            });
        }
        let mut values = params.iter().copied();
        for (w, b) in self.weights.iter_mut().zip(self.biases.iter_mut()) {
            for v in w.iter_mut() {
                *v = values.next().unwrap_or_default();
            }
            for v in b.iter_mut() {
                *v = values.next().unwrap_or_default();
            }
        }
        Ok(())
    }
}
