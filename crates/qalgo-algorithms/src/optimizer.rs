//! Derivative-free minimisation for variational circuits.
//!
//! [`Cobyla`] follows the shape of COBYLA without constraints: a simplex of
//! `n + 1` trial points moves by reflection, expansion and contraction, every
//! step clipped to a trust radius `rho` that shrinks from `rhobeg` to
//! `rhoend` whenever the simplex stalls. Sampled expectation values are
//! noisy, so no gradient is ever estimated.

use serde::{Deserialize, Serialize};

/// A minimiser over real parameter vectors.
pub trait Optimizer {
    /// Minimise `objective` starting from `initial`.
    fn minimize<F>(&self, objective: F, initial: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64;
}

/// Outcome of an optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub optimal_params: Vec<f64>,
    /// Objective at `optimal_params`.
    pub optimal_value: f64,
    /// Objective evaluations spent.
    pub num_evaluations: usize,
    /// Simplex iterations performed.
    pub num_iterations: usize,
    /// Best value after each improving iteration.
    pub history: Vec<f64>,
    /// Whether the trust radius reached `rhoend` with a flat simplex.
    pub converged: bool,
}

/// Simplex optimizer with a shrinking trust radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cobyla {
    /// Iteration limit.
    pub maxiter: usize,
    /// Spread of simplex values treated as flat.
    pub tol: f64,
    /// Initial trust radius.
    pub rhobeg: f64,
    /// Final trust radius.
    pub rhoend: f64,
}

impl Default for Cobyla {
    fn default() -> Self {
        Self {
            maxiter: 100,
            tol: 1e-6,
            rhobeg: 0.5,
            rhoend: 1e-4,
        }
    }
}

impl Cobyla {
    /// Optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration limit.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the flatness tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the initial and final trust radius.
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }
}

/// Trial points with their objective values, kept sorted best first.
struct Simplex {
    points: Vec<(Vec<f64>, f64)>,
}

impl Simplex {
    fn around<F: FnMut(&[f64]) -> f64>(
        center: Vec<f64>,
        value: f64,
        rho: f64,
        objective: &mut F,
        evaluations: &mut usize,
    ) -> Self {
        let mut points = Vec::with_capacity(center.len() + 1);
        for i in 0..center.len() {
            let mut vertex = center.clone();
            vertex[i] += rho;
            let f = objective(&vertex);
            *evaluations += 1;
            points.push((vertex, f));
        }
        points.push((center, value));
        let mut simplex = Self { points };
        simplex.sort();
        simplex
    }

    fn sort(&mut self) {
        self.points.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    fn best(&self) -> &(Vec<f64>, f64) {
        &self.points[0]
    }

    fn worst(&self) -> &(Vec<f64>, f64) {
        &self.points[self.points.len() - 1]
    }

    fn spread(&self) -> f64 {
        self.worst().1 - self.best().1
    }

    /// Centroid of every vertex but the worst.
    fn centroid(&self) -> Vec<f64> {
        let keep = &self.points[..self.points.len() - 1];
        let mut centroid = vec![0.0; self.best().0.len()];
        for (vertex, _) in keep {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        let n = keep.len() as f64;
        centroid.iter_mut().for_each(|c| *c /= n);
        centroid
    }

    fn replace_worst(&mut self, vertex: Vec<f64>, value: f64) {
        let last = self.points.len() - 1;
        self.points[last] = (vertex, value);
        self.sort();
    }
}

/// `from + t · (to − from)`, each coordinate step clipped to `rho`.
fn step(from: &[f64], to: &[f64], t: f64, rho: f64) -> Vec<f64> {
    from.iter()
        .zip(to)
        .map(|(a, b)| a + (t * (b - a)).clamp(-rho, rho))
        .collect()
}

impl Optimizer for Cobyla {
    fn minimize<F>(&self, mut objective: F, initial: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut evaluations = 1;
        let start = objective(&initial);
        if initial.is_empty() {
            return OptimizationResult {
                optimal_params: initial,
                optimal_value: start,
                num_evaluations: evaluations,
                num_iterations: 0,
                history: vec![start],
                converged: true,
            };
        }

        let mut rho = self.rhobeg;
        let mut simplex = Simplex::around(initial, start, rho, &mut objective, &mut evaluations);
        let mut history = vec![simplex.best().1];
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.maxiter {
            iterations += 1;

            if simplex.spread() < self.tol {
                if rho <= self.rhoend {
                    converged = true;
                    break;
                }
                rho = (rho / 2.0).max(self.rhoend);
                let (center, value) = simplex.best().clone();
                simplex = Simplex::around(center, value, rho, &mut objective, &mut evaluations);
                continue;
            }

            let centroid = simplex.centroid();
            let worst = simplex.worst().clone();
            let second_worst = simplex.points[simplex.points.len() - 2].1;
            let best_value = simplex.best().1;

            let reflected = step(&centroid, &worst.0, -1.0, rho);
            let f_reflected = objective(&reflected);
            evaluations += 1;

            if f_reflected < best_value {
                let expanded = step(&centroid, &reflected, 2.0, 2.0 * rho);
                let f_expanded = objective(&expanded);
                evaluations += 1;
                if f_expanded < f_reflected {
                    simplex.replace_worst(expanded, f_expanded);
                } else {
                    simplex.replace_worst(reflected, f_reflected);
                }
            } else if f_reflected < second_worst {
                simplex.replace_worst(reflected, f_reflected);
            } else {
                let contracted = step(&centroid, &worst.0, 0.5, rho);
                let f_contracted = objective(&contracted);
                evaluations += 1;
                if f_contracted < worst.1 {
                    simplex.replace_worst(contracted, f_contracted);
                } else {
                    // Shrink toward the best vertex.
                    let best = simplex.best().0.clone();
                    for (vertex, value) in simplex.points.iter_mut().skip(1) {
                        *vertex = step(&best, vertex, 0.5, f64::INFINITY);
                        *value = objective(vertex);
                        evaluations += 1;
                    }
                    simplex.sort();
                }
            }

            let best = simplex.best().1;
            if history.last().is_none_or(|last| best < *last) {
                history.push(best);
            }
        }

        let (optimal_params, optimal_value) = simplex.points.swap_remove(0);
        OptimizationResult {
            optimal_params,
            optimal_value,
            num_evaluations: evaluations,
            num_iterations: iterations,
            history,
            converged,
        }
    }
}
