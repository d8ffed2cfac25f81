//! Quadratic unconstrained binary optimization problems.
//!
//! A [`QuadraticProgram`] minimises
//!
//! ```text
//! f(x) = c + Σ_i l_i x_i + Σ_{i<j} q_ij x_i x_j,   x_i ∈ {0, 1}
//! ```
//!
//! and maps onto an Ising Hamiltonian for [`crate::qaoa`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AlgorithmError, AlgorithmResult};

/// A minimisation problem over binary variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadraticProgram {
    name: String,
    variables: Vec<String>,
    linear: Vec<f64>,
    /// Keyed by `(i, j)` with `i < j`.
    quadratic: BTreeMap<(usize, usize), f64>,
    constant: f64,
}

impl QuadraticProgram {
    /// Create an empty problem.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a binary variable and return its index.
    pub fn binary_var(&mut self, name: impl Into<String>) -> AlgorithmResult<usize> {
        let name = name.into();
        if self.variables.contains(&name) {
            return Err(AlgorithmError::InvalidInput(format!(
                "variable '{name}' already defined"
            )));
        }
        self.variables.push(name);
        self.linear.push(0.0);
        Ok(self.variables.len() - 1)
    }

    /// Add `coefficient · var` to the objective.
    pub fn add_linear(&mut self, var: &str, coefficient: f64) -> AlgorithmResult<&mut Self> {
        let i = self.index_of(var)?;
        self.linear[i] += coefficient;
        Ok(self)
    }

    /// Add `coefficient · a · b` to the objective.
    ///
    /// `x·x = x` for binaries, so a repeated variable lands in the linear part.
    pub fn add_quadratic(&mut self, a: &str, b: &str, coefficient: f64) -> AlgorithmResult<&mut Self> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        if i == j {
            self.linear[i] += coefficient;
        } else {
            *self.quadratic.entry((i.min(j), i.max(j))).or_insert(0.0) += coefficient;
        }
        Ok(self)
    }

    /// Set the constant offset.
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Problem name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable names in index order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of binary variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Linear coefficients in variable order.
    pub fn linear(&self) -> &[f64] {
        &self.linear
    }

    /// Nonzero quadratic terms as `(i, j, q_ij)` with `i < j`.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.quadratic.iter().map(|(&(i, j), &q)| (i, j, q))
    }

    /// Constant offset.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Evaluate the objective. Entries beyond `num_variables` are ignored,
    /// missing ones count as 0.
    pub fn objective(&self, assignment: &[u8]) -> f64 {
        let bit = |i: usize| f64::from(assignment.get(i).copied().unwrap_or(0) & 1);
        let linear: f64 = self.linear.iter().enumerate().map(|(i, l)| l * bit(i)).sum();
        let quadratic: f64 = self.quadratic_terms().map(|(i, j, q)| q * bit(i) * bit(j)).sum();
        self.constant + linear + quadratic
    }

    /// Ising form under `x = (1 − z) / 2`.
    pub fn to_ising(&self) -> IsingModel {
        let mut fields: Vec<f64> = self.linear.iter().map(|l| -l / 2.0).collect();
        let mut couplings = Vec::with_capacity(self.quadratic.len());
        let mut offset = self.constant + self.linear.iter().sum::<f64>() / 2.0;

        for (i, j, q) in self.quadratic_terms() {
            fields[i] -= q / 4.0;
            fields[j] -= q / 4.0;
            couplings.push((i, j, q / 4.0));
            offset += q / 4.0;
        }

        IsingModel {
            fields,
            couplings,
            offset,
        }
    }

    fn index_of(&self, var: &str) -> AlgorithmResult<usize> {
        self.variables
            .iter()
            .position(|v| v == var)
            .ok_or_else(|| AlgorithmError::InvalidInput(format!("unknown variable '{var}'")))
    }
}

impl std::fmt::Display for QuadraticProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut terms: Vec<(f64, String)> = self
            .variables
            .iter()
            .zip(&self.linear)
            .filter(|(_, l)| **l != 0.0)
            .map(|(name, &l)| (l, format!("{}*{name}", l.abs())))
            .collect();
        terms.extend(self.quadratic_terms().map(|(i, j, q)| {
            (q, format!("{}*{}*{}", q.abs(), self.variables[i], self.variables[j]))
        }));
        if self.constant != 0.0 || terms.is_empty() {
            terms.push((self.constant, self.constant.abs().to_string()));
        }

        write!(f, "minimize")?;
        for (k, (coeff, text)) in terms.iter().enumerate() {
            match (k, *coeff < 0.0) {
                (0, false) => write!(f, " {text}")?,
                (0, true) => write!(f, " -{text}")?,
                (_, false) => write!(f, " + {text}")?,
                (_, true) => write!(f, " - {text}")?,
            }
        }
        write!(f, " ({} binary variables)", self.variables.len())
    }
}

/// `H = offset + Σ h_i Z_i + Σ J_ij Z_i Z_j`, whose eigenvalue on `|x⟩`
/// equals the QUBO objective of `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingModel {
    /// Single-spin fields `h_i`.
    pub fields: Vec<f64>,
    /// Couplings `(i, j, J_ij)`.
    pub couplings: Vec<(usize, usize, f64)>,
    /// Constant energy offset.
    pub offset: f64,
}

impl IsingModel {
    /// Energy of a spin configuration, `z_i = 1 − 2 x_i`.
    pub fn energy(&self, assignment: &[u8]) -> f64 {
        let spin = |i: usize| 1.0 - 2.0 * f64::from(assignment.get(i).copied().unwrap_or(0) & 1);
        let field: f64 = self.fields.iter().enumerate().map(|(i, h)| h * spin(i)).sum();
        let coupling: f64 = self
            .couplings
            .iter()
            .map(|&(i, j, coupling)| coupling * spin(i) * spin(j))
            .sum();
        self.offset + field + coupling
    }
}

/// The demonstration problem `minimize x0 + x1 − 2·x0·x1`.
///
/// Assignments `00` and `11` reach the optimum 0.
pub fn simple_qubo_problem() -> QuadraticProgram {
    let mut problem = QuadraticProgram::new("QUBO_Minimization");
    build_simple(&mut problem).unwrap_or_else(|e| unreachable!("demo problem rejected: {e}"));
    problem
}

fn build_simple(problem: &mut QuadraticProgram) -> AlgorithmResult<()> {
    problem.binary_var("x0")?;
    problem.binary_var("x1")?;
    problem
        .add_linear("x0", 1.0)?
        .add_linear("x1", 1.0)?
        .add_quadratic("x0", "x1", -2.0)?;
    Ok(())
}
