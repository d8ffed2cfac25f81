//! Parameter expressions for gate angles.
//!
//! Angles are either concrete values or small symbolic expressions. Symbols
//! let variational routines such as QAOA build an ansatz once and bind new
//! angles on every optimizer step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

/// Angle of a parametric gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    Constant(f64),
    Symbol(String),
    Pi,
    Neg(Box<ParameterExpression>),
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
}

use ParameterExpression as Expr;

impl ParameterExpression {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn pi() -> Self {
        Expr::Pi
    }

    /// Whether any symbol is left unbound.
    pub fn is_symbolic(&self) -> bool {
        self.as_f64().is_none()
    }

    /// Numeric value, or `None` while a symbol is unbound.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Expr::Constant(v) => Some(*v),
            Expr::Pi => Some(PI),
            Expr::Symbol(_) => None,
            Expr::Neg(e) => e.as_f64().map(|v| -v),
            Expr::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            Expr::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
        }
    }

    /// Symbol names, sorted and deduplicated.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Symbol(name) => {
                    names.insert(name.clone());
                }
                Expr::Neg(e) => stack.push(e),
                Expr::Add(a, b) | Expr::Mul(a, b) => stack.extend([&**a, &**b]),
                Expr::Constant(_) | Expr::Pi => {}
            }
        }
        names
    }

    /// Rebuild the tree, replacing every symbol by `leaf(symbol)`.
    fn map_symbols(&self, leaf: &impl Fn(&str) -> Self) -> Self {
        match self {
            Expr::Symbol(name) => leaf(name),
            Expr::Constant(_) | Expr::Pi => self.clone(),
            Expr::Neg(e) => Expr::Neg(Box::new(e.map_symbols(leaf))),
            Expr::Add(a, b) => Expr::Add(Box::new(a.map_symbols(leaf)), Box::new(b.map_symbols(leaf))),
            Expr::Mul(a, b) => Expr::Mul(Box::new(a.map_symbols(leaf)), Box::new(b.map_symbols(leaf))),
        }
    }

    /// Substitute `value` for `name`. A fully bound result collapses to a
    /// constant.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        let bound = self.map_symbols(&|symbol| {
            if symbol == name {
                Expr::Constant(value)
            } else {
                Expr::symbol(symbol)
            }
        });
        bound.as_f64().map_or(bound, Expr::Constant)
    }

    /// `-self`, collapsed when concrete.
    pub fn negated(&self) -> Self {
        self.as_f64()
            .map_or_else(|| Expr::Neg(Box::new(self.clone())), |v| Expr::Constant(-v))
    }

    /// Label used in circuit drawings.
    ///
    /// Dyadic multiples of π print as `π/4` or `-3π/8`; other values get
    /// at most three decimals.
    pub fn pretty(&self) -> String {
        let Some(value) = self.as_f64() else {
            return self.to_string();
        };
        if value == 0.0 {
            return "0".into();
        }
        let dyadic = (0..=10u32).find_map(|k| {
            let numer = value / PI * f64::from(1u32 << k);
            ((numer - numer.round()).abs() < 1e-9).then(|| (numer.round() as i64, k))
        });
        match dyadic {
            Some((numer, k)) => {
                let head = match numer {
                    1 => "π".to_string(),
                    -1 => "-π".to_string(),
                    n => format!("{n}π"),
                };
                if k == 0 { head } else { format!("{head}/{}", 1u32 << k) }
            }
            None => {
                let text = format!("{value:.3}");
                text.trim_end_matches('0').trim_end_matches('.').to_string()
            }
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "{a}*{b}"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.as_f64(), Some(1.5));
    }

    #[test]
    fn test_symbol() {
        let p = ParameterExpression::symbol("gamma_0");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert!(p.symbols().contains("gamma_0"));
    }

    #[test]
    fn test_bind_folds_scaled_symbol() {
        let p = ParameterExpression::constant(-3.0) * ParameterExpression::symbol("beta_0");
        let bound = p.bind("beta_0", 0.5);
        assert_eq!(bound, ParameterExpression::Constant(-1.5));

        let untouched = p.bind("gamma_0", 0.5);
        assert!(untouched.is_symbolic());
    }

    #[test]
    fn test_negated() {
        assert_eq!(
            ParameterExpression::pi().negated(),
            ParameterExpression::Constant(-PI)
        );
        let sym = ParameterExpression::symbol("t").negated();
        assert_eq!(sym.bind("t", 2.0).as_f64(), Some(-2.0));
    }

    #[test]
    fn test_pretty() {
        assert_eq!(ParameterExpression::constant(PI / 2.0).pretty(), "π/2");
        assert_eq!(ParameterExpression::constant(-PI / 4.0).pretty(), "-π/4");
        assert_eq!(ParameterExpression::constant(3.0 * PI / 8.0).pretty(), "3π/8");
        assert_eq!(ParameterExpression::pi().pretty(), "π");
        assert_eq!(ParameterExpression::constant(0.25).pretty(), "0.25");
        assert_eq!(ParameterExpression::symbol("g").pretty(), "g");
    }
}
