//! Shor's factoring algorithm.
//!
//! Classical shortcuts handle even numbers, primes and perfect powers. Every
//! other odd composite goes through quantum order finding: `2n` counting
//! qubits and an `n`-qubit work register holding `y`, where controlled
//! multiplication by `a^(2^i) mod N` is a permutation gate.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qalgo_hal::{Backend, HalError};
use qalgo_ir::{Circuit, CustomGate, QubitId};

use crate::error::{AlgorithmError, AlgorithmResult};
use crate::qft::apply_qft;

/// Options for [`factor_integer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShorOptions {
    /// Shots per order-finding circuit.
    pub shots: u32,
    /// Fixed base; `None` tries coprime bases 2, 3, ... in turn.
    pub base: Option<u64>,
    /// Bases to try when none is fixed.
    pub max_attempts: usize,
}

impl Default for ShorOptions {
    fn default() -> Self {
        Self {
            shots: 2048,
            base: None,
            max_attempts: 5,
        }
    }
}

/// How the factors were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorMethod {
    /// N is even.
    Even,
    /// N is prime, so no factors exist.
    Prime,
    /// N is `b^k` for some `k ≥ 2`.
    PerfectPower,
    /// Quantum order finding.
    OrderFinding,
}

/// Outcome of [`factor_integer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShorReport {
    /// The number that was factored.
    pub n: u64,
    /// Non-trivial factors found, ascending and unique. Empty when none were found.
    pub factors: Vec<u64>,
    /// Path that produced the result.
    pub method: FactorMethod,
    /// Base whose order revealed the factors.
    pub base: Option<u64>,
    /// Order of `base` modulo `n`.
    pub order: Option<u64>,
    /// Wall-clock time in seconds.
    pub elapsed_secs: f64,
}

/// Factor `n` using `backend` for order finding.
///
/// # Errors
///
/// - [`AlgorithmError::InvalidInput`] for `n ≤ 1` or a fixed base that is
///   not coprime with `n` or outside `2..n`. Nothing is submitted.
/// - [`AlgorithmError::Backend`] when the order-finding circuit does not
///   fit the backend or fails to run.
#[instrument(skip(backend, options), fields(backend = backend.name()))]
pub fn factor_integer(n: u64, backend: &dyn Backend, options: &ShorOptions) -> AlgorithmResult<ShorReport> {
    if n <= 1 {
        return Err(AlgorithmError::InvalidInput(format!(
            "cannot factor {n}: input must be greater than 1"
        )));
    }
    let start = Instant::now();
    let report = |factors: BTreeSet<u64>, method, found: Option<(u64, u64)>| ShorReport {
        n,
        factors: factors.into_iter().collect(),
        method,
        base: found.map(|(a, _)| a),
        order: found.map(|(_, r)| r),
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    if n % 2 == 0 {
        let factors = if n == 2 { BTreeSet::new() } else { BTreeSet::from([2, n / 2]) };
        return Ok(report(factors, FactorMethod::Even, None));
    }
    if is_prime(n) {
        return Ok(report(BTreeSet::new(), FactorMethod::Prime, None));
    }
    if let Some(b) = perfect_power_base(n) {
        return Ok(report(BTreeSet::from([b]), FactorMethod::PerfectPower, None));
    }

    let bases: Vec<u64> = match options.base {
        Some(a) => {
            if a < 2 || a >= n || gcd(a, n) != 1 {
                return Err(AlgorithmError::InvalidInput(format!(
                    "base {a} must lie in 2..{n} and be coprime with {n}"
                )));
            }
            vec![a]
        }
        None => (2..n)
            .filter(|&a| gcd(a, n) == 1)
            .take(options.max_attempts)
            .collect(),
    };

    let width = 3 * bit_length(n) as usize;
    let max = backend.capabilities().num_qubits as usize;
    if width > max {
        return Err(HalError::CircuitTooLarge { qubits: width, max }.into());
    }

    for a in bases {
        let circuit = order_finding_circuit(a, n)?;
        let result = backend.run(&circuit, options.shots)?;
        let bits = 2 * bit_length(n);
        for (outcome, count) in result.counts.sorted() {
            let Some(r) = order_from_outcome(outcome_value(outcome), bits, a, n) else {
                continue;
            };
            let half = mod_pow(a, r / 2, n);
            let factors: BTreeSet<u64> = [gcd(half + 1, n), gcd(half + n - 1, n)]
                .into_iter()
                .filter(|&f| f > 1 && f < n)
                .collect();
            if !factors.is_empty() {
                info!(base = a, order = r, outcome, count, "Found order");
                return Ok(report(factors, FactorMethod::OrderFinding, Some((a, r))));
            }
        }
        debug!(base = a, "No usable order in sampled outcomes");
    }

    Ok(report(BTreeSet::new(), FactorMethod::OrderFinding, None))
}

/// Order-finding circuit for base `a` modulo `n`.
///
/// Qubits `0..2m` count, `2m..3m` hold the work register, `m` being the bit
/// length of `n`. Counting qubit `i` is measured into classical bit `i`.
pub fn order_finding_circuit(a: u64, n: u64) -> AlgorithmResult<Circuit> {
    let m = bit_length(n);
    let mut circuit = Circuit::new(format!("shor_{n}_{a}"));
    let counting = circuit.add_qreg("count", 2 * m);
    let work = circuit.add_qreg("work", m);
    let clbits = circuit.add_creg("c", 2 * m);

    for &q in &counting {
        circuit.h(q)?;
    }
    circuit.x(work[0])?;

    let mut multiplier = a % n;
    for (i, &control) in counting.iter().enumerate() {
        let gate = modular_multiplier(multiplier, n, m)?.controlled()?;
        let mut operands = Vec::with_capacity(work.len() + 1);
        operands.push(control);
        operands.extend_from_slice(&work);
        circuit.gate(gate, operands)?;
        debug!(counting_qubit = i, multiplier, "Added controlled multiplier");
        multiplier = mod_mul(multiplier, multiplier, n);
    }

    let mut qft = Circuit::with_size("qft", 2 * m, 0);
    let order: Vec<QubitId> = (0..2 * m).rev().map(QubitId).collect();
    apply_qft(&mut qft, &order)?;
    circuit.compose(&qft.inverse()?, &counting, &[])?;
    circuit.measure_qubits(&counting, &clbits)?;
    Ok(circuit)
}

/// `|y⟩ → |c·y mod n⟩` for `y < n`, identity above.
fn modular_multiplier(c: u64, n: u64, width: u32) -> AlgorithmResult<CustomGate> {
    let dim = 1usize << width;
    let targets: Vec<usize> = (0..dim as u64)
        .map(|y| {
            let image = if y < n { mod_mul(c, y, n) } else { y };
            image as usize
        })
        .collect();
    Ok(CustomGate::permutation(format!("mul{c}_mod{n}"), width, &targets)?)
}

/// Integer read from a bitstring whose first character is the least significant bit.
fn outcome_value(bitstring: &str) -> u64 {
    bitstring
        .chars()
        .enumerate()
        .filter(|&(_, c)| c == '1')
        .fold(0u64, |acc, (k, _)| acc | (1u64 << k))
}

/// Order candidate from a measured value `y` over `2^bits`.
///
/// Walks the continued-fraction convergents of `y / 2^bits` with
/// denominators below `n`, trying each denominator and its multiples.
fn order_from_outcome(y: u64, bits: u32, a: u64, n: u64) -> Option<u64> {
    if y == 0 {
        return None;
    }
    for (_, q) in convergents(y, 1u64 << bits) {
        if q == 0 || q >= n {
            break;
        }
        let mut r = q;
        while r < n {
            if is_valid_order(a, r, n) {
                return Some(r);
            }
            r += q;
        }
    }
    None
}

/// `a^r ≡ 1`, `r` even and `a^(r/2) ≢ -1 (mod n)`.
fn is_valid_order(a: u64, r: u64, n: u64) -> bool {
    r % 2 == 0 && mod_pow(a, r, n) == 1 && mod_pow(a, r / 2, n) != n - 1
}

/// Continued-fraction convergents `p/q` of `num / den`.
fn convergents(num: u64, den: u64) -> Vec<(u64, u64)> {
    let (mut p_prev, mut q_prev, mut p, mut q) = (0u64, 1u64, 1u64, 0u64);
    let (mut a, mut b) = (num, den);
    let mut out = Vec::new();
    while b != 0 {
        let t = a / b;
        let p_next = t.saturating_mul(p).saturating_add(p_prev);
        let q_next = t.saturating_mul(q).saturating_add(q_prev);
        out.push((p_next, q_next));
        (p_prev, q_prev, p, q) = (p, q, p_next, q_next);
        (a, b) = (b, a % b);
    }
    out
}

fn bit_length(n: u64) -> u32 {
    u64::BITS - n.leading_zeros()
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn mod_mul(a: u64, b: u64, n: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(n)) as u64
}

fn mod_pow(mut base: u64, mut exp: u64, n: u64) -> u64 {
    let mut acc = 1 % n;
    base %= n;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mod_mul(acc, base, n);
        }
        base = mod_mul(base, base, n);
        exp >>= 1;
    }
    acc
}

/// Deterministic Miller-Rabin for 64-bit integers.
fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    for p in WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for a in WITNESSES {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mod_mul(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Smallest `b` with `b^k = n` for some `k ≥ 2`.
fn perfect_power_base(n: u64) -> Option<u64> {
    (2..bit_length(n)).rev().find_map(|k| {
        let guess = (n as f64).powf(1.0 / f64::from(k)).round() as u64;
        [guess.saturating_sub(1), guess, guess + 1]
            .into_iter()
            .find(|&b| b >= 2 && b.checked_pow(k) == Some(n))
    })
}
