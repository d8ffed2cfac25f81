//! qalgo Circuit Intermediate Representation
//!
//! Core data structures for the circuits built by the qalgo routines
//! (QFT, phase estimation, order finding, QAOA).
//!
//! # Overview
//!
//! A [`Circuit`] is a fluent builder over a [`CircuitDag`]. Every appended
//! instruction is validated (qubit exists, no duplicate operands, gate arity)
//! before it enters the graph. On top of the builder the crate offers
//! sub-circuit composition, [`Circuit::inverse`], [`Circuit::control`] and a
//! text drawing through `Display`.
//!
//! Wires are [`QubitId`]/[`ClbitId`], optionally grouped into registers.
//! A gate is either a [`StandardGate`] or a matrix-defined [`CustomGate`];
//! angles are [`ParameterExpression`]s so an ansatz can be built once and
//! bound repeatedly.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qalgo_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: Controlled Unitary
//!
//! ```rust
//! use qalgo_ir::{Circuit, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut unitary = Circuit::with_size("u", 1, 0);
//! unitary.p(PI / 4.0, QubitId(0)).unwrap();
//!
//! let controlled = unitary.control().unwrap();
//! assert_eq!(controlled.num_qubits(), 2);
//! ```
//!
//! # Built-in gates
//!
//! | Arity | Gates |
//! |-------|-------|
//! | 1 | `h x y z s sdg t tdg rx ry rz p` |
//! | 2 | `cx cy cz ch swap crx cry crz cp` |
//! | 3 | `ccx cswap` |

pub mod circuit;
pub mod control;
pub mod dag;
mod draw;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod inverse;
pub mod parameter;
pub mod qubit;

pub use circuit::{Circuit, CircuitDescription};
pub use control::{controlled_gate, standard_matrix};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use inverse::{inverse_gate, inverse_instruction, is_self_inverse};
pub use parameter::ParameterExpression;
pub use qubit::{Bit, Clbit, ClbitId, Qubit, QubitId, RegisterSlot};
