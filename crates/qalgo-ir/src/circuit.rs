//! High-level circuit builder API.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

macro_rules! one_qubit {
    ($($(#[$doc:meta])* $method:ident => $gate:ident,)*) => {$(
        $(#[$doc])*
        pub fn $method(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
            self.single(StandardGate::$gate, qubit)
        }
    )*};
}

macro_rules! one_qubit_angle {
    ($($(#[$doc:meta])* $method:ident => $gate:ident,)*) => {$(
        $(#[$doc])*
        pub fn $method(
            &mut self,
            theta: impl Into<ParameterExpression>,
            qubit: QubitId,
        ) -> IrResult<&mut Self> {
            self.single(StandardGate::$gate(theta.into()), qubit)
        }
    )*};
}

macro_rules! two_qubit {
    ($($(#[$doc:meta])* $method:ident => $gate:ident,)*) => {$(
        $(#[$doc])*
        pub fn $method(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
            self.pair(StandardGate::$gate, a, b)
        }
    )*};
}

macro_rules! two_qubit_angle {
    ($($(#[$doc:meta])* $method:ident => $gate:ident,)*) => {$(
        $(#[$doc])*
        pub fn $method(
            &mut self,
            theta: impl Into<ParameterExpression>,
            control: QubitId,
            target: QubitId,
        ) -> IrResult<&mut Self> {
            self.pair(StandardGate::$gate(theta.into()), control, target)
        }
    )*};
}

/// A named circuit: its wires plus the operation graph over them.
///
/// Every builder method validates its operands before touching the graph,
/// so a failed call leaves the circuit unchanged.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    dag: CircuitDag,
}

/// Flat, serializable form of a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub name: String,
    pub qubits: Vec<Qubit>,
    pub clbits: Vec<Clbit>,
    /// Program order.
    pub instructions: Vec<Instruction>,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: Vec::new(),
            clbits: Vec::new(),
            dag: CircuitDag::new(),
        }
    }

    /// Circuit with anonymous wires `q0..` and `c0..`.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        (0..num_qubits).for_each(|_| {
            circuit.add_qubit();
        });
        (0..num_clbits).for_each(|_| {
            circuit.add_clbit();
        });
        circuit
    }

    /// Empty circuit with the same wires (and register labels) as `self`.
    pub fn empty_like(&self, name: impl Into<String>) -> Self {
        let mut circuit = Self::new(name);
        for qubit in &self.qubits {
            circuit.push_qubit(qubit.clone());
        }
        for clbit in &self.clbits {
            circuit.push_clbit(clbit.clone());
        }
        circuit
    }

    fn push_qubit(&mut self, qubit: Qubit) -> QubitId {
        let id = qubit.id;
        self.dag.add_qubit(id);
        self.qubits.push(qubit);
        id
    }

    fn push_clbit(&mut self, clbit: Clbit) -> ClbitId {
        let id = clbit.id;
        self.dag.add_clbit(id);
        self.clbits.push(clbit);
        id
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_qubit_id(&self) -> QubitId {
        QubitId(self.qubits.len() as u32)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_clbit_id(&self) -> ClbitId {
        ClbitId(self.clbits.len() as u32)
    }

    pub fn add_qubit(&mut self) -> QubitId {
        self.push_qubit(Qubit::new(self.next_qubit_id()))
    }

    /// Append `size` qubits labelled `name[0]..`.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| self.push_qubit(Qubit::with_register(self.next_qubit_id(), &name, i)))
            .collect()
    }

    pub fn add_clbit(&mut self) -> ClbitId {
        self.push_clbit(Clbit::new(self.next_clbit_id()))
    }

    /// Append `size` classical bits labelled `name[0]..`.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        (0..size)
            .map(|i| self.push_clbit(Clbit::with_register(self.next_clbit_id(), &name, i)))
            .collect()
    }

    /// Append a prepared instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    fn single(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(gate, qubit))
    }

    fn pair(&mut self, gate: StandardGate, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(gate, a, b))
    }

    one_qubit! {
        /// Hadamard.
        h => H,
        x => X,
        y => Y,
        z => Z,
        s => S,
        sdg => Sdg,
        t => T,
        tdg => Tdg,
    }

    one_qubit_angle! {
        rx => Rx,
        ry => Ry,
        /// `exp(-iθZ/2)`; differs from [`Circuit::p`] by a global phase.
        rz => Rz,
        p => P,
    }

    two_qubit! {
        /// CNOT.
        cx => CX,
        cy => CY,
        cz => CZ,
        ch => CH,
        swap => Swap,
    }

    two_qubit_angle! {
        crx => CRx,
        cry => CRy,
        crz => CRz,
        /// Controlled phase; symmetric in its two qubits.
        cp => CP,
    }

    /// Toffoli.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Fredkin: swaps `t1` and `t2` when `control` is set.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Append any gate, built-in or matrix-defined.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure `qubits[k]` into `clbits[k]` as one instruction.
    pub fn measure_qubits(&mut self, qubits: &[QubitId], clbits: &[ClbitId]) -> IrResult<&mut Self> {
        self.append(Instruction::measure_all(
            qubits.iter().copied(),
            clbits.iter().copied(),
        )?)
    }

    /// Measure qubit k into clbit k for every qubit, growing the classical
    /// register if it is too short.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        let clbits: Vec<_> = self.clbits.iter().map(|c| c.id).take(qubits.len()).collect();
        self.measure_qubits(&qubits, &clbits)
    }

    /// Ordering barrier across `qubits`.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Append `other`, mapping its qubit k to `qubits[k]` and clbit k to `clbits[k]`.
    pub fn compose(
        &mut self,
        other: &Circuit,
        qubits: &[QubitId],
        clbits: &[ClbitId],
    ) -> IrResult<&mut Self> {
        if qubits.len() != other.num_qubits() {
            return Err(IrError::WidthMismatch {
                name: other.name.clone(),
                expected: other.num_qubits(),
                got: qubits.len(),
            });
        }
        if clbits.len() < other.num_clbits() {
            return Err(IrError::WidthMismatch {
                name: other.name.clone(),
                expected: other.num_clbits(),
                got: clbits.len(),
            });
        }
        let name = Some(other.name.clone());
        self.check_wires(qubits, &clbits[..other.num_clbits()], name)?;
        for inst in other.instructions() {
            self.append(inst.remapped(qubits, clbits)?)?;
        }
        Ok(self)
    }

    /// Fail unless every listed wire belongs to this circuit and none repeats.
    ///
    /// Multi-gate builders call this first so an error leaves the circuit
    /// untouched.
    pub fn check_wires(
        &self,
        qubits: &[QubitId],
        clbits: &[ClbitId],
        gate_name: Option<String>,
    ) -> IrResult<()> {
        let mut seen = FxHashSet::default();
        for &qubit in qubits {
            if !self.qubits.iter().any(|q| q.id == qubit) {
                return Err(IrError::QubitNotFound { qubit, gate_name });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, gate_name });
            }
        }
        let mut seen = FxHashSet::default();
        for &clbit in clbits {
            if !self.clbits.iter().any(|c| c.id == clbit) {
                return Err(IrError::ClbitNotFound { clbit, gate_name });
            }
            if !seen.insert(clbit) {
                return Err(IrError::DuplicateClbit { clbit, gate_name });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Names of all unbound symbols, sorted.
    pub fn parameters(&self) -> BTreeSet<String> {
        self.instructions()
            .filter_map(Instruction::as_standard)
            .filter_map(StandardGate::parameter)
            .flat_map(ParameterExpression::symbols)
            .collect()
    }

    /// Check whether any gate angle is still symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.instructions()
            .filter_map(Instruction::as_standard)
            .any(StandardGate::is_parameterized)
    }

    /// Copy of the circuit with the given symbols bound.
    ///
    /// Fails with [`IrError::UnboundParameter`] when a binding names a symbol
    /// the circuit does not contain.
    pub fn bind_parameters(&self, bindings: &[(&str, f64)]) -> IrResult<Circuit> {
        let known = self.parameters();
        if let Some((name, _)) = bindings.iter().find(|(n, _)| !known.contains(*n)) {
            return Err(IrError::UnboundParameter((*name).to_string()));
        }
        let mut bound = self.empty_like(self.name.clone());
        for inst in self.instructions() {
            let mut inst = inst.clone();
            if let InstructionKind::Gate(Gate {
                kind: GateKind::Standard(g),
                ..
            }) = &mut inst.kind
            {
                *g = g.map_parameter(|p| {
                    bindings
                        .iter()
                        .fold(p.clone(), |acc, (name, value)| acc.bind(name, *value))
                });
            }
            bound.append(inst)?;
        }
        Ok(bound)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Longest chain of operations sharing wires.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Count instructions by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        self.dag.count_ops()
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }

    pub fn has_measurements(&self) -> bool {
        self.instructions().any(Instruction::is_measure)
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Ids of all qubits, ascending.
    pub fn qubit_ids(&self) -> Vec<QubitId> {
        self.qubits.iter().map(|q| q.id).collect()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Flatten into a serializable description.
    pub fn to_description(&self) -> CircuitDescription {
        CircuitDescription {
            name: self.name.clone(),
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            instructions: self.instructions().cloned().collect(),
        }
    }

    /// Rebuild a circuit, validating every instruction.
    pub fn from_description(desc: CircuitDescription) -> IrResult<Self> {
        let mut circuit = Self::new(desc.name);
        for qubit in desc.qubits {
            circuit.push_qubit(qubit);
        }
        for clbit in desc.clbits {
            circuit.push_clbit(clbit);
        }
        for inst in desc.instructions {
            circuit.append(inst)?;
        }
        Ok(circuit)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_description())
    }

    /// Parse a circuit from JSON produced by [`Circuit::to_json`].
    pub fn from_json(json: &str) -> IrResult<Self> {
        let desc: CircuitDescription = serde_json::from_str(json)
            .map_err(|e| IrError::InvalidDag(format!("invalid circuit JSON: {e}")))?;
        Self::from_description(desc)
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// `(|00⟩ + |11⟩)/√2`, measured.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// `n`-qubit GHZ state, measured.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        circuit.measure_qubits(&QubitId::range(n), &ClbitId::range(n))?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("qpe");
        let count = circuit.add_qreg("count", 3);
        let eigen = circuit.add_qreg("eigen", 1);
        let bits = circuit.add_creg("c", 3);

        assert_eq!(count, QubitId::range(3));
        assert_eq!(eigen, vec![QubitId(3)]);
        assert_eq!(bits.len(), 3);
        assert_eq!(circuit.qubits()[3].to_string(), "eigen[0]");
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.depth(), 3);
        assert!(circuit.has_measurements());
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.count_ops()["cx"], 4);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cp(PI / 2.0, QubitId(1), QubitId(0))
            .unwrap()
            .swap(QubitId(0), QubitId(1))
            .unwrap();

        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.num_ops(), 3);
    }

    #[test]
    fn test_compose_onto_subset() {
        let mut prep = Circuit::with_size("prep", 1, 0);
        prep.x(QubitId(0)).unwrap();

        let mut circuit = Circuit::with_size("main", 3, 0);
        circuit.compose(&prep, &[QubitId(2)], &[]).unwrap();
        let inst = circuit.instructions().next().unwrap();
        assert_eq!(inst.qubits, vec![QubitId(2)]);

        let err = circuit.compose(&prep, &[QubitId(0), QubitId(1)], &[]);
        assert!(matches!(err, Err(IrError::WidthMismatch { expected: 1, got: 2, .. })));
    }

    #[test]
    fn test_failed_compose_leaves_circuit_untouched() {
        let mut pair = Circuit::with_size("pair", 2, 2);
        pair.h(QubitId(0)).unwrap();
        pair.cx(QubitId(0), QubitId(1)).unwrap();
        pair.measure(QubitId(1), ClbitId(1)).unwrap();

        let mut circuit = Circuit::with_size("main", 3, 2);
        circuit.x(QubitId(2)).unwrap();

        let err = circuit.compose(&pair, &[QubitId(0), QubitId(7)], &[ClbitId(0), ClbitId(1)]);
        assert!(matches!(err, Err(IrError::QubitNotFound { qubit: QubitId(7), .. })));
        let err = circuit.compose(&pair, &[QubitId(1), QubitId(1)], &[ClbitId(0), ClbitId(1)]);
        assert!(matches!(err, Err(IrError::DuplicateQubit { qubit: QubitId(1), .. })));
        let err = circuit.compose(&pair, &[QubitId(0), QubitId(1)], &[ClbitId(0), ClbitId(5)]);
        assert!(matches!(err, Err(IrError::ClbitNotFound { clbit: ClbitId(5), .. })));
        let err = circuit.compose(&pair, &[QubitId(0), QubitId(1)], &[ClbitId(1), ClbitId(1)]);
        assert!(matches!(err, Err(IrError::DuplicateClbit { clbit: ClbitId(1), .. })));
        assert_eq!(circuit.num_ops(), 1);

        circuit
            .compose(&pair, &[QubitId(2), QubitId(0)], &[ClbitId(1), ClbitId(0)])
            .unwrap();
        assert_eq!(circuit.num_ops(), 4);
    }

    #[test]
    fn test_bind_parameters() {
        let mut circuit = Circuit::with_size("ansatz", 1, 0);
        circuit
            .rz(
                ParameterExpression::constant(2.0) * ParameterExpression::symbol("gamma"),
                QubitId(0),
            )
            .unwrap()
            .rx(ParameterExpression::symbol("beta"), QubitId(0))
            .unwrap();

        assert!(circuit.is_parameterized());
        assert_eq!(
            circuit.parameters().into_iter().collect::<Vec<_>>(),
            vec!["beta".to_string(), "gamma".to_string()]
        );

        let bound = circuit
            .bind_parameters(&[("gamma", 0.25), ("beta", 1.0)])
            .unwrap();
        assert!(!bound.is_parameterized());
        let angles: Vec<_> = bound
            .instructions()
            .filter_map(Instruction::as_standard)
            .filter_map(|g| g.parameter().and_then(ParameterExpression::as_f64))
            .collect();
        assert_eq!(angles, vec![0.5, 1.0]);

        assert!(matches!(
            circuit.bind_parameters(&[("delta", 1.0)]),
            Err(IrError::UnboundParameter(_))
        ));
    }

    #[test]
    fn test_json_restores_registers_and_ops() {
        let mut circuit = Circuit::new("json");
        let q = circuit.add_qreg("work", 2);
        let c = circuit.add_creg("c", 2);
        circuit.h(q[0]).unwrap().cx(q[0], q[1]).unwrap();
        circuit.measure_qubits(&q, &c).unwrap();

        let restored = Circuit::from_json(&circuit.to_json().unwrap()).unwrap();
        assert_eq!(restored.to_description(), circuit.to_description());
        assert!(Circuit::from_json("{not json").is_err());
    }
}
