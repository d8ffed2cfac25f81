//! Wire graph behind [`crate::Circuit`].
//!
//! Every wire is a chain `In → op → … → op → Out`. Appending an operation
//! splices it in front of the `Out` node of each wire it touches, so the
//! graph stays acyclic and insertion order is a topological order.

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

pub type NodeIndex = PetNodeIndex<u32>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    In(WireId),
    Out(WireId),
    Op(Instruction),
}

impl DagNode {
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    Qubit(QubitId),
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// One segment of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    pub wire: WireId,
}

#[derive(Debug, Clone, Copy)]
struct Wire {
    output: NodeIndex,
    /// Node currently feeding `output`.
    front: NodeIndex,
}

/// Append-only operation graph with one chain per wire.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    wires: FxHashMap<WireId, Wire>,
    num_qubits: usize,
    num_clbits: usize,
    ops: Vec<NodeIndex>,
}

impl CircuitDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a qubit wire. Repeated ids are ignored.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.add_wire(qubit.into()) {
            self.num_qubits += 1;
        }
    }

    /// Register a classical wire. Repeated ids are ignored.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.add_wire(clbit.into()) {
            self.num_clbits += 1;
        }
    }

    fn add_wire(&mut self, wire: WireId) -> bool {
        if self.wires.contains_key(&wire) {
            return false;
        }
        let input = self.graph.add_node(DagNode::In(wire));
        let output = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(input, output, DagEdge { wire });
        self.wires.insert(
            wire,
            Wire {
                output,
                front: input,
            },
        );
        true
    }

    fn check_operands(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let expected = gate.num_qubits();
                let got = instruction.qubits.len() as u32;
                if expected != got {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name().to_string(),
                        expected,
                        got,
                    });
                }
                Some(gate.name().to_string())
            }
            _ => None,
        };

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.wires.contains_key(&WireId::from(qubit)) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        if let Some(&clbit) = instruction
            .clbits
            .iter()
            .find(|&&c| !self.wires.contains_key(&WireId::from(c)))
        {
            return Err(IrError::ClbitNotFound { clbit, gate_name });
        }
        Ok(())
    }

    /// Validate `instruction` and splice it onto the end of its wires.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.check_operands(&instruction)?;

        let touched: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::from(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::from(c)))
            .collect();
        let node = self.graph.add_node(DagNode::Op(instruction));

        for wire in touched {
            let Wire { output, front } = self.wires[&wire];
            let tail = self
                .graph
                .edges_directed(front, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == output)
                .map(|e| e.id())
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire:?} lost its output edge")))?;
            self.graph.remove_edge(tail);
            self.graph.add_edge(front, node, DagEdge { wire });
            self.graph.add_edge(node, output, DagEdge { wire });
            if let Some(w) = self.wires.get_mut(&wire) {
                w.front = node;
            }
        }

        self.ops.push(node);
        Ok(node)
    }

    /// Operations in insertion order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.ops
            .iter()
            .filter_map(|&idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    #[inline]
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// 1-based layer of every operation: one past the deepest predecessor
    /// on any shared wire.
    pub fn op_layers(&self) -> Vec<(NodeIndex, usize)> {
        let mut layer: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.ops.len(), Default::default());
        self.ops
            .iter()
            .map(|&node| {
                let below = self
                    .graph
                    .edges_directed(node, Direction::Incoming)
                    .filter_map(|e| layer.get(&e.source()).copied())
                    .max()
                    .unwrap_or(0);
                layer.insert(node, below + 1);
                (node, below + 1)
            })
            .collect()
    }

    /// Number of layers. Barriers occupy a layer.
    pub fn depth(&self) -> usize {
        self.op_layers()
            .into_iter()
            .map(|(_, l)| l)
            .max()
            .unwrap_or(0)
    }

    /// Operation histogram keyed by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, inst) in self.topological_ops() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn dag_with(qubits: u32, clbits: u32) -> CircuitDag {
        let mut dag = CircuitDag::new();
        for q in 0..qubits {
            dag.add_qubit(QubitId(q));
        }
        for c in 0..clbits {
            dag.add_clbit(ClbitId(c));
        }
        dag
    }

    fn h(q: u32) -> Instruction {
        Instruction::single_qubit_gate(StandardGate::H, QubitId(q))
    }

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
    }

    #[test]
    fn test_repeated_wire_is_ignored() {
        let mut dag = dag_with(2, 1);
        dag.add_qubit(QubitId(1));
        dag.add_clbit(ClbitId(0));
        assert_eq!(dag.num_qubits(), 2);
        assert_eq!(dag.num_clbits(), 1);
    }

    #[test]
    fn test_layers_follow_shared_wires() {
        let mut dag = dag_with(3, 0);
        dag.apply(h(0)).unwrap();
        dag.apply(h(1)).unwrap();
        dag.apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
            .unwrap();
        dag.apply(h(2)).unwrap();

        let layers: Vec<_> = dag.op_layers().into_iter().map(|(_, l)| l).collect();
        assert_eq!(layers, vec![1, 1, 2, 1]);
        assert_eq!(dag.depth(), 2);
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = dag_with(2, 0);
        let result = dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0)]));

        match result {
            Err(IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            }) => {
                assert_eq!(gate_name, "cx");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected QubitCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_wires_carry_gate_name() {
        let mut dag = dag_with(1, 1);
        let result = dag.apply(Instruction::two_qubit_gate(
            StandardGate::CP(std::f64::consts::PI.into()),
            QubitId(0),
            QubitId(9),
        ));
        match result {
            Err(IrError::QubitNotFound { qubit, gate_name }) => {
                assert_eq!(qubit, QubitId(9));
                assert_eq!(gate_name.as_deref(), Some("cp"));
            }
            other => panic!("expected QubitNotFound, got {other:?}"),
        }

        let result = dag.apply(Instruction::measure(QubitId(0), ClbitId(4)));
        assert!(matches!(
            result,
            Err(IrError::ClbitNotFound { clbit: ClbitId(4), gate_name: None })
        ));
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut dag = dag_with(2, 0);
        let result = dag.apply(Instruction::two_qubit_gate(
            StandardGate::Swap,
            QubitId(1),
            QubitId(1),
        ));
        assert!(matches!(result, Err(IrError::DuplicateQubit { .. })));
    }

    #[test]
    fn test_measure_extends_classical_wire() {
        let mut dag = dag_with(2, 1);
        dag.apply(h(0)).unwrap();
        dag.apply(Instruction::two_qubit_gate(StandardGate::CZ, QubitId(0), QubitId(1)))
            .unwrap();
        dag.apply(Instruction::measure(QubitId(1), ClbitId(0))).unwrap();
        dag.apply(Instruction::measure(QubitId(0), ClbitId(0))).unwrap();

        let counts = dag.count_ops();
        assert_eq!(counts["h"], 1);
        assert_eq!(counts["measure"], 2);
        // The second measurement waits on the shared clbit.
        assert_eq!(dag.depth(), 4);
    }
}
