//! Text drawing of circuits.
//!
//! One column per instruction, one row per qubit:
//!
//! ```text
//! q0: ─H──P(π/2)──────x─
//! q1: ────■───────H───x─
//! ```

use std::fmt;

use crate::circuit::Circuit;
use crate::gate::{Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};

const WIRE: char = '─';

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} qubits, {} clbits, depth {}",
            self.name(),
            self.num_qubits(),
            self.num_clbits(),
            self.depth()
        )?;

        let names: Vec<String> = self.qubits().iter().map(ToString::to_string).collect();
        let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
        let mut rows: Vec<String> = names
            .iter()
            .map(|n| format!("{n:>name_width$}: {WIRE}"))
            .collect();

        for inst in self.instructions() {
            let cells = column_cells(inst, rows.len());
            let width = cells
                .iter()
                .map(|c| c.as_deref().map_or(1, |s| s.chars().count()))
                .max()
                .unwrap_or(1);
            for (row, cell) in rows.iter_mut().zip(cells) {
                let text = cell.unwrap_or_else(|| WIRE.to_string());
                row.push_str(&centered(&text, width));
                row.push(WIRE);
            }
        }

        for row in rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Cell text for every qubit row; `None` is a plain wire.
fn column_cells(inst: &Instruction, num_rows: usize) -> Vec<Option<String>> {
    let mut cells = vec![None; num_rows];
    let labels = operand_labels(inst);

    if let (Some(lo), Some(hi)) = (
        inst.qubits.iter().map(|q| q.index()).min(),
        inst.qubits.iter().map(|q| q.index()).max(),
    ) {
        if !inst.is_barrier() {
            for cell in cells.iter_mut().take(hi).skip(lo + 1) {
                *cell = Some("┼".to_string());
            }
        }
    }
    for (qubit, label) in inst.qubits.iter().zip(labels) {
        if let Some(cell) = cells.get_mut(qubit.index()) {
            *cell = Some(label);
        }
    }
    cells
}

fn operand_labels(inst: &Instruction) -> Vec<String> {
    match &inst.kind {
        InstructionKind::Measure => inst.clbits.iter().map(|c| format!("M{}", c.0)).collect(),
        InstructionKind::Barrier => vec!["░".to_string(); inst.qubits.len()],
        InstructionKind::Gate(gate) => gate_labels(gate, inst.qubits.len()),
    }
}

fn gate_labels(gate: &Gate, arity: usize) -> Vec<String> {
    match &gate.kind {
        GateKind::Custom(custom) => {
            let text = gate.label.clone().unwrap_or_else(|| custom.name.clone());
            vec![format!("[{text}]"); arity]
        }
        GateKind::Standard(g) => {
            let controls = g.num_controls() as usize;
            let target = gate.label.clone().unwrap_or_else(|| target_label(g));
            (0..arity)
                .map(|k| {
                    if k < controls {
                        "■".to_string()
                    } else {
                        target.clone()
                    }
                })
                .collect()
        }
    }
}

fn target_label(gate: &StandardGate) -> String {
    let base = match gate {
        StandardGate::X | StandardGate::CX | StandardGate::CCX => "X",
        StandardGate::Y | StandardGate::CY => "Y",
        StandardGate::Z | StandardGate::CZ => "Z",
        StandardGate::H | StandardGate::CH => "H",
        StandardGate::S => "S",
        StandardGate::Sdg => "Sdg",
        StandardGate::T => "T",
        StandardGate::Tdg => "Tdg",
        StandardGate::Rx(_) | StandardGate::CRx(_) => "Rx",
        StandardGate::Ry(_) | StandardGate::CRy(_) => "Ry",
        StandardGate::Rz(_) | StandardGate::CRz(_) => "Rz",
        StandardGate::P(_) | StandardGate::CP(_) => "P",
        StandardGate::Swap | StandardGate::CSwap => "x",
    };
    match gate.parameter() {
        Some(p) => format!("{base}({})", p.pretty()),
        None => base.to_string(),
    }
}

fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let left = (width.saturating_sub(len)) / 2;
    let right = width.saturating_sub(len) - left;
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat_n(WIRE, left));
    out.push_str(text);
    out.extend(std::iter::repeat_n(WIRE, right));
    out
}
