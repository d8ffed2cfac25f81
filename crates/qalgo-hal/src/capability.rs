//! Backend capability introspection.
//!
//! [`Capabilities`] tells a caller how wide a circuit may be, which gates a
//! backend executes and how many shots one job may request.

use serde::{Deserialize, Serialize};

/// What a backend can execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    /// Widest circuit accepted.
    pub num_qubits: u32,
    pub gate_set: GateSet,
    pub max_shots: u32,
    pub is_simulator: bool,
    /// Whether matrix-defined custom gates are executed directly.
    pub custom_gates: bool,
    /// Additional capability flags such as `"statevector"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Limits of the in-process statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "statevector".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: 1_000_000,
            is_simulator: true,
            custom_gates: true,
            features: vec!["statevector".into(), "seeded_sampling".into()],
        }
    }

    pub fn supports_gate(&self, name: &str) -> bool {
        self.gate_set.contains(name)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate names a backend executes, grouped by arity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateSet {
    pub single_qubit: Vec<String>,
    pub two_qubit: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
}

impl GateSet {
    /// Every standard gate of the circuit IR.
    pub fn universal() -> Self {
        let names = |list: &[&str]| list.iter().map(ToString::to_string).collect();
        Self {
            single_qubit: names(&[
                "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p",
            ]),
            two_qubit: names(&["cx", "cy", "cz", "ch", "swap", "crx", "cry", "crz", "cp"]),
            three_qubit: names(&["ccx", "cswap"]),
        }
    }

    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit
            .iter()
            .chain(&self.two_qubit)
            .chain(&self.three_qubit)
            .any(|g| g == gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator(20);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.is_simulator);
        assert!(caps.custom_gates);
        assert!(caps.has_feature("statevector"));
        assert!(caps.supports_gate("cp"));
        assert!(caps.supports_gate("cswap"));
        assert!(!caps.supports_gate("iswap"));
    }

    #[test]
    fn test_gate_set_serializes_without_empty_three_qubit() {
        let set = GateSet {
            single_qubit: vec!["h".into()],
            two_qubit: vec!["cx".into()],
            three_qubit: vec![],
        };
        let json = serde_json::to_string(&set).unwrap();
        assert!(!json.contains("three_qubit"));
    }
}
