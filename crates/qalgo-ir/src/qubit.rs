//! Wire identifiers and register membership.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! wire_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Ids `0..n` in ascending order.
            pub fn range(n: u32) -> Vec<$name> {
                (0..n).map($name).collect()
            }

            /// Position as an index into a state or bit vector.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                $name(id)
            }
        }
    };
}

wire_id!(
    /// Identifier of a qubit within a circuit.
    QubitId,
    "q"
);

wire_id!(
    /// Identifier of a classical bit within a circuit.
    ClbitId,
    "c"
);

/// Slot of a wire inside a named register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterSlot {
    pub name: String,
    pub offset: u32,
}

/// A wire of a circuit, optionally belonging to a register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bit<I> {
    pub id: I,
    pub register: Option<RegisterSlot>,
}

/// A quantum wire.
pub type Qubit = Bit<QubitId>;

/// A classical wire.
pub type Clbit = Bit<ClbitId>;

impl<I> Bit<I> {
    /// A wire outside any register.
    pub fn new(id: I) -> Self {
        Self { id, register: None }
    }

    /// A wire at `offset` within register `name`.
    pub fn with_register(id: I, name: impl Into<String>, offset: u32) -> Self {
        Self {
            id,
            register: Some(RegisterSlot {
                name: name.into(),
                offset,
            }),
        }
    }
}

impl<I: fmt::Display> fmt::Display for Bit<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.register {
            Some(slot) => write!(f, "{}[{}]", slot.name, slot.offset),
            None => fmt::Display::fmt(&self.id, f),
        }
    }
}
