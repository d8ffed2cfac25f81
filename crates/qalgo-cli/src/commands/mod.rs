//! Routine runners invoked by the CLI flags.

pub mod common;
pub mod qft;
pub mod qpe;
pub mod qubo;
pub mod shor;
