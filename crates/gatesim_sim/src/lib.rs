//! Combinational simulator for gatesim netlists.
//!
//! This crate settles a frozen [`Netlist`](gatesim_ir::Netlist) to a fixed
//! point. Each run owns a tree of [`State`]s mirroring the part hierarchy;
//! the netlist itself is only borrowed, so several runs, on several threads,
//! can share one netlist.
//!
//! # Usage
//!
//! ```ignore
//! use gatesim_sim::{evaluate, SimConfig, State};
//!
//! let mut state = State::for_top(&netlist)?;
//! state.set_named(interner, "a", 1)?;
//! evaluate(&mut state, &SimConfig::default())?;
//! let out = state.get_named(interner, "out")?;
//! ```
//!
//! # Modules
//!
//! - `error`: simulation error types
//! - `bits`: bit-range masking
//! - `state`: per-instance value stores
//! - `evaluator`: gate evaluation and the fixed-point loop
//! - `table`: exhaustive truth tables

#![warn(missing_docs)]

pub mod bits;
pub mod error;
pub mod evaluator;
pub mod state;
pub mod table;

pub use error::SimError;
pub use evaluator::evaluate;
pub use state::State;
pub use table::{truth_table, Column, Row, TruthTable};

/// Default bound on fixed-point passes per chip instance.
pub const DEFAULT_MAX_PASSES: u32 = 1024;

/// Default bound on the total input bits of a truth table.
pub const DEFAULT_MAX_TABLE_INPUTS: u32 = 16;

/// Limits for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Passes a composite chip may take before [`SimError::NoConvergence`].
    pub max_passes: u32,
    /// Input bits above which [`truth_table`] refuses to enumerate.
    pub max_table_inputs: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            max_table_inputs: DEFAULT_MAX_TABLE_INPUTS,
        }
    }
}
