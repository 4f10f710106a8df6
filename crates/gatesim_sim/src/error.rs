//! Simulation error types.
//!
//! Every invariant the simulator relies on is checked and reported as a
//! [`SimError`] rather than a panic.

use gatesim_ir::{ChipId, PartId, PinId};

/// Errors that can occur while building or settling a simulation state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A chip ID does not belong to the netlist.
    #[error("chip {0} not found in netlist")]
    ChipNotFound(ChipId),

    /// A pin index is outside the chip's pin table.
    #[error("pin {pin} does not exist on chip {chip}")]
    InvalidPin {
        /// The chip the access was made on.
        chip: ChipId,
        /// The offending pin index.
        pin: PinId,
    },

    /// A part index is outside the chip's part table.
    #[error("part {part} does not exist on chip {chip}")]
    InvalidPart {
        /// The chip the access was made on.
        chip: ChipId,
        /// The offending part index.
        part: PartId,
    },

    /// No pin with this name exists on the chip.
    #[error("unknown pin `{name}`")]
    UnknownPin {
        /// The requested name.
        name: String,
    },

    /// A value has bits set above the pin's width.
    #[error("value {value} does not fit in {width}-bit pin `{name}`")]
    ValueTooWide {
        /// The pin name.
        name: String,
        /// The rejected value.
        value: u64,
        /// The pin width.
        width: u32,
    },

    /// Passes kept changing values, indicating a combinational loop.
    #[error("chip {chip} did not settle within {passes} passes")]
    NoConvergence {
        /// The chip whose parts kept changing.
        chip: ChipId,
        /// The pass limit that was reached.
        passes: u32,
    },

    /// A truth table would need more input combinations than allowed.
    #[error("{bits} input bits exceed the truth-table limit of {max}")]
    TooManyInputs {
        /// Total input bits of the chip.
        bits: u32,
        /// The configured limit.
        max: u32,
    },
}
