//! Chip data model for gatesim.
//!
//! Two representations share the same pin and wire types:
//!
//! - [`ChipDecl`]: the builder the elaborator fills from parsed source and
//!   completes while linking.
//! - [`Netlist`]: the frozen, linked graph handed to the simulator. Chips
//!   refer to each other by [`ChipId`], parts are indexed by [`PartId`] and
//!   pins by [`PinId`], so a simulation state is plain indexed arrays.

#![warn(missing_docs)]

pub mod arena;
pub mod chip;
pub mod gate;
pub mod ids;
pub mod netlist;
pub mod pin;
pub mod render;

pub use arena::{Arena, ArenaId};
pub use chip::{AddPinError, ChipDecl, Connection, PartDecl};
pub use gate::GateKind;
pub use ids::{ChipId, PartId, PinId};
pub use netlist::{Chip, ChipKind, Netlist, Part, Wire, WireDirection};
pub use pin::{BitRange, Jam, Pin, PinKind, MAX_PIN_WIDTH};
