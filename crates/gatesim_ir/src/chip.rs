//! The mutable chip builder.
//!
//! A [`ChipDecl`] is what the elaborator assembles from a parsed chip and
//! then completes while linking: parts get their resolved chip and wires,
//! and undeclared nets become [`PinKind::Internal`] pins. Once linked, a decl
//! is only read again, by [`Netlist`](crate::Netlist) freezing.

use crate::arena::Arena;
use crate::gate::GateKind;
use crate::ids::{ChipId, PartId, PinId};
use crate::netlist::Wire;
use crate::pin::{Jam, Pin, PinKind, MAX_PIN_WIDTH};
use gatesim_common::Ident;
use gatesim_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why [`ChipDecl::add_pin`] refused a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddPinError {
    /// A pin with the same case-folded name exists.
    #[error("duplicate pin")]
    Duplicate {
        /// Where the existing pin was declared.
        previous: Span,
    },
    /// Width zero.
    #[error("pin width must be at least 1")]
    ZeroWidth,
    /// Width above [`MAX_PIN_WIDTH`].
    #[error("pin width {width} exceeds the maximum of {MAX_PIN_WIDTH}")]
    TooWide {
        /// The rejected width.
        width: u32,
    },
}

/// One `jam = pin` pair exactly as written at the instantiation site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Left side: names a pin of the instantiated chip.
    pub jam: Jam,
    /// Right side: names a pin or net of the enclosing chip.
    pub pin: Jam,
    /// The whole binding.
    pub span: Span,
}

/// An instance of a chip inside another chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDecl {
    /// The instantiated chip's name as written.
    pub chip: Ident,
    /// Case-folded form of `chip`.
    pub key: Ident,
    /// Stable position in the parent's part list.
    pub index: PartId,
    /// Connections in source order.
    pub connections: Vec<Connection>,
    /// Source location of the instantiation.
    pub span: Span,
    /// Set once by a successful part link.
    pub resolved: Option<ChipId>,
    /// Linked connections, parallel to `connections` once `resolved` is set.
    pub wires: Vec<Wire>,
}

/// A chip definition under construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipDecl {
    /// The chip name as written.
    pub name: Ident,
    /// Case-folded form of `name`.
    pub key: Ident,
    /// Where the chip was declared; dummy for built-in gates.
    pub span: Span,
    /// Pins in declaration order: inputs, outputs, then synthesized nets.
    pub pins: Arena<PinId, Pin>,
    /// Parts in declaration order.
    pub parts: Arena<PartId, PartDecl>,
    /// Set for built-in gates.
    pub gate: Option<GateKind>,
    pin_index: HashMap<Ident, PinId>,
}

impl ChipDecl {
    /// Creates an empty composite chip.
    pub fn new(name: Ident, key: Ident, span: Span) -> Self {
        Self {
            name,
            key,
            span,
            pins: Arena::new(),
            parts: Arena::new(),
            gate: None,
            pin_index: HashMap::new(),
        }
    }

    /// Appends a pin, rejecting duplicate names and unsupported widths.
    pub fn add_pin(
        &mut self,
        name: Ident,
        key: Ident,
        width: u32,
        kind: PinKind,
        span: Span,
    ) -> Result<PinId, AddPinError> {
        if let Some(&existing) = self.pin_index.get(&key) {
            return Err(AddPinError::Duplicate {
                previous: self.pins[existing].span,
            });
        }
        if width == 0 {
            return Err(AddPinError::ZeroWidth);
        }
        if width > MAX_PIN_WIDTH {
            return Err(AddPinError::TooWide { width });
        }
        let index = self.pins.next_id();
        self.pins.alloc(Pin {
            name,
            key,
            width,
            kind,
            index,
            span,
        });
        self.pin_index.insert(key, index);
        Ok(index)
    }

    /// Appends a part with no connections yet.
    pub fn add_part(&mut self, chip: Ident, key: Ident, span: Span) -> PartId {
        let index = self.parts.next_id();
        self.parts.alloc(PartDecl {
            chip,
            key,
            index,
            connections: Vec::new(),
            span,
            resolved: None,
            wires: Vec::new(),
        })
    }

    /// Finds a pin by its case-folded key.
    pub fn find_pin(&self, key: Ident) -> Option<PinId> {
        self.pin_index.get(&key).copied()
    }

    /// Returns the pin for a case-folded key.
    pub fn pin_by_key(&self, key: Ident) -> Option<&Pin> {
        self.find_pin(key).map(|id| &self.pins[id])
    }

    /// Iterates over pins of one kind, in index order.
    pub fn pins_of(&self, kind: PinKind) -> impl Iterator<Item = &Pin> {
        self.pins.values().filter(move |p| p.kind == kind)
    }

    /// Returns `true` for built-in gates.
    pub fn is_gate(&self) -> bool {
        self.gate.is_some()
    }
}
