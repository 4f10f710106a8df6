//! The built-in primitive gates.

use crate::chip::ChipDecl;
use crate::pin::PinKind;
use gatesim_common::Interner;
use gatesim_source::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five leaf chips with hand-coded evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// `out = !(a & b)`
    Nand,
    /// `out = a & b`
    And,
    /// `out = !in`
    Not,
    /// `out = a | b`
    Or,
    /// `out = a ^ b`
    Xor,
}

impl GateKind {
    /// Every gate, in registry order.
    pub const ALL: [GateKind; 5] = [
        GateKind::Nand,
        GateKind::And,
        GateKind::Not,
        GateKind::Or,
        GateKind::Xor,
    ];

    /// Looks up a gate by its exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<GateKind> {
        match name {
            "Nand" => Some(GateKind::Nand),
            "And" => Some(GateKind::And),
            "Not" => Some(GateKind::Not),
            "Or" => Some(GateKind::Or),
            "Xor" => Some(GateKind::Xor),
            _ => None,
        }
    }

    /// The gate's chip name.
    pub fn name(self) -> &'static str {
        match self {
            GateKind::Nand => "Nand",
            GateKind::And => "And",
            GateKind::Not => "Not",
            GateKind::Or => "Or",
            GateKind::Xor => "Xor",
        }
    }

    /// Input pin names, in pin-index order. The output `out` follows them.
    pub fn input_names(self) -> &'static [&'static str] {
        match self {
            GateKind::Not => &["in"],
            _ => &["a", "b"],
        }
    }

    /// Computes the 1-bit output from the gate's inputs in pin-index order.
    pub fn apply(self, inputs: &[u64]) -> u64 {
        let bit = |i: usize| inputs.get(i).copied().unwrap_or(0) & 1;
        let out = match self {
            GateKind::Nand => !(bit(0) & bit(1)),
            GateKind::And => bit(0) & bit(1),
            GateKind::Not => !bit(0),
            GateKind::Or => bit(0) | bit(1),
            GateKind::Xor => bit(0) ^ bit(1),
        };
        out & 1
    }

    /// Builds the gate's chip definition: 1-bit inputs, then `out`.
    pub fn decl(self, interner: &Interner) -> ChipDecl {
        let name = interner.get_or_intern(self.name());
        let mut decl = ChipDecl::new(name, interner.fold(self.name()), Span::DUMMY);
        decl.gate = Some(self);
        let pins = self
            .input_names()
            .iter()
            .map(|&name| (name, PinKind::Input))
            .chain([("out", PinKind::Output)]);
        for (pin, kind) in pins {
            let added = decl.add_pin(
                interner.get_or_intern(pin),
                interner.fold(pin),
                1,
                kind,
                Span::DUMMY,
            );
            // Gate pin names are fixed and distinct.
            debug_assert!(added.is_ok(), "gate {self} rejected pin `{pin}`");
        }
        decl
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
