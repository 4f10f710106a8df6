//! Pins, bit ranges and jams.

use crate::ids::PinId;
use gatesim_common::Ident;
use gatesim_source::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest pin a chip may declare; a pin's value lives in one `u64` cell.
pub const MAX_PIN_WIDTH: u32 = 64;

/// The role of a pin within its chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinKind {
    /// Declared with `IN`.
    Input,
    /// Declared with `OUT`.
    Output,
    /// A net synthesized at link time for an undeclared name.
    Internal,
}

impl fmt::Display for PinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinKind::Input => write!(f, "input"),
            PinKind::Output => write!(f, "output"),
            PinKind::Internal => write!(f, "internal"),
        }
    }
}

/// A named, fixed-width terminal of a chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// The name as written.
    pub name: Ident,
    /// The case-folded lookup key.
    pub key: Ident,
    /// Bit width, `1..=MAX_PIN_WIDTH`.
    pub width: u32,
    /// Input, output or internal net.
    pub kind: PinKind,
    /// Stable position in the owning chip's pin table and cell array.
    pub index: PinId,
    /// Where the pin was declared or first referenced.
    pub span: Span,
}

impl Pin {
    /// Returns the range covering every bit of this pin.
    pub fn full_range(&self) -> BitRange {
        BitRange::full(self.width)
    }

    /// Returns `true` for pins visible to the instantiating chip.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, PinKind::Input | PinKind::Output)
    }
}

/// An inclusive `[first, last]` window of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitRange {
    /// Lowest bit.
    pub first: u32,
    /// Highest bit, inclusive.
    pub last: u32,
}

impl BitRange {
    /// Creates a range. `first` may exceed `last`; see [`is_ordered`](Self::is_ordered).
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// A single bit.
    pub fn bit(index: u32) -> Self {
        Self::new(index, index)
    }

    /// All bits of a pin of the given width.
    pub fn full(width: u32) -> Self {
        Self::new(0, width.saturating_sub(1))
    }

    /// Number of bits covered. Zero for a reversed range.
    pub fn width(self) -> u32 {
        if self.is_ordered() {
            self.last - self.first + 1
        } else {
            0
        }
    }

    /// Returns `true` when `first <= last`.
    pub fn is_ordered(self) -> bool {
        self.first <= self.last
    }

    /// Returns `true` when the range is ordered and lies within a pin of `width` bits.
    pub fn fits(self, width: u32) -> bool {
        self.is_ordered() && self.last < width
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "[{}]", self.first)
        } else {
            write!(f, "[{}..{}]", self.first, self.last)
        }
    }
}

/// A name, optionally with a bit range, as written in a part's connection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jam {
    /// The name as written.
    pub name: Ident,
    /// The case-folded lookup key.
    pub key: Ident,
    /// The explicit bit range, if any.
    pub range: Option<BitRange>,
    /// Source location of the reference.
    pub span: Span,
}

impl Jam {
    /// Effective width when this jam refers to a pin of `pin_width` bits.
    pub fn width_on(&self, pin_width: u32) -> u32 {
        self.range.map_or(pin_width, BitRange::width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_width_and_fit() {
        let r = BitRange::new(2, 5);
        assert_eq!(r.width(), 4);
        assert!(r.fits(6));
        assert!(!r.fits(5));
        assert_eq!(BitRange::new(3, 1).width(), 0);
        assert!(!BitRange::new(3, 1).fits(8));
    }

    #[test]
    fn full_range_covers_width() {
        assert_eq!(BitRange::full(16), BitRange::new(0, 15));
        assert_eq!(BitRange::full(1), BitRange::bit(0));
    }

    #[test]
    fn range_display() {
        assert_eq!(BitRange::bit(3).to_string(), "[3]");
        assert_eq!(BitRange::new(0, 7).to_string(), "[0..7]");
    }

    #[test]
    fn jam_width_uses_range_when_present() {
        let jam = Jam {
            name: Ident::from_raw(0),
            key: Ident::from_raw(0),
            range: Some(BitRange::new(4, 7)),
            span: Span::DUMMY,
        };
        assert_eq!(jam.width_on(16), 4);
        let whole = Jam { range: None, ..jam };
        assert_eq!(whole.width_on(16), 16);
    }

    #[test]
    fn pin_kind_serde() {
        let json = serde_json::to_string(&PinKind::Internal).unwrap();
        assert_eq!(json, "\"Internal\"");
    }
}
