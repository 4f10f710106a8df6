//! AST node types for chip definitions.
//!
//! Every node carries a [`Span`]. Chips that could not be parsed at all are
//! kept as [`ChipItem::Error`] so that the rest of the file still parses.

use gatesim_common::Ident;
use gatesim_source::Span;
use serde::{Deserialize, Serialize};

/// A parsed `.hdl` file: one or more chip definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdlFile {
    /// The chips in declaration order.
    pub chips: Vec<ChipItem>,
    /// The span covering the whole file.
    pub span: Span,
}

impl HdlFile {
    /// Iterates over the successfully parsed chips.
    pub fn chip_defs(&self) -> impl Iterator<Item = &Chip> {
        self.chips.iter().filter_map(|item| match item {
            ChipItem::Chip(chip) => Some(chip),
            ChipItem::Error(_) => None,
        })
    }
}

/// A top-level item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChipItem {
    /// A `CHIP Name { ... }` definition.
    Chip(Chip),
    /// Tokens skipped during error recovery.
    Error(Span),
}

/// `CHIP Name { IN ...; OUT ...; PARTS: ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chip {
    /// The chip name as written.
    pub name: Ident,
    /// The span of the name token.
    pub name_span: Span,
    /// `IN` declarations, in order.
    pub inputs: Vec<PinDecl>,
    /// `OUT` declarations, in order.
    pub outputs: Vec<PinDecl>,
    /// Part instantiations, in order.
    pub parts: Vec<PartInstance>,
    /// The span of the whole definition.
    pub span: Span,
}

/// Which declaration list a pin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Declared under `IN`.
    In,
    /// Declared under `OUT`.
    Out,
}

/// A pin declaration such as `sel` or `a[16]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinDecl {
    /// The pin name.
    pub name: Ident,
    /// The declared width; `None` means one bit.
    pub width: Option<u32>,
    /// Source span.
    pub span: Span,
}

impl PinDecl {
    /// The declared width, defaulting to one bit.
    pub fn bit_width(&self) -> u32 {
        self.width.unwrap_or(1)
    }
}

/// A part instantiation such as `And(a=x, b=y, out=z);`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartInstance {
    /// Name of the chip being instantiated.
    pub chip: Ident,
    /// The `jam = pin` bindings, in order.
    pub bindings: Vec<Binding>,
    /// Source span.
    pub span: Span,
}

/// One `jam = pin` pair inside a part's argument list.
///
/// The left side names a pin of the instantiated chip; the right side names a
/// pin or net of the enclosing chip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    /// The instantiated chip's side.
    pub jam: NameRef,
    /// The enclosing chip's side.
    pub pin: NameRef,
    /// Source span.
    pub span: Span,
}

/// A name with an optional bit range: `a`, `a[3]`, `a[0..7]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRef {
    /// The referenced name.
    pub name: Ident,
    /// The bit range, if any.
    pub range: Option<RangeSpec>,
    /// Source span, including the range.
    pub span: Span,
}

/// `[first..last]`, or `[i]` which parses as `first == last == i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// The first bit, inclusive.
    pub first: u32,
    /// The last bit, inclusive.
    pub last: u32,
    /// Source span of the bracketed range.
    pub span: Span,
}
