//! Opaque ID newtypes for chips, pins and parts.
//!
//! A [`PinId`] is the pin's stable index into its chip's per-instance cell
//! array; a [`PartId`] is the part's stable index into its parent's
//! child-state array; a [`ChipId`] is a handle into the chip table of a
//! `Context` or a `Netlist`.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

define_id!(
    /// Handle of a chip definition.
    ChipId
);

define_id!(
    /// Index of a pin within its chip.
    PinId
);

define_id!(
    /// Index of a part within its parent chip.
    PartId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_and_display() {
        let id = PartId::from_raw(4);
        assert_eq!(id.as_raw(), 4);
        assert_eq!(ArenaId::index(id), 4);
        assert_eq!(id.to_string(), "#4");
    }

    #[test]
    fn ids_order_by_index() {
        assert!(PinId::from_raw(1) < PinId::from_raw(2));
    }
}
