//! Per-instance value stores.
//!
//! A [`State`] holds one `u64` cell per pin of its chip, indexed by
//! [`PinId`], and one optional child state per part, indexed by [`PartId`].
//! Children are created on first use, so a state tree only grows as deep as
//! evaluation actually reaches. The netlist is only borrowed: a state never
//! changes a definition, and any number of states may share one netlist.

use gatesim_common::Interner;
use gatesim_ir::{BitRange, Chip, ChipId, Netlist, PartId, PinId, Wire, WireDirection};

use crate::bits;
use crate::error::SimError;

/// Values of one chip instance and its lazily created children.
#[derive(Debug, Clone)]
pub struct State<'n> {
    netlist: &'n Netlist,
    id: ChipId,
    chip: &'n Chip,
    cells: Vec<u64>,
    children: Vec<Option<Box<State<'n>>>>,
}

impl<'n> State<'n> {
    /// Creates a zeroed state for one chip of the netlist.
    pub fn new(netlist: &'n Netlist, id: ChipId) -> Result<Self, SimError> {
        let chip = netlist.chip(id).ok_or(SimError::ChipNotFound(id))?;
        Ok(Self {
            netlist,
            id,
            chip,
            cells: vec![0; chip.pins.len()],
            children: vec![None; chip.parts.len()],
        })
    }

    /// Creates a zeroed state for the netlist's top chip.
    pub fn for_top(netlist: &'n Netlist) -> Result<Self, SimError> {
        Self::new(netlist, netlist.top())
    }

    /// The chip this state belongs to.
    pub fn chip(&self) -> &'n Chip {
        self.chip
    }

    /// The chip's ID in the netlist.
    pub fn chip_id(&self) -> ChipId {
        self.id
    }

    /// Full value of a pin. Pins outside the chip read as zero; use
    /// [`try_get`](Self::try_get) to detect them.
    pub fn get(&self, pin: PinId) -> u64 {
        self.cells.get(pin.as_raw() as usize).copied().unwrap_or(0)
    }

    /// Sets a pin, masked to its width. Returns whether the cell changed.
    pub fn set(&mut self, pin: PinId, value: u64) -> bool {
        let Some(width) = self.chip.pin(pin).map(|p| p.width) else {
            return false;
        };
        self.write(pin, value & bits::mask(width))
    }

    /// Reads bits `first..=last` of a pin, right-aligned.
    pub fn get_range(&self, pin: PinId, first: u32, last: u32) -> u64 {
        bits::extract(self.get(pin), BitRange::new(first, last))
    }

    /// Writes the low bits of `value` into bits `first..=last` of a pin,
    /// preserving the rest. Returns whether the cell changed.
    pub fn set_range(&mut self, pin: PinId, value: u64, first: u32, last: u32) -> bool {
        let range = BitRange::new(first, last);
        let Some(width) = self.chip.pin(pin).map(|p| p.width) else {
            return false;
        };
        let cell = bits::insert(self.get(pin), value, range) & bits::mask(width);
        self.write(pin, cell)
    }

    /// Like [`get`](Self::get), but rejects pins outside the chip.
    pub fn try_get(&self, pin: PinId) -> Result<u64, SimError> {
        self.check_pin(pin)?;
        Ok(self.get(pin))
    }

    /// Like [`set`](Self::set), but rejects pins outside the chip.
    pub fn try_set(&mut self, pin: PinId, value: u64) -> Result<bool, SimError> {
        self.check_pin(pin)?;
        Ok(self.set(pin, value))
    }

    fn check_pin(&self, pin: PinId) -> Result<(), SimError> {
        if self.chip.pin(pin).is_some() {
            Ok(())
        } else {
            Err(SimError::InvalidPin {
                chip: self.id,
                pin,
            })
        }
    }

    fn write(&mut self, pin: PinId, value: u64) -> bool {
        match self.cells.get_mut(pin.as_raw() as usize) {
            Some(cell) if *cell != value => {
                *cell = value;
                true
            }
            _ => false,
        }
    }

    fn window(&self, pin: PinId, range: Option<BitRange>) -> Result<BitRange, SimError> {
        let def = self.chip.pin(pin).ok_or(SimError::InvalidPin {
            chip: self.id,
            pin,
        })?;
        Ok(range.unwrap_or_else(|| def.full_range()))
    }

    /// The state of a part, if it has been created.
    pub fn child(&self, part: PartId) -> Option<&State<'n>> {
        self.children.get(part.as_raw() as usize)?.as_deref()
    }

    /// The state of a part, created on first use.
    pub fn child_mut(&mut self, part: PartId) -> Result<&mut State<'n>, SimError> {
        let chip = self
            .chip
            .parts
            .get(part)
            .map(|p| p.chip)
            .ok_or(SimError::InvalidPart {
                chip: self.id,
                part,
            })?;
        let netlist = self.netlist;
        let slot = self
            .children
            .get_mut(part.as_raw() as usize)
            .ok_or(SimError::InvalidPart {
                chip: self.id,
                part,
            })?;
        if slot.is_none() {
            *slot = Some(Box::new(State::new(netlist, chip)?));
        }
        slot.as_deref_mut().ok_or(SimError::InvalidPart {
            chip: self.id,
            part,
        })
    }

    /// Copies one wire across the boundary to a part if the two ends differ.
    ///
    /// `Drive` wires copy from this state into the part, `Sense` wires from
    /// the part into this state. Returns whether anything was copied.
    pub fn assign(&mut self, part: PartId, wire: &Wire) -> Result<bool, SimError> {
        let parent_window = self.window(wire.parent, wire.parent_range)?;
        let parent_value = bits::extract(self.get(wire.parent), parent_window);
        let child = self.child_mut(part)?;
        let child_window = child.window(wire.child, wire.child_range)?;
        let child_value = bits::extract(child.get(wire.child), child_window);
        if parent_value == child_value {
            return Ok(false);
        }
        Ok(match wire.direction {
            WireDirection::Drive => {
                let cell = bits::insert(child.get(wire.child), parent_value, child_window);
                child.write(wire.child, cell)
            }
            WireDirection::Sense => {
                let cell = bits::insert(self.get(wire.parent), child_value, parent_window);
                self.write(wire.parent, cell)
            }
        })
    }

    /// Zeroes every cell and drops all child states.
    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0);
        self.children.iter_mut().for_each(|c| *c = None);
    }

    /// Finds a pin of this chip by case-insensitive name.
    pub fn pin_named(&self, interner: &Interner, name: &str) -> Result<PinId, SimError> {
        interner
            .get(&name.to_ascii_lowercase())
            .and_then(|key| self.chip.find_pin(key))
            .ok_or_else(|| SimError::UnknownPin {
                name: name.to_string(),
            })
    }

    /// Reads a pin by name.
    pub fn get_named(&self, interner: &Interner, name: &str) -> Result<u64, SimError> {
        Ok(self.get(self.pin_named(interner, name)?))
    }

    /// Sets a pin by name, rejecting values wider than the pin.
    pub fn set_named(&mut self, interner: &Interner, name: &str, value: u64) -> Result<bool, SimError> {
        let pin = self.pin_named(interner, name)?;
        let width = self.chip.pin(pin).map_or(0, |p| p.width);
        if value & !bits::mask(width) != 0 {
            return Err(SimError::ValueTooWide {
                name: name.to_string(),
                value,
                width,
            });
        }
        Ok(self.set(pin, value))
    }
}
