//! Bit-range masking on `u64` cells.

use gatesim_ir::BitRange;

/// Low `width` bits set. Widths of 64 and above give all ones.
pub fn mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Bits `first..=last` set: `((1 << (last-first+1)) - 1) << first`.
pub fn window_mask(range: BitRange) -> u64 {
    mask(range.width()).checked_shl(range.first).unwrap_or(0)
}

/// Reads the window as a right-aligned value.
pub fn extract(cell: u64, range: BitRange) -> u64 {
    (cell & window_mask(range))
        .checked_shr(range.first)
        .unwrap_or(0)
}

/// Writes the low bits of `value` into the window, keeping every other bit.
pub fn insert(cell: u64, value: u64, range: BitRange) -> u64 {
    let window = window_mask(range);
    let shifted = value.checked_shl(range.first).unwrap_or(0);
    (cell & !window) | (shifted & window)
}
