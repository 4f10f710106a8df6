//! Shared foundational types used across the gatesim HDL engine.
//!
//! This crate provides interned identifiers with case-insensitive lookup keys
//! and the internal error type used for invariant violations.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{GatesimResult, InternalError};
