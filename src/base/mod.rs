//! Foundation types for the mrScript object-model core.
//!
//! This module provides the primitives used throughout the crate:
//! - [`Sym`], [`Interner`] - case-insensitive string interning
//!
//! This module has NO dependencies on other mrscript modules.

mod intern;

pub use intern::{Interner, Sym};
