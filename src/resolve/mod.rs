//! Queries over a resolved graph.
//!
//! Two query families, both pure and lock-free over an immutable
//! [`ResolvedGraph`](crate::catalog::ResolvedGraph):
//!
//! - [`resolve_chain`] / [`trace_chain`] compute the type of a
//!   member-access chain, applying COM default-member elision, indexer
//!   routing, and dynamic-member fallback.
//! - [`bind_call`] matches call-site argument types against a declared
//!   parameter list for signature help and call diagnostics.

mod bind;
mod chain;

pub use bind::{BindError, Binding, BoundArg, assignable, bind_call};
pub use chain::{AccessError, AccessStep, ChainTrace, resolve_chain, trace_chain};
