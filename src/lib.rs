//! # mrscript-base
//!
//! Core library for the mrScript object-model catalog: type resolution,
//! member lookup, and call binding.
//!
//! The built-in COM Automation object model (interfaces such as `IDocument`,
//! `IQuestion`, `ITable`) is supplied to this crate as an in-memory catalog
//! of declarations. This crate links that catalog into an immutable graph
//! and answers the queries editor tooling needs: "what type is the
//! expression at the cursor", "what members does it have", "do these call
//! arguments fit this signature".
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! resolve  → member-access chains + argument binding (graph queries)
//!   ↓
//! catalog  → definition model, placeholder resolver, resolved graph
//!   ↓
//! base     → primitives (case-insensitive name interning)
//! ```
//!
//! ## Usage
//!
//! ```
//! use mrscript::catalog::{InterfaceDef, PropertyDef, ResolvedGraph, ScalarKind, TypeRef};
//! use mrscript::resolve::{resolve_chain, AccessStep};
//!
//! let catalog = vec![
//!     InterfaceDef::new("IStyle")
//!         .with_property(PropertyDef::new("Width", TypeRef::scalar(ScalarKind::Long))),
//! ];
//! let graph = ResolvedGraph::build(catalog).expect("catalog is well formed");
//!
//! let root = graph.interface_ty("IStyle").unwrap();
//! let ty = resolve_chain(&graph, root, &[AccessStep::member("Width")]).unwrap();
//! assert!(ty.is_scalar(ScalarKind::Long));
//! ```
//!
//! The graph is built once per session and shared read-only; hot reload
//! replaces it wholesale (see [`catalog::GraphHost`]).

/// Foundation types: case-insensitive name interning.
pub mod base;

/// The object-model catalog: definition model, placeholder resolution,
/// and the resolved interface graph.
pub mod catalog;

/// Queries over a resolved graph: member-access chain resolution and
/// call-site argument binding.
pub mod resolve;

// Re-export commonly needed items
pub use base::{Interner, Sym};
pub use catalog::{CatalogError, GraphHost, ResolvedGraph, ScalarKind, Ty, TyKind};
pub use resolve::{AccessError, AccessStep, BindError, Binding, bind_call, resolve_chain};
