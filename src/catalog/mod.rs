//! The object-model catalog: definitions, placeholder resolution, and the
//! resolved interface graph.
//!
//! The catalog arrives as inert data: a sequence of [`InterfaceDef`]
//! values whose type positions may reference interfaces declared later or
//! cyclically. [`ResolvedGraph::build`] links it into an immutable,
//! name-keyed graph or reports every break in one batch.
//!
//! Lifecycle: built once per session, replaced wholesale on hot reload
//! ([`GraphHost`]). Consumers never mutate resolved definitions.

mod defs;
mod errors;
mod graph;
mod host;

pub use defs::{
    Argument, DefaultValue, InterfaceDef, MethodDef, Placeholder, PropertyDef, ScalarKind, TypeRef,
};
pub use errors::{CatalogError, DeclSite};
pub use graph::{Interface, Member, Method, Param, Property, ResolvedGraph, Ty, TyKind};
pub use host::GraphHost;
