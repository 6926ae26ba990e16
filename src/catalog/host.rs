//! Session-lifetime ownership of the current resolved graph.
//!
//! The graph is built once when the catalog loads and shared read-only by
//! every editor request. A hot reload builds a fresh graph and swaps it in
//! wholesale; requests already holding a snapshot keep the old graph alive
//! until they finish. There is no partial-result visibility; a snapshot
//! is always a fully built graph.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use super::defs::InterfaceDef;
use super::errors::CatalogError;
use super::graph::ResolvedGraph;

/// Holds the session's current [`ResolvedGraph`], copy-on-reload.
///
/// ```
/// use mrscript::catalog::{GraphHost, InterfaceDef};
///
/// let host = GraphHost::load(vec![InterfaceDef::new("IDocument")]).unwrap();
/// let graph = host.snapshot();
/// assert!(graph.interface_by_name("IDocument").is_some());
/// ```
pub struct GraphHost {
    current: RwLock<Arc<ResolvedGraph>>,
}

impl GraphHost {
    /// Build the initial graph from a catalog.
    ///
    /// Fails (with the full error batch) rather than hosting a partially
    /// wired graph.
    pub fn load(catalog: Vec<InterfaceDef>) -> Result<Self, Vec<CatalogError>> {
        let graph = ResolvedGraph::build(catalog)?;
        info!(interfaces = graph.len(), "catalog loaded");
        Ok(Self {
            current: RwLock::new(Arc::new(graph)),
        })
    }

    /// Get the current graph. The returned `Arc` stays valid across
    /// reloads; it simply stops being "current".
    pub fn snapshot(&self) -> Arc<ResolvedGraph> {
        self.current.read().clone()
    }

    /// Rebuild from an edited catalog and swap the result in.
    ///
    /// On failure the previous graph stays current, so editors keep
    /// serving from the last good catalog.
    pub fn reload(&self, catalog: Vec<InterfaceDef>) -> Result<(), Vec<CatalogError>> {
        let graph = ResolvedGraph::build(catalog)?;
        info!(interfaces = graph.len(), "catalog reloaded");
        *self.current.write() = Arc::new(graph);
        Ok(())
    }
}
