//! Build-time catalog errors.
//!
//! Everything here is fatal to graph construction: the resolver collects
//! the whole batch and returns it instead of a graph, so one catalog edit
//! surfaces every break at once. A partially wired graph is never handed
//! out; completion running on one would recommend members that do not
//! exist.

use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// Where in the catalog an error was found: the owning interface and,
/// when the error is inside a member, that member's name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclSite {
    pub interface: SmolStr,
    pub member: Option<SmolStr>,
}

impl DeclSite {
    pub fn interface(interface: impl Into<SmolStr>) -> Self {
        Self {
            interface: interface.into(),
            member: None,
        }
    }

    pub fn member(interface: impl Into<SmolStr>, member: impl Into<SmolStr>) -> Self {
        Self {
            interface: interface.into(),
            member: Some(member.into()),
        }
    }
}

impl fmt::Display for DeclSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}.{}", self.interface, member),
            None => f.write_str(&self.interface),
        }
    }
}

/// A fatal error found while building the resolved graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A placeholder names an interface absent from the catalog.
    #[error("unknown type `{name}` referenced from {referenced_from}")]
    UnknownType {
        name: SmolStr,
        referenced_from: DeclSite,
    },

    /// Two top-level interfaces share a name (case-insensitively).
    #[error("duplicate interface `{name}`")]
    DuplicateInterface { name: SmolStr },

    /// Two members of one interface share a name (case-insensitively).
    #[error("duplicate member `{site}`")]
    DuplicateMember { site: DeclSite },

    /// A non-optional argument carries a default value.
    #[error("required argument `{argument}` of {site} has a default value")]
    RequiredWithDefault { site: DeclSite, argument: SmolStr },

    /// A required argument follows an optional one.
    #[error("required argument `{argument}` of {site} follows an optional argument")]
    RequiredAfterOptional { site: DeclSite, argument: SmolStr },

    /// A variadic argument is not in final position.
    #[error("variadic argument `{argument}` of {site} is not the final argument")]
    VariadicNotLast { site: DeclSite, argument: SmolStr },

    /// An indexer argument is marked variadic.
    #[error("indexer argument of {site} is marked variadic")]
    VariadicIndexer { site: DeclSite },

    /// The declared default member does not exist on the interface.
    #[error("default member `{member}` of `{interface}` is not declared")]
    DefaultMemberUnknown {
        interface: SmolStr,
        member: SmolStr,
    },

    /// Dynamic members require a default indexer property to type the
    /// unknown names through.
    #[error("interface `{site}` permits dynamic members but has no default indexer")]
    DynamicWithoutIndexer { site: DeclSite },
}
