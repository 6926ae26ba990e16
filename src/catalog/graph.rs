//! The resolved graph: placeholder resolution and the linked catalog.
//!
//! [`ResolvedGraph::build`] is the placeholder resolver. It runs two
//! passes over the catalog:
//!
//! 1. **Index**: intern every interface name into a name → interface
//!    index. This is what makes forward references work: a declaration
//!    never needs to appear before its users.
//! 2. **Link**: walk every type position (returns, arguments, indexers)
//!    and replace each [`Placeholder`](super::Placeholder) with a [`Ty`]
//!    holding the interned key of its target. References stay by-name:
//!    the graph is a `Sym → Interface` map and cycles are ordinary
//!    back-edges, never owned pointers, so `IQuestion → ICategories →
//!    ICategory → IQuestion` is plain data.
//!
//! Unknown placeholder targets and structural invariant violations are
//! collected across the whole catalog; if any were found, `build` returns
//! the batch and no graph. After a successful build the graph is immutable
//! and freely shared across threads.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::base::{Interner, Sym};
use smol_str::SmolStr;

use super::defs::{Argument, DefaultValue, InterfaceDef, ScalarKind, TypeRef};
use super::errors::{CatalogError, DeclSite};

// ============================================================================
// RESOLVED TYPES
// ============================================================================

/// The kind of a resolved type: a scalar, or an interface referenced by
/// its interned key into the graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyKind {
    Scalar(ScalarKind),
    Interface(Sym),
}

/// A fully resolved type: a kind plus a collection shape.
///
/// `collection` models array-of-T uniformly, whether the array came from a
/// `[]`-shaped return type or a collection-flagged member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ty {
    pub kind: TyKind,
    pub collection: bool,
}

impl Ty {
    pub const VARIANT: Ty = Ty::scalar(ScalarKind::Variant);

    pub const fn scalar(kind: ScalarKind) -> Self {
        Self {
            kind: TyKind::Scalar(kind),
            collection: false,
        }
    }

    pub const fn interface(key: Sym) -> Self {
        Self {
            kind: TyKind::Interface(key),
            collection: false,
        }
    }

    /// The same type with the collection shape set.
    pub const fn as_collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// The element type of a collection (the same kind, shape cleared).
    pub const fn element(mut self) -> Self {
        self.collection = false;
        self
    }

    pub fn is_scalar(&self, kind: ScalarKind) -> bool {
        !self.collection && self.kind == TyKind::Scalar(kind)
    }

    /// A bare `Variant` (not a variant collection).
    pub fn is_variant(&self) -> bool {
        self.is_scalar(ScalarKind::Variant)
    }

    pub fn as_interface(&self) -> Option<Sym> {
        match self.kind {
            TyKind::Interface(key) => Some(key),
            TyKind::Scalar(_) => None,
        }
    }
}

// ============================================================================
// RESOLVED MEMBERS
// ============================================================================

/// A resolved method parameter or indexer argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: SmolStr,
    pub ty: Ty,
    pub optional: bool,
    pub default: Option<DefaultValue>,
    pub variadic: bool,
}

/// A resolved method.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    /// Declared spelling.
    pub name: SmolStr,
    pub key: Sym,
    /// `None` for a `Sub`.
    pub return_ty: Option<Ty>,
    pub params: Vec<Param>,
}

impl Method {
    /// Number of leading required parameters.
    pub fn required(&self) -> usize {
        self.params.iter().take_while(|p| !p.optional && !p.variadic).count()
    }
}

/// A resolved property.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    /// Declared spelling.
    pub name: SmolStr,
    pub key: Sym,
    /// The property's value type, collection shape included.
    pub ty: Ty,
    pub readonly: bool,
    pub indexer: Option<Param>,
}

/// Either kind of resolved member, as returned by name lookup.
#[derive(Copy, Clone, Debug)]
pub enum Member<'a> {
    Method(&'a Method),
    Property(&'a Property),
}

impl<'a> Member<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Member::Method(m) => &m.name,
            Member::Property(p) => &p.name,
        }
    }

    /// The type this member has when read in value position.
    /// `None` for a `Sub`.
    pub fn value_ty(&self) -> Option<Ty> {
        match self {
            Member::Method(m) => m.return_ty,
            Member::Property(p) => Some(p.ty),
        }
    }

    pub fn as_property(&self) -> Option<&'a Property> {
        match self {
            Member::Property(p) => Some(p),
            Member::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&'a Method> {
        match self {
            Member::Method(m) => Some(m),
            Member::Property(_) => None,
        }
    }
}

// ============================================================================
// RESOLVED INTERFACES
// ============================================================================

/// A fully linked interface: every type position holds a [`Ty`].
#[derive(Clone, Debug, PartialEq)]
pub struct Interface {
    /// Declared spelling.
    pub name: SmolStr,
    pub key: Sym,
    default_member: Option<Sym>,
    dynamic_members: bool,
    methods: IndexMap<Sym, Method>,
    properties: IndexMap<Sym, Property>,
}

impl Interface {
    /// Look up a member by interned name. Properties and methods share one
    /// namespace; the catalog guarantees no true overloading.
    pub fn member(&self, key: Sym) -> Option<Member<'_>> {
        if let Some(p) = self.properties.get(&key) {
            return Some(Member::Property(p));
        }
        self.methods.get(&key).map(Member::Method)
    }

    pub fn property(&self, key: Sym) -> Option<&Property> {
        self.properties.get(&key)
    }

    pub fn method(&self, key: Sym) -> Option<&Method> {
        self.methods.get(&key)
    }

    /// The interface's default member, if declared.
    pub fn default_member(&self) -> Option<Member<'_>> {
        self.default_member.and_then(|key| self.member(key))
    }

    /// The default member when it is an indexer property.
    pub fn default_indexer(&self) -> Option<&Property> {
        self.default_member()
            .and_then(|m| m.as_property())
            .filter(|p| p.indexer.is_some())
    }

    /// Whether unknown member names fall back to the default indexer.
    pub fn has_dynamic_members(&self) -> bool {
        self.dynamic_members
    }

    /// Properties in declaration order (completion lists follow the
    /// catalog's ordering).
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    /// All members, properties first, in declaration order.
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.properties
            .values()
            .map(Member::Property)
            .chain(self.methods.values().map(Member::Method))
    }
}

// ============================================================================
// RESOLVED GRAPH
// ============================================================================

/// The fully linked, immutable form of the catalog.
///
/// Owns the interner and every resolved definition. All query APIs take
/// `&self`; there is no mutation API, so arbitrarily many editor requests
/// may share one graph without locks. Hot reload builds a fresh graph and
/// swaps it wholesale (see [`GraphHost`](super::GraphHost)).
#[derive(Debug)]
pub struct ResolvedGraph {
    interner: Interner,
    interfaces: IndexMap<Sym, Interface>,
}

impl PartialEq for ResolvedGraph {
    /// Structural equality. `Sym` keys are assigned in catalog order, so
    /// two builds of the same catalog compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.interfaces == other.interfaces
    }
}

impl ResolvedGraph {
    /// Build a resolved graph from a catalog of declarations.
    ///
    /// Returns every error found, unknown placeholder targets and
    /// structural invariant violations alike, rather than stopping at
    /// the first. No graph is returned unless the catalog is fully wired.
    ///
    /// Building is idempotent and side-effect-free: the same catalog
    /// yields structurally equal graphs.
    pub fn build(catalog: Vec<InterfaceDef>) -> Result<ResolvedGraph, Vec<CatalogError>> {
        Linker::new().link(catalog)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Look up an interface by interned key.
    pub fn interface(&self, key: Sym) -> Option<&Interface> {
        self.interfaces.get(&key)
    }

    /// Look up an interface by name (case-insensitive).
    pub fn interface_by_name(&self, name: &str) -> Option<&Interface> {
        let key = self.interner.get(name)?;
        self.interfaces.get(&key)
    }

    /// The `Ty` of an instance of the named interface, for use as a chain
    /// root.
    pub fn interface_ty(&self, name: &str) -> Option<Ty> {
        self.interface_by_name(name).map(|i| Ty::interface(i.key))
    }

    /// All interfaces in catalog order.
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Render a type for hover/diagnostic display, e.g. `ICategory[]`.
    pub fn display_ty(&self, ty: &Ty) -> String {
        let mut out = String::new();
        match ty.kind {
            TyKind::Scalar(kind) => {
                let _ = write!(out, "{kind}");
            }
            TyKind::Interface(key) => match self.interner.lookup(key) {
                Some(name) => out.push_str(&name),
                None => out.push_str("Object"),
            },
        }
        if ty.collection {
            out.push_str("[]");
        }
        out
    }
}

// ============================================================================
// LINKER (the placeholder resolver)
// ============================================================================

struct Linker {
    interner: Interner,
    known: FxHashSet<Sym>,
    errors: Vec<CatalogError>,
}

impl Linker {
    fn new() -> Self {
        Self {
            interner: Interner::new(),
            known: FxHashSet::default(),
            errors: Vec::new(),
        }
    }

    fn link(mut self, catalog: Vec<InterfaceDef>) -> Result<ResolvedGraph, Vec<CatalogError>> {
        // Pass 1: index every interface name so later passes can resolve
        // forward references.
        for def in &catalog {
            let key = self.interner.intern(&def.name);
            if !self.known.insert(key) {
                self.errors.push(CatalogError::DuplicateInterface {
                    name: def.name.clone(),
                });
            }
        }

        // Pass 2: link each declaration, replacing placeholders with
        // by-name keys and checking structural invariants.
        let mut interfaces = IndexMap::with_capacity(catalog.len());
        for def in &catalog {
            let interface = self.link_interface(def);
            interfaces.insert(interface.key, interface);
        }

        if !self.errors.is_empty() {
            warn!(errors = self.errors.len(), "catalog failed to resolve");
            return Err(self.errors);
        }

        debug!(interfaces = interfaces.len(), "catalog graph built");
        Ok(ResolvedGraph {
            interner: self.interner,
            interfaces,
        })
    }

    fn link_interface(&mut self, def: &InterfaceDef) -> Interface {
        let key = self.interner.intern(&def.name);
        let mut seen = FxHashSet::default();
        let mut methods = IndexMap::with_capacity(def.methods.len());
        let mut properties = IndexMap::with_capacity(def.properties.len());

        for prop in &def.properties {
            let prop_key = self.intern_member(&def.name, &prop.name, &mut seen);
            let site = DeclSite::member(def.name.clone(), prop.name.clone());

            let indexer = prop.indexer.as_ref().map(|arg| {
                if arg.variadic {
                    self.errors.push(CatalogError::VariadicIndexer { site: site.clone() });
                }
                self.link_argument(arg, &site)
            });

            let ty = self.link_type(&prop.return_type, prop.collection, &site);
            properties.insert(
                prop_key,
                Property {
                    name: prop.name.clone(),
                    key: prop_key,
                    ty,
                    readonly: prop.readonly,
                    indexer,
                },
            );
        }

        for method in &def.methods {
            let method_key = self.intern_member(&def.name, &method.name, &mut seen);
            let site = DeclSite::member(def.name.clone(), method.name.clone());

            let params = self.link_params(&method.arguments, &site);
            let return_ty = method
                .return_type
                .as_ref()
                .map(|ty| self.link_type(ty, method.collection, &site));

            methods.insert(
                method_key,
                Method {
                    name: method.name.clone(),
                    key: method_key,
                    return_ty,
                    params,
                },
            );
        }

        let default_member = def.default_member.as_ref().and_then(|name| {
            let member_key = self.interner.intern(name);
            if properties.contains_key(&member_key) || methods.contains_key(&member_key) {
                Some(member_key)
            } else {
                self.errors.push(CatalogError::DefaultMemberUnknown {
                    interface: def.name.clone(),
                    member: name.clone(),
                });
                None
            }
        });

        if def.dynamic_members {
            let has_default_indexer = default_member
                .and_then(|key| properties.get(&key))
                .is_some_and(|p| p.indexer.is_some());
            if !has_default_indexer {
                self.errors.push(CatalogError::DynamicWithoutIndexer {
                    site: DeclSite::interface(def.name.clone()),
                });
            }
        }

        Interface {
            name: def.name.clone(),
            key,
            default_member,
            dynamic_members: def.dynamic_members,
            methods,
            properties,
        }
    }

    fn intern_member(&mut self, interface: &SmolStr, name: &SmolStr, seen: &mut FxHashSet<Sym>) -> Sym {
        let key = self.interner.intern(name);
        if !seen.insert(key) {
            self.errors.push(CatalogError::DuplicateMember {
                site: DeclSite::member(interface.clone(), name.clone()),
            });
        }
        key
    }

    fn link_params(&mut self, arguments: &[Argument], site: &DeclSite) -> Vec<Param> {
        let mut saw_optional = false;
        let last = arguments.len().saturating_sub(1);
        arguments
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                if arg.optional {
                    saw_optional = true;
                } else {
                    if arg.default.is_some() {
                        self.errors.push(CatalogError::RequiredWithDefault {
                            site: site.clone(),
                            argument: arg.name.clone(),
                        });
                    }
                    if saw_optional && !arg.variadic {
                        self.errors.push(CatalogError::RequiredAfterOptional {
                            site: site.clone(),
                            argument: arg.name.clone(),
                        });
                    }
                }
                if arg.variadic && i != last {
                    self.errors.push(CatalogError::VariadicNotLast {
                        site: site.clone(),
                        argument: arg.name.clone(),
                    });
                }
                self.link_argument(arg, site)
            })
            .collect()
    }

    fn link_argument(&mut self, arg: &Argument, site: &DeclSite) -> Param {
        Param {
            name: arg.name.clone(),
            ty: self.link_type(&arg.ty, arg.variadic, site),
            optional: arg.optional,
            default: arg.default.clone(),
            variadic: arg.variadic,
        }
    }

    /// Replace a `TypeRef` with a resolved `Ty`. An unknown placeholder
    /// target is recorded and `Variant` returned in its place; the
    /// fallback is never observable because any error aborts the build.
    fn link_type(&mut self, ty: &TypeRef, collection: bool, site: &DeclSite) -> Ty {
        match ty {
            TypeRef::Scalar(kind) => Ty {
                kind: TyKind::Scalar(*kind),
                collection,
            },
            TypeRef::Named(placeholder) => {
                let key = self.interner.intern(&placeholder.target);
                if !self.known.contains(&key) {
                    self.errors.push(CatalogError::UnknownType {
                        name: placeholder.target.clone(),
                        referenced_from: site.clone(),
                    });
                    return Ty::VARIANT;
                }
                Ty {
                    kind: TyKind::Interface(key),
                    collection: collection || placeholder.collection,
                }
            }
        }
    }
}
