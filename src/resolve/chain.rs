//! Member-access chain resolution.
//!
//! A chain is what the script parser hands us for an expression like
//! `Doc.Tables["T1"].Axes.Top`: an ordered list of [`AccessStep`]s
//! (identifier, call, index) starting from a known root type. Resolution
//! computes the type after each step, which is what "type at cursor"
//! queries, hover, and completion build on.
//!
//! The COM-specific rules live here:
//!
//! - **Default-member elision**: an object used where a value is expected
//!   implicitly reads its default member, recursively, until a scalar or a
//!   default-less interface is reached. Cycle-guarded: revisiting an
//!   interface without progress is [`AccessError::DefaultPropertyCycle`],
//!   never a hang.
//! - **Indexer routing**: `X[i]` on an interface routes through the
//!   default member chain to the nearest indexer (`X["Q1"]` means
//!   `X.Item["Q1"]`), and an index immediately following an indexer
//!   property binds that property's own indexer.
//! - **Dynamic members**: interfaces flagged for dynamic children
//!   (sub-questions, sub-axes) resolve unknown names to the default
//!   indexer's return type instead of failing.
//! - **Variant transparency**: any operation on a bare `Variant` yields
//!   `Variant`; the value's shape is only known at run time.
//!
//! All failures are typed values; the graph is never affected.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use std::slice;
use thiserror::Error;
use tracing::debug;

use crate::base::Sym;
use crate::catalog::{Interface, Member, Param, ResolvedGraph, ScalarKind, Ty, TyKind};

use super::bind::{BindError, assignable, bind_call};

// ============================================================================
// STEPS
// ============================================================================

/// One step of a dotted/bracketed access chain.
///
/// Call and index arguments arrive as static types; expression evaluation
/// belongs to the language front end.
#[derive(Clone, Debug, PartialEq)]
pub enum AccessStep {
    /// A plain identifier: `.Name`.
    Member(SmolStr),
    /// A call: `.Find(x, y)`.
    Call { name: SmolStr, args: Vec<Ty> },
    /// An index operation: `[expr]`.
    Index(Ty),
}

impl AccessStep {
    pub fn member(name: impl Into<SmolStr>) -> Self {
        AccessStep::Member(name.into())
    }

    pub fn call(name: impl Into<SmolStr>, args: Vec<Ty>) -> Self {
        AccessStep::Call {
            name: name.into(),
            args,
        }
    }

    pub fn index(arg: Ty) -> Self {
        AccessStep::Index(arg)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A chain-resolution failure. Terminates the current chain only; the
/// graph and all other queries are unaffected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AccessError {
    /// The identifier names no member of the interface.
    #[error("`{member}` is not a member of `{interface}`")]
    UnknownMember { interface: SmolStr, member: SmolStr },

    /// The operation is not valid for a scalar of this kind.
    #[error("`{operation}` is not valid on `{scalar}`")]
    NotAMember {
        scalar: ScalarKind,
        operation: SmolStr,
    },

    /// Indexing found no indexer anywhere on the default-member chain.
    #[error("`{type_name}` cannot be indexed")]
    NotIndexable { type_name: SmolStr },

    /// A `Sub` (no return value) was used where a value is expected.
    #[error("`{member}` does not return a value")]
    NoValue { member: SmolStr },

    /// Default-member elision revisited an interface without progress.
    #[error("default member cycle through `{interface}`")]
    DefaultPropertyCycle { interface: SmolStr },

    /// Call or index arguments failed to bind.
    #[error("invalid arguments for `{member}`")]
    Arguments {
        member: SmolStr,
        #[source]
        source: BindError,
    },
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolve a full chain from `root`, then apply value-position elision to
/// the terminal type.
///
/// This is the "what type does this expression have" query: a chain of
/// zero steps on an interface with a zero-argument default member yields
/// that member's type, exactly as if the member had been written out.
pub fn resolve_chain(
    graph: &ResolvedGraph,
    root: Ty,
    steps: &[AccessStep],
) -> Result<Ty, AccessError> {
    debug!(?root, steps = steps.len(), "resolving access chain");
    let mut resolver = ChainResolver::new(graph);
    let mut ty = root;
    for step in steps {
        ty = resolver.step(ty, step)?;
    }
    resolver.value_position(ty)
}

/// The type after every step of a chain, for type-at-position queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainTrace {
    /// The type after each step, without elision; hovering `Doc.Tables`
    /// should show the collection, not its default member.
    pub after_step: Vec<Ty>,
    /// The terminal type with value-position elision applied.
    pub result: Ty,
}

/// Resolve a chain keeping the intermediate type at every step.
pub fn trace_chain(
    graph: &ResolvedGraph,
    root: Ty,
    steps: &[AccessStep],
) -> Result<ChainTrace, AccessError> {
    let mut resolver = ChainResolver::new(graph);
    let mut ty = root;
    let mut after_step = Vec::with_capacity(steps.len());
    for step in steps {
        ty = resolver.step(ty, step)?;
        after_step.push(ty);
    }
    let result = resolver.value_position(ty)?;
    Ok(ChainTrace { after_step, result })
}

struct ChainResolver<'g> {
    graph: &'g ResolvedGraph,
    /// Set when the previous step landed on an indexer property, so that
    /// an immediately following index binds that property's indexer.
    armed: Option<Armed>,
}

struct Armed {
    member: SmolStr,
    param: Param,
    yields: Ty,
}

impl<'g> ChainResolver<'g> {
    fn new(graph: &'g ResolvedGraph) -> Self {
        Self { graph, armed: None }
    }

    fn step(&mut self, ty: Ty, step: &AccessStep) -> Result<Ty, AccessError> {
        match step {
            AccessStep::Member(name) => self.step_member(ty, name),
            AccessStep::Call { name, args } => self.step_call(ty, name, args),
            AccessStep::Index(arg) => self.step_index(ty, arg),
        }
    }

    // ------------------------------------------------------------------
    // Identifier steps
    // ------------------------------------------------------------------

    fn step_member(&mut self, ty: Ty, name: &SmolStr) -> Result<Ty, AccessError> {
        self.armed = None;

        if ty.is_variant() {
            return Ok(Ty::VARIANT);
        }
        let key = match ty.kind {
            TyKind::Scalar(kind) => {
                return Err(AccessError::NotAMember {
                    scalar: kind,
                    operation: name.clone(),
                });
            }
            // Member access on a collection applies to its element, the
            // same way For-Each iteration does.
            TyKind::Interface(key) => key,
        };
        let Some(iface) = self.graph.interface(key) else {
            return Ok(Ty::VARIANT);
        };

        match self.find_member(iface, name) {
            Some(Member::Property(p)) => {
                if let Some(indexer) = &p.indexer {
                    self.armed = Some(Armed {
                        member: p.name.clone(),
                        param: indexer.clone(),
                        yields: p.ty,
                    });
                }
                Ok(p.ty)
            }
            Some(Member::Method(m)) => m.return_ty.ok_or_else(|| AccessError::NoValue {
                member: m.name.clone(),
            }),
            None => self.dynamic_member(iface, name),
        }
    }

    /// Unknown names on a dynamic interface resolve to the default
    /// indexer's return type (a sub-question is "whatever `Item` yields").
    fn dynamic_member(&self, iface: &Interface, name: &SmolStr) -> Result<Ty, AccessError> {
        if iface.has_dynamic_members() {
            if let Some(p) = iface.default_indexer() {
                return Ok(p.ty);
            }
        }
        Err(AccessError::UnknownMember {
            interface: iface.name.clone(),
            member: name.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Call steps
    // ------------------------------------------------------------------

    fn step_call(&mut self, ty: Ty, name: &SmolStr, args: &[Ty]) -> Result<Ty, AccessError> {
        self.armed = None;

        if ty.is_variant() {
            return Ok(Ty::VARIANT);
        }
        let key = match ty.kind {
            TyKind::Scalar(kind) => {
                return Err(AccessError::NotAMember {
                    scalar: kind,
                    operation: name.clone(),
                });
            }
            TyKind::Interface(key) => key,
        };
        let Some(iface) = self.graph.interface(key) else {
            return Ok(Ty::VARIANT);
        };

        // Candidates in order: a method, then an indexer property called
        // with COM call syntax (`X.Item(3)`). First structural match wins;
        // the catalog permits no true overloading.
        match self.find_member(iface, name) {
            Some(Member::Method(m)) => {
                bind_call(&m.params, args).map_err(|source| AccessError::Arguments {
                    member: m.name.clone(),
                    source,
                })?;
                m.return_ty.ok_or_else(|| AccessError::NoValue {
                    member: m.name.clone(),
                })
            }
            Some(Member::Property(p)) => {
                let params: &[Param] = p.indexer.as_ref().map(slice::from_ref).unwrap_or(&[]);
                bind_call(params, args).map_err(|source| AccessError::Arguments {
                    member: p.name.clone(),
                    source,
                })?;
                Ok(p.ty)
            }
            // Arguments to a dynamically named member go unchecked; the
            // child's signature is not in the catalog.
            None => self.dynamic_member(iface, name),
        }
    }

    // ------------------------------------------------------------------
    // Index steps
    // ------------------------------------------------------------------

    fn step_index(&mut self, ty: Ty, arg: &Ty) -> Result<Ty, AccessError> {
        // An index right after an indexer property binds that indexer.
        if let Some(armed) = self.armed.take() {
            self.bind_indexer(&armed.member, &armed.param, arg)?;
            return Ok(armed.yields);
        }

        if ty.is_variant() {
            return Ok(Ty::VARIANT);
        }
        if ty.collection {
            return self.index_collection(ty, arg);
        }
        match ty.kind {
            TyKind::Scalar(kind) => Err(AccessError::NotAMember {
                scalar: kind,
                operation: SmolStr::new_static("[]"),
            }),
            TyKind::Interface(key) => self.index_via_defaults(key, arg),
        }
    }

    /// Index an array-shaped type: the result is the element type. Scalar
    /// arrays take a `Long` subscript; interface collections are indexed
    /// by name or position, so anything goes.
    fn index_collection(&self, ty: Ty, arg: &Ty) -> Result<Ty, AccessError> {
        let expected = match ty.kind {
            TyKind::Scalar(_) => Ty::scalar(ScalarKind::Long),
            TyKind::Interface(_) => Ty::VARIANT,
        };
        if !assignable(&expected, arg) {
            return Err(AccessError::Arguments {
                member: SmolStr::new_static("[]"),
                source: BindError::ArgumentTypeMismatch {
                    index: 0,
                    expected,
                    found: *arg,
                },
            });
        }
        Ok(ty.element())
    }

    /// Route an index through the default-member chain until an indexer
    /// is found: `Questions["Q1"]` means `Questions.Item["Q1"]`.
    fn index_via_defaults(&self, start: Sym, arg: &Ty) -> Result<Ty, AccessError> {
        let mut visited = FxHashSet::default();
        let mut key = start;
        loop {
            if !visited.insert(key) {
                return Err(self.cycle(key));
            }
            let Some(iface) = self.graph.interface(key) else {
                return Ok(Ty::VARIANT);
            };

            if let Some(p) = iface.default_indexer() {
                // default_indexer implies the indexer is present
                if let Some(param) = &p.indexer {
                    self.bind_indexer(&p.name, param, arg)?;
                }
                return Ok(p.ty);
            }

            // No indexer here: elide into the default member's value and
            // keep looking.
            let next = iface.default_member().and_then(|m| implicit_value(&m));
            match next {
                Some(next) if next.is_variant() => return Ok(Ty::VARIANT),
                Some(next) if next.collection => return self.index_collection(next, arg),
                Some(next) => match next.kind {
                    TyKind::Interface(next_key) => key = next_key,
                    TyKind::Scalar(_) => return Err(self.not_indexable(start)),
                },
                None => return Err(self.not_indexable(start)),
            }
        }
    }

    fn bind_indexer(&self, member: &SmolStr, param: &Param, arg: &Ty) -> Result<(), AccessError> {
        bind_call(slice::from_ref(param), slice::from_ref(arg))
            .map(|_| ())
            .map_err(|source| AccessError::Arguments {
                member: member.clone(),
                source,
            })
    }

    // ------------------------------------------------------------------
    // Value-position elision
    // ------------------------------------------------------------------

    /// Apply default-member elision where a value is expected. Recurses
    /// through default members invokable with zero arguments; stops at
    /// scalars, collections, defaults that need an argument, and
    /// default-less interfaces.
    fn value_position(&self, mut ty: Ty) -> Result<Ty, AccessError> {
        let mut visited = FxHashSet::default();
        loop {
            if ty.collection {
                return Ok(ty);
            }
            let Some(key) = ty.as_interface() else {
                return Ok(ty);
            };
            if !visited.insert(key) {
                return Err(self.cycle(key));
            }
            let Some(iface) = self.graph.interface(key) else {
                return Ok(ty);
            };
            let next = iface.default_member().and_then(|m| implicit_value(&m));
            match next {
                Some(next) => ty = next,
                None => return Ok(ty),
            }
        }
    }

    // ------------------------------------------------------------------

    fn find_member(&self, iface: &'g Interface, name: &str) -> Option<Member<'g>> {
        let key = self.graph.interner().get(name)?;
        iface.member(key)
    }

    fn type_name(&self, key: Sym) -> SmolStr {
        self.graph
            .interner()
            .lookup(key)
            .unwrap_or_else(|| SmolStr::new_static("Object"))
    }

    fn cycle(&self, key: Sym) -> AccessError {
        AccessError::DefaultPropertyCycle {
            interface: self.type_name(key),
        }
    }

    fn not_indexable(&self, key: Sym) -> AccessError {
        AccessError::NotIndexable {
            type_name: self.type_name(key),
        }
    }
}

/// The value an interface's default member produces when invoked with no
/// arguments, if it can be. An indexer with a required subscript and a
/// method with required parameters cannot be invoked implicitly.
fn implicit_value(member: &Member<'_>) -> Option<Ty> {
    match member {
        Member::Property(p) => match &p.indexer {
            None => Some(p.ty),
            Some(indexer) if indexer.optional => Some(p.ty),
            Some(_) => None,
        },
        Member::Method(m) if m.required() == 0 => m.return_ty,
        Member::Method(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Argument, InterfaceDef, MethodDef, PropertyDef, ResolvedGraph, TypeRef,
    };

    const VARIANT: Ty = Ty::VARIANT;
    const LONG: Ty = Ty::scalar(ScalarKind::Long);
    const STRING: Ty = Ty::scalar(ScalarKind::String);

    fn graph() -> ResolvedGraph {
        ResolvedGraph::build(vec![
            InterfaceDef::new("IDocument")
                .with_property(
                    PropertyDef::new("Tables", TypeRef::named("ITables")).readonly(),
                )
                .with_method(MethodDef::sub("Save").with_argument(
                    Argument::new("Path", TypeRef::scalar(ScalarKind::String)),
                )),
            InterfaceDef::new("ITables")
                .with_default_member("Item")
                .with_property(
                    PropertyDef::new("Item", TypeRef::named("ITable")).with_indexer(
                        Argument::new("Index", TypeRef::scalar(ScalarKind::Variant)),
                    ),
                )
                .with_property(PropertyDef::new("Count", TypeRef::scalar(ScalarKind::Long))),
            InterfaceDef::new("ITable")
                .with_property(PropertyDef::new("Name", TypeRef::scalar(ScalarKind::String))),
        ])
        .unwrap()
    }

    #[test]
    fn test_plain_member_chain() {
        let g = graph();
        let ty = resolve_chain(
            &g,
            g.interface_ty("IDocument").unwrap(),
            &[
                AccessStep::member("Tables"),
                AccessStep::index(STRING),
                AccessStep::member("Name"),
            ],
        )
        .unwrap();
        assert_eq!(ty, STRING);
    }

    #[test]
    fn test_index_routes_through_default_member() {
        let g = graph();
        // Tables[...] without naming Item
        let direct = resolve_chain(
            &g,
            g.interface_ty("ITables").unwrap(),
            &[AccessStep::index(STRING)],
        )
        .unwrap();
        let explicit = resolve_chain(
            &g,
            g.interface_ty("ITables").unwrap(),
            &[AccessStep::member("Item"), AccessStep::index(STRING)],
        )
        .unwrap();
        assert_eq!(direct, explicit);
        assert_eq!(direct, g.interface_ty("ITable").unwrap());
    }

    #[test]
    fn test_unknown_member_error_names_interface() {
        let g = graph();
        let err = resolve_chain(
            &g,
            g.interface_ty("ITable").unwrap(),
            &[AccessStep::member("Axes")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AccessError::UnknownMember {
                interface: "ITable".into(),
                member: "Axes".into()
            }
        );
    }

    #[test]
    fn test_member_on_scalar_is_not_a_member() {
        let g = graph();
        let err = resolve_chain(&g, LONG, &[AccessStep::member("Name")]).unwrap_err();
        assert!(matches!(err, AccessError::NotAMember { scalar: ScalarKind::Long, .. }));
    }

    #[test]
    fn test_variant_is_transparent() {
        let g = graph();
        let ty = resolve_chain(
            &g,
            VARIANT,
            &[
                AccessStep::member("Anything"),
                AccessStep::index(LONG),
                AccessStep::call("AtAll", vec![LONG]),
            ],
        )
        .unwrap();
        assert_eq!(ty, VARIANT);
    }

    #[test]
    fn test_void_call_in_value_position() {
        let g = graph();
        let err = resolve_chain(
            &g,
            g.interface_ty("IDocument").unwrap(),
            &[AccessStep::call("Save", vec![STRING])],
        )
        .unwrap_err();
        assert_eq!(err, AccessError::NoValue { member: "Save".into() });
    }

    #[test]
    fn test_call_arguments_are_bound() {
        let g = graph();
        let err = resolve_chain(
            &g,
            g.interface_ty("IDocument").unwrap(),
            &[AccessStep::call("Save", vec![])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AccessError::Arguments {
                source: BindError::TooFewArguments { required: 1, supplied: 0 },
                ..
            }
        ));
    }

    #[test]
    fn test_trace_keeps_intermediate_types() {
        let g = graph();
        let trace = trace_chain(
            &g,
            g.interface_ty("IDocument").unwrap(),
            &[AccessStep::member("Tables"), AccessStep::member("Count")],
        )
        .unwrap();
        assert_eq!(trace.after_step[0], g.interface_ty("ITables").unwrap());
        assert_eq!(trace.after_step[1], LONG);
        assert_eq!(trace.result, LONG);
    }

    #[test]
    fn test_scalar_collection_indexes_by_long() {
        let g = ResolvedGraph::build(vec![
            InterfaceDef::new("IDocument").with_method(
                MethodDef::new("TableNames", TypeRef::scalar(ScalarKind::String))
                    .returns_collection(),
            ),
        ])
        .unwrap();
        let root = g.interface_ty("IDocument").unwrap();

        let ok = resolve_chain(
            &g,
            root,
            &[AccessStep::call("TableNames", vec![]), AccessStep::index(LONG)],
        )
        .unwrap();
        assert_eq!(ok, STRING);

        let err = resolve_chain(
            &g,
            root,
            &[AccessStep::call("TableNames", vec![]), AccessStep::index(STRING)],
        )
        .unwrap_err();
        assert!(matches!(err, AccessError::Arguments { .. }));
    }
}
