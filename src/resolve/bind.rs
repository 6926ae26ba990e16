//! Call-site argument binding.
//!
//! Binds the static types of a call's arguments against a declared
//! parameter list: arity against the required/optional/variadic window,
//! then per-argument assignability. Binding is positional; the catalog's
//! call convention has no named arguments.
//!
//! Assignability is permissive, matching a dynamically typed source
//! language: `Variant` accepts and is accepted by anything, `Null`
//! assigns anywhere, interfaces are interchangeable (the catalog carries
//! no inheritance data). Only clearly wrong shapes are flagged: an
//! interface where a `Long` is required, `String` where `Boolean` is
//! required, and the like. `Long` widens to `Double`.

use thiserror::Error;

use crate::catalog::{DefaultValue, Param, ScalarKind, Ty, TyKind};

// ============================================================================
// RESULTS
// ============================================================================

/// How one declared parameter was satisfied. Used by signature help to
/// render the effective argument list; never for evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundArg {
    /// Bound to the call-site argument at this index.
    Supplied(usize),
    /// Omitted optional; the declared default stands in for display.
    Defaulted(DefaultValue),
    /// Omitted optional with no declared default.
    Omitted,
}

/// A successful binding: one slot per declared parameter, plus any extra
/// arguments absorbed by a variadic tail.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub slots: Vec<BoundArg>,
    /// Call-site indices of arguments beyond the parameter count, bound
    /// to the final (variadic) parameter.
    pub variadic_rest: Vec<usize>,
}

/// A binding failure. Local and recoverable: the call site is diagnosed,
/// nothing else is affected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BindError {
    #[error("too few arguments: expected at least {required}, got {supplied}")]
    TooFewArguments { required: usize, supplied: usize },

    #[error("too many arguments: expected at most {max}, got {supplied}")]
    TooManyArguments { max: usize, supplied: usize },

    #[error("argument {index} has an incompatible type")]
    ArgumentTypeMismatch { index: usize, expected: Ty, found: Ty },
}

// ============================================================================
// BINDING
// ============================================================================

/// Bind call-site argument types against a declared parameter list.
pub fn bind_call(params: &[Param], args: &[Ty]) -> Result<Binding, BindError> {
    let required = params
        .iter()
        .take_while(|p| !p.optional && !p.variadic)
        .count();
    if args.len() < required {
        return Err(BindError::TooFewArguments {
            required,
            supplied: args.len(),
        });
    }

    let variadic = params.last().is_some_and(|p| p.variadic);
    if args.len() > params.len() && !variadic {
        return Err(BindError::TooManyArguments {
            max: params.len(),
            supplied: args.len(),
        });
    }

    let mut slots = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        if index < args.len() {
            check_assignable(index, param, &args[index])?;
            slots.push(BoundArg::Supplied(index));
        } else if let Some(default) = &param.default {
            slots.push(BoundArg::Defaulted(default.clone()));
        } else {
            slots.push(BoundArg::Omitted);
        }
    }

    // Extra arguments flow into the variadic tail.
    let mut variadic_rest = Vec::new();
    if let Some(tail) = params.last().filter(|p| p.variadic) {
        for index in params.len()..args.len() {
            check_assignable(index, tail, &args[index])?;
            variadic_rest.push(index);
        }
    }

    Ok(Binding {
        slots,
        variadic_rest,
    })
}

fn check_assignable(index: usize, param: &Param, arg: &Ty) -> Result<(), BindError> {
    if assignable(&param.ty, arg) {
        Ok(())
    } else {
        Err(BindError::ArgumentTypeMismatch {
            index,
            expected: param.ty,
            found: *arg,
        })
    }
}

/// Whether a value of type `arg` may be passed where `ty` is declared.
pub fn assignable(ty: &Ty, arg: &Ty) -> bool {
    // Variant is compatible in both directions, collection or not.
    if matches!(ty.kind, TyKind::Scalar(ScalarKind::Variant))
        || matches!(arg.kind, TyKind::Scalar(ScalarKind::Variant))
    {
        return true;
    }
    // Null assigns anywhere.
    if matches!(arg.kind, TyKind::Scalar(ScalarKind::Null)) {
        return true;
    }
    // A collection where a single value is declared is a shape mismatch;
    // a declared collection parameter gathers singles (ParamArray).
    if arg.collection && !ty.collection {
        return false;
    }

    match (ty.kind, arg.kind) {
        (TyKind::Scalar(p), TyKind::Scalar(a)) => scalar_assignable(p, a),
        // Object takes any interface; interfaces take object references.
        (TyKind::Scalar(ScalarKind::Object), TyKind::Interface(_)) => true,
        (TyKind::Interface(_), TyKind::Scalar(ScalarKind::Object)) => true,
        // No inheritance data in the catalog, so interfaces interchange.
        (TyKind::Interface(_), TyKind::Interface(_)) => true,
        // Interface where a concrete scalar is required, or vice versa.
        (TyKind::Scalar(_), TyKind::Interface(_)) => false,
        (TyKind::Interface(_), TyKind::Scalar(_)) => false,
    }
}

fn scalar_assignable(declared: ScalarKind, arg: ScalarKind) -> bool {
    declared == arg || (declared == ScalarKind::Double && arg == ScalarKind::Long)
}
