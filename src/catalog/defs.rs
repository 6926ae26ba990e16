//! The catalog input model: declarations as the catalog supplies them.
//!
//! These are pure value types: the shapes in which the built-in object
//! model (interfaces, methods, properties, arguments) is handed to the
//! crate. Type positions hold a [`TypeRef`], which is either a concrete
//! scalar or a [`Placeholder`] naming an interface that may be declared
//! later in the catalog (or cyclically). Placeholders are consumed by
//! [`ResolvedGraph::build`](super::ResolvedGraph::build); they never
//! appear in the resolved graph.
//!
//! Structural validity (a required argument carrying a default, a variadic
//! indexer, and so on) is checked at graph build, not here. The builders
//! accept what they are given so that a broken catalog produces a full
//! batch of errors instead of a panic mid-construction.

use smol_str::SmolStr;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// The concrete scalar kinds of the mrScript value model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalarKind {
    String,
    Long,
    Double,
    Boolean,
    Date,
    /// An object reference with no statically known interface.
    Object,
    /// Accepts and is accepted by anything; the dynamic default.
    Variant,
    Null,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarKind::String => "String",
            ScalarKind::Long => "Long",
            ScalarKind::Double => "Double",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Date => "Date",
            ScalarKind::Object => "Object",
            ScalarKind::Variant => "Variant",
            ScalarKind::Null => "Null",
        };
        f.write_str(s)
    }
}

/// A by-name forward reference to an interface, with shape modifiers.
///
/// The referenced interface does not need to be declared before its users;
/// mutual cycles (`IQuestion → ICategories → ICategory → IQuestion`) are
/// expected and fine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placeholder {
    /// Name of the target interface.
    pub target: SmolStr,
    /// The reference is to an array/collection of the target.
    pub collection: bool,
}

/// A type position in a declaration: a scalar or a named interface.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeRef {
    Scalar(ScalarKind),
    Named(Placeholder),
}

impl TypeRef {
    /// A scalar type reference.
    pub fn scalar(kind: ScalarKind) -> Self {
        TypeRef::Scalar(kind)
    }

    /// A reference to the interface called `target`.
    pub fn named(target: impl Into<SmolStr>) -> Self {
        TypeRef::Named(Placeholder {
            target: target.into(),
            collection: false,
        })
    }

    /// A reference to a collection of the interface called `target`.
    pub fn named_collection(target: impl Into<SmolStr>) -> Self {
        TypeRef::Named(Placeholder {
            target: target.into(),
            collection: true,
        })
    }
}

// ============================================================================
// ARGUMENTS
// ============================================================================

/// A literal default for an omitted optional argument.
///
/// Carried for signature-help and hover display only; this crate never
/// evaluates anything.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DefaultValue {
    Str(SmolStr),
    Long(i64),
    Double(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Str(s) => write!(f, "\"{s}\""),
            DefaultValue::Long(v) => write!(f, "{v}"),
            DefaultValue::Double(v) => write!(f, "{v}"),
            DefaultValue::Bool(true) => f.write_str("True"),
            DefaultValue::Bool(false) => f.write_str("False"),
            DefaultValue::Null => f.write_str("Null"),
        }
    }
}

/// A declared method parameter or property indexer argument.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Argument {
    pub name: SmolStr,
    pub ty: TypeRef,
    pub optional: bool,
    /// Display default for an omitted optional argument.
    pub default: Option<DefaultValue>,
    /// ParamArray: the final parameter absorbs any number of trailing
    /// arguments.
    pub variadic: bool,
}

impl Argument {
    pub fn new(name: impl Into<SmolStr>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            default: None,
            variadic: false,
        }
    }

    /// Mark the argument optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark the argument optional with a display default.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }

    /// Mark the argument as a ParamArray tail.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

/// A declared method.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MethodDef {
    pub name: SmolStr,
    /// `None` for a `Sub` (no return value).
    pub return_type: Option<TypeRef>,
    /// The return value is conceptually an array of `return_type`.
    pub collection: bool,
    pub arguments: Vec<Argument>,
}

impl MethodDef {
    /// A method returning `return_type`.
    pub fn new(name: impl Into<SmolStr>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type: Some(return_type),
            collection: false,
            arguments: Vec::new(),
        }
    }

    /// A `Sub`: a method with no return value.
    pub fn sub(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            collection: false,
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Mark the return value as a collection.
    pub fn returns_collection(mut self) -> Self {
        self.collection = true;
        self
    }
}

/// A declared property.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyDef {
    pub name: SmolStr,
    pub return_type: TypeRef,
    /// The property value is conceptually an array of `return_type`.
    pub collection: bool,
    pub readonly: bool,
    /// Present on indexers: `Item[Index]` rather than a bare identifier.
    pub indexer: Option<Argument>,
}

impl PropertyDef {
    pub fn new(name: impl Into<SmolStr>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type,
            collection: false,
            readonly: false,
            indexer: None,
        }
    }

    /// Give the property an indexer argument.
    pub fn with_indexer(mut self, indexer: Argument) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Mark the property value as a collection.
    pub fn returns_collection(mut self) -> Self {
        self.collection = true;
        self
    }
}

// ============================================================================
// INTERFACES
// ============================================================================

/// A declared interface of the object model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterfaceDef {
    pub name: SmolStr,
    /// Member invoked implicitly when an instance is used in value
    /// position (COM default member). Usually a property; the catalog also
    /// contains default methods.
    pub default_member: Option<SmolStr>,
    /// The interface exposes dynamically named children (sub-questions,
    /// sub-axes) that are not in the catalog. Unknown member names resolve
    /// through the default indexer instead of failing.
    pub dynamic_members: bool,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<PropertyDef>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            default_member: None,
            dynamic_members: false,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Declare the interface's default member by name.
    pub fn with_default_member(mut self, name: impl Into<SmolStr>) -> Self {
        self.default_member = Some(name.into());
        self
    }

    /// Permit dynamically named children, typed through the default
    /// indexer.
    pub fn with_dynamic_members(mut self) -> Self {
        self.dynamic_members = true;
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }
}
