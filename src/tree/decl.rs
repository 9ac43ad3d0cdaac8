//! Resolved declarations referenced from the syntax tree

use std::fmt;

/// Unique identifier for a declaration, assigned by the resolver.
/// Two declarations with the same name in different scopes get
/// different DeclIds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of declaration this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// Class or interface
    Class,
    /// Property accessor (getter)
    Getter,
    /// Field of a class
    Field,
    /// Local or top-level variable
    Variable,
    /// Routine parameter
    Parameter,
    /// Top-level function
    Function,
    /// Instance or static method
    Method { is_static: bool },
    /// Constructor; the unnamed constructor has an empty name
    Constructor,
}

/// Static type of an expression or declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    /// Instance of a class or interface
    Interface { class: DeclId, nullable: bool },
    /// Any function type
    Function,
    /// Statically unknown
    Dynamic,
    Void,
}

impl Ty {
    pub fn interface(class: DeclId) -> Ty {
        Ty::Interface {
            class,
            nullable: false,
        }
    }

    pub fn nullable(class: DeclId) -> Ty {
        Ty::Interface {
            class,
            nullable: true,
        }
    }

    /// The class behind an interface type
    pub fn class(&self) -> Option<DeclId> {
        match self {
            Ty::Interface { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Ty::Interface { nullable: true, .. } | Ty::Dynamic)
    }
}

/// A declared parameter of a callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// Named parameters are passed as `name: value` and have no position
    pub named: bool,
    pub ty: Option<Ty>,
}

impl Param {
    pub fn positional(name: impl Into<String>, ty: Option<Ty>) -> Self {
        Param {
            name: name.into(),
            named: false,
            ty,
        }
    }

    pub fn named(name: impl Into<String>, ty: Option<Ty>) -> Self {
        Param {
            name: name.into(),
            named: true,
            ty,
        }
    }
}

/// Information about a declaration
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
    /// Identifier of the declaring scope (library, module, package)
    pub scope: String,
    /// Enclosing class for members and constructors
    pub owner: Option<DeclId>,
    /// Declared type; the return type for callables and getters
    pub ty: Option<Ty>,
    /// Direct supertypes, only meaningful for classes
    pub supertypes: Vec<DeclId>,
    /// Parameters, only meaningful for callables
    pub params: Vec<Param>,
}

impl Decl {
    pub fn new(name: impl Into<String>, kind: DeclKind, scope: impl Into<String>) -> Self {
        Decl {
            name: name.into(),
            kind,
            scope: scope.into(),
            owner: None,
            ty: None,
            supertypes: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Decl::new(name, DeclKind::Class, scope)
    }

    pub fn owned_by(mut self, owner: DeclId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn typed(mut self, ty: Ty) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn extends(mut self, supertype: DeclId) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// The `index`-th positional parameter
    pub fn positional_param(&self, index: usize) -> Option<&Param> {
        self.params.iter().filter(|p| !p.named).nth(index)
    }

    pub fn named_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.named && p.name == name)
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.scope, self.name)
    }
}
