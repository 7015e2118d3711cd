//! A minimal stand-in for the type system and `AbstractTypeLayout` query
//! that spec §1 treats as an external collaborator.
//!
//! The pass only ever needs to know, for a given type, how many sub-object
//! slots it has and what type each slot holds -- enough to build and
//! navigate `partial` values (spec §3). Everything else about the type
//! system (inference, layout in bytes, generics) is out of scope.

/// The closed type universe this crate's IR and tests operate over.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    /// An atomic scalar (this pass only cares that it's a single slot).
    Scalar(&'static str),
    /// A fixed-arity, by-value aggregate: one child slot per field, in
    /// declaration order.
    Record(Vec<Type>),
    /// A type whose locations permit overwrite without an intervening
    /// deinitialization -- the "built-in types" exception called out by
    /// `call` and `store` in spec §4.4 (e.g. trivially-copyable handles
    /// the ABI manages itself).
    Builtin(&'static str),
}

impl Type {
    pub fn int() -> Self {
        Type::Scalar("Int")
    }

    pub fn bool() -> Self {
        Type::Scalar("Bool")
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Type::Builtin(_))
    }

    /// The type of the `index`th field, for a `Record`; panics (a pass bug,
    /// not a user error) if `self` isn't a `Record` with that many fields.
    pub fn field_type(&self, index: u32) -> &Type {
        match self {
            Type::Record(fields) => fields.get(index as usize).unwrap_or_else(|| {
                crate::bug::precondition_failure(
                    "Type::field_type",
                    format!("field index {index} out of range for {self:?}"),
                )
            }),
            _ => crate::bug::precondition_failure(
                "Type::field_type",
                format!("{self:?} is not a record type"),
            ),
        }
    }
}

/// The shape of a value of some type: how many child slots it has, and
/// their types. `Layout` mirrors `Type`'s own structure here because this
/// crate's `Type` already carries arity directly; a richer type system
/// would separate the two (see `AbstractTypeLayout::layout`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Scalar,
    Record(Vec<Type>),
}

impl Layout {
    pub fn slot_count(&self) -> usize {
        match self {
            Layout::Scalar => 0,
            Layout::Record(fields) => fields.len(),
        }
    }
}

/// The `AbstractTypeLayout(of: type, definedIn: program)` query from spec §6.
pub trait AbstractTypeLayout {
    fn layout(&self, ty: &Type) -> Layout;
}

/// The layout of any `Type` in this crate's closed universe is derivable
/// from the type itself; `TypeLayout` is the trivial implementation, held
/// by [`crate::ir::module::Module`], which implements `AbstractTypeLayout`
/// in turn by delegating to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeLayout;

impl AbstractTypeLayout for TypeLayout {
    fn layout(&self, ty: &Type) -> Layout {
        match ty {
            Type::Scalar(_) | Type::Builtin(_) => Layout::Scalar,
            Type::Record(fields) => Layout::Record(fields.clone()),
        }
    }
}
