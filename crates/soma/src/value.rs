//! The `Value` enum and the small id types that key into the VM's arenas.
//!
//! SOMA's value set is small (no dicts, lists, classes, exceptions as
//! first-class objects) so one flat enum suffices - there is no separate
//! "immediate vs. heap" split, only "inline payload vs. id into an arena".

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Identifies a built-in, natively implemented callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuiltinId(pub u32);

/// Identifies a block literal, assigned once at parse time (see `parser::BlockTable`).
/// Distinct `{ }` literals with identical source text still get distinct ids (I4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Opaque handle into a side table of host objects backing `Value::Foreign`
/// (extension return values that are deliberately not unwrapped into a SOMA value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignId(pub u32);

/// A SOMA runtime value. Cheap to clone: `String` is `Rc<str>`, everything
/// else is `Copy`-sized or an index into an arena the `Vm` owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// The AL sentinel and the "nothing here" result of a failed dual-return.
    Void,
    /// The Cell default-value and SOMA's only other "absence" value.
    Nil,
    Bool(bool),
    Int(i64),
    String(Rc<str>),
    Block(BlockId),
    CellRef(crate::heap::CellId),
    Builtin(BuiltinId),
    Foreign(ForeignId),
}

impl Value {
    /// Human-readable kind name, used in `TypeError`/`NotExecutable` diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Nil => "Nil",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::String(_) => "String",
            Self::Block(_) => "Block",
            Self::CellRef(_) => "CellRef",
            Self::Builtin(_) => "Builtin",
            Self::Foreign(_) => "Foreign",
        }
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::Block(_) | Self::Builtin(_))
    }

    /// `toString`'s canonical textual form (spec.md §4.4): integers in base
    /// 10, `True`/`False` as those words, `Void`/`Nil` as those words,
    /// Strings verbatim (no quoting - this is display text, not a literal),
    /// everything else as an opaque `<Kind#id>` token.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::Void => "Void".to_owned(),
            Self::Nil => "Nil".to_owned(),
            Self::Bool(true) => "True".to_owned(),
            Self::Bool(false) => "False".to_owned(),
            Self::Int(n) => n.to_string(),
            Self::String(s) => s.to_string(),
            Self::Block(id) => format!("<Block#{}>", id.0),
            Self::CellRef(id) => format!("<CellRef#{}>", id.index()),
            Self::Builtin(id) => format!("<Builtin#{}>", id.0),
            Self::Foreign(id) => format!("<Foreign#{}>", id.0),
        }
    }

    #[must_use]
    pub fn truthy(&self) -> bool {
        !matches!(self, Self::Void | Self::Nil | Self::Bool(false))
    }

    /// Kind-equal-and-value-equal; cross-kind comparisons are always `false`,
    /// never an error (the resolved Open Question from SPEC_FULL §3.1).
    /// `CellRef` equality is pointer identity on the underlying Cell.
    #[must_use]
    pub fn soma_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) | (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Block(a), Self::Block(b)) => a == b,
            (Self::CellRef(a), Self::CellRef(b)) => a == b,
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Foreign(a), Self::Foreign(b)) => a == b,
            _ => false,
        }
    }
}
