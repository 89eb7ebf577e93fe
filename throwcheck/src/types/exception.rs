//! Exception type references.

use serde::{Deserialize, Serialize};

/// Interned index of a nominal type in the [`TypeTable`](super::TypeTable).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A reference to a type usable as a thrown value's static type.
///
/// `Opaque` marks an escape whose type could not be determined (untyped
/// catch binding, unresolvable operand). It is kept explicit so the checker
/// can distinguish "provably safe" from "unknown, assumed safe".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionType {
    /// Nominal type registered in the type table.
    Nominal(TypeId),
    /// Unresolved generic parameter of the enclosing signature.
    Param(String),
    /// A value with no determinable static type.
    Opaque,
}

impl ExceptionType {
    pub fn is_opaque(&self) -> bool {
        matches!(self, ExceptionType::Opaque)
    }

    pub fn is_param(&self) -> bool {
        matches!(self, ExceptionType::Param(_))
    }

    /// Ordering key used to keep sets canonically sorted.
    pub(crate) fn sort_key(&self) -> (u8, u32, &str) {
        match self {
            ExceptionType::Nominal(id) => (0, id.0, ""),
            ExceptionType::Param(name) => (1, 0, name.as_str()),
            ExceptionType::Opaque => (2, 0, ""),
        }
    }
}
