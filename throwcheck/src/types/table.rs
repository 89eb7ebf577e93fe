//! Nominal type table and assignability.
//!
//! Holds the builtin type hierarchy plus user `abstract type` / `struct`
//! declarations. Assignability is the parent-chain walk used for exception
//! set membership and catch-scope suppression.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use super::exception::{ExceptionType, TypeId};

/// Builtin types seeded into every table.
///
/// `Exception` is the hierarchy root for throwable types. The scalar types
/// are registered so expression typing can name them; they are not
/// exception types.
static BUILTIN_TYPES: Lazy<Vec<(&'static str, Option<&'static str>)>> = Lazy::new(|| {
    vec![
        ("Exception", None),
        ("TypeError", Some("Exception")),
        ("RangeError", Some("Exception")),
        ("SyntaxError", Some("Exception")),
        ("IoError", Some("Exception")),
        ("KeyError", Some("Exception")),
        ("ArgumentError", Some("Exception")),
        ("DomainError", Some("Exception")),
        ("Int", None),
        ("Float", None),
        ("Bool", None),
        ("Str", None),
        ("Unit", None),
    ]
});

/// Errors from type registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown parent type '{0}'")]
    UnknownParent(String),
    #[error("type '{0}' is already defined")]
    Duplicate(String),
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    parent: Option<TypeId>,
}

/// Registry of nominal types with single-parent subtyping.
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    by_name: HashMap<String, TypeId>,
}

impl TypeTable {
    /// Create a table seeded with the builtin hierarchy.
    pub fn new() -> Self {
        let mut table = Self { entries: Vec::new(), by_name: HashMap::new() };
        for (name, parent) in BUILTIN_TYPES.iter() {
            let parent_id = parent.map(|p| table.by_name[p]);
            table.insert(name, parent_id);
        }
        table
    }

    fn insert(&mut self, name: &str, parent: Option<TypeId>) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        self.entries.push(TypeEntry { name: name.to_string(), parent });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Register a user-declared type under an optional parent name.
    pub fn register(&mut self, name: &str, parent: Option<&str>) -> Result<TypeId, TableError> {
        if self.by_name.contains_key(name) {
            return Err(TableError::Duplicate(name.to_string()));
        }
        let parent_id = match parent {
            None => None,
            Some(p) => Some(
                self.lookup(p)
                    .ok_or_else(|| TableError::UnknownParent(p.to_string()))?,
            ),
        };
        Ok(self.insert(name, parent_id))
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.entries[id.index()].name
    }

    /// The root of the throwable hierarchy.
    pub fn exception_root(&self) -> TypeId {
        self.by_name["Exception"]
    }

    /// Check `candidate <: target` by walking the parent chain.
    pub fn is_assignable(&self, candidate: TypeId, target: TypeId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == target {
                return true;
            }
            current = self.entries[id.index()].parent;
        }
        false
    }

    /// True if the type is in the `Exception` hierarchy.
    pub fn is_exception(&self, id: TypeId) -> bool {
        self.is_assignable(id, self.exception_root())
    }

    /// Render an exception type for diagnostics.
    pub fn display(&self, ty: &ExceptionType) -> String {
        match ty {
            ExceptionType::Nominal(id) => self.name(*id).to_string(),
            ExceptionType::Param(name) => name.clone(),
            ExceptionType::Opaque => "<unknown>".to_string(),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_hierarchy() {
        let table = TypeTable::new();
        let type_error = table.lookup("TypeError").unwrap();
        let exception = table.lookup("Exception").unwrap();
        assert!(table.is_assignable(type_error, exception));
        assert!(!table.is_assignable(exception, type_error));
        assert!(table.is_exception(type_error));
        assert!(!table.is_exception(table.lookup("Int").unwrap()));
    }

    #[test]
    fn test_register_user_type() {
        let mut table = TypeTable::new();
        let app = table.register("AppError", Some("Exception")).unwrap();
        let config = table.register("ConfigError", Some("AppError")).unwrap();
        assert!(table.is_assignable(config, app));
        assert!(table.is_assignable(config, table.exception_root()));
    }

    #[test]
    fn test_register_errors() {
        let mut table = TypeTable::new();
        assert_eq!(
            table.register("X", Some("Nope")),
            Err(TableError::UnknownParent("Nope".to_string()))
        );
        table.register("X", None).unwrap();
        assert_eq!(
            table.register("X", None),
            Err(TableError::Duplicate("X".to_string()))
        );
    }
}
