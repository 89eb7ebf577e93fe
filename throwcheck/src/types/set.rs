//! Flattened exception-type sets.
//!
//! A set is always flattened and duplicate-free, kept in a canonical order
//! so set equality is plain structural equality. The empty set is
//! meaningful: "cannot propagate any exception". The unconstrained marker
//! lives in [`ThrowsClause`](super::ThrowsClause), never inside a set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::exception::{ExceptionType, TypeId};
use super::table::TypeTable;

/// Upper bounds of in-scope generic parameters, by name.
pub type ParamBounds = HashMap<String, TypeId>;

/// True if `ty` is covered by `cover` (supertype-or-equal).
///
/// Membership uses assignability, not identity. A `Param` is covered by a
/// nominal type only through its declared bound; `Opaque` is covered by
/// nothing except `Opaque` itself.
pub fn covered_by(
    ty: &ExceptionType,
    cover: &ExceptionType,
    bounds: &ParamBounds,
    table: &TypeTable,
) -> bool {
    match (ty, cover) {
        (ExceptionType::Nominal(t), ExceptionType::Nominal(c)) => table.is_assignable(*t, *c),
        (ExceptionType::Param(p), ExceptionType::Param(q)) => p == q,
        (ExceptionType::Param(p), ExceptionType::Nominal(c)) => bounds
            .get(p)
            .map(|b| table.is_assignable(*b, *c))
            .unwrap_or(false),
        (ExceptionType::Opaque, ExceptionType::Opaque) => true,
        _ => false,
    }
}

/// A flattened, duplicate-free union of exception types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExceptionSet {
    members: Vec<ExceptionType>,
}

impl ExceptionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(ty: ExceptionType) -> Self {
        Self { members: vec![ty] }
    }

    pub fn from_types(types: impl IntoIterator<Item = ExceptionType>, table: &TypeTable) -> Self {
        let mut set = Self::empty();
        for ty in types {
            set.insert(ty, table);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExceptionType> {
        self.members.iter()
    }

    pub fn has_opaque(&self) -> bool {
        self.members.iter().any(ExceptionType::is_opaque)
    }

    /// Insert with eager subtype absorption between decidable (nominal)
    /// members. `Param` and `Opaque` members neither absorb nor are
    /// absorbed; they stay verbatim until instantiation. Returns true if
    /// the set changed.
    pub fn insert(&mut self, ty: ExceptionType, table: &TypeTable) -> bool {
        let no_bounds = ParamBounds::new();
        if self
            .members
            .iter()
            .any(|m| covered_by(&ty, m, &no_bounds, table))
        {
            return false;
        }
        // Drop members the new type covers.
        self.members.retain(|m| !covered_by(m, &ty, &no_bounds, table));
        self.members.push(ty);
        self.members.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        true
    }

    /// Union of two sets, flattened and absorbed.
    pub fn union(a: &ExceptionSet, b: &ExceptionSet, table: &TypeTable) -> ExceptionSet {
        let mut out = a.clone();
        out.merge_from(b, table);
        out
    }

    /// Union `other` into `self`. Returns true if `self` changed.
    pub fn merge_from(&mut self, other: &ExceptionSet, table: &TypeTable) -> bool {
        let mut changed = false;
        for ty in &other.members {
            changed |= self.insert(ty.clone(), table);
        }
        changed
    }

    /// True iff some member is a supertype-or-equal of `ty`.
    pub fn contains(&self, ty: &ExceptionType, table: &TypeTable) -> bool {
        self.contains_bounded(ty, &ParamBounds::new(), table)
    }

    /// `contains` with generic-parameter bounds in scope: a bounded
    /// parameter is covered by anything covering its bound.
    pub fn contains_bounded(
        &self,
        ty: &ExceptionType,
        bounds: &ParamBounds,
        table: &TypeTable,
    ) -> bool {
        self.members.iter().any(|m| covered_by(ty, m, bounds, table))
    }

    /// Split into (kept, suppressed) under a catch handler.
    ///
    /// `handled = None` is a catch-all: everything is suppressed, opaque
    /// and symbolic members included. A typed handler suppresses members
    /// assignable to one of the handled types; bounded parameters are
    /// suppressed through their bound.
    pub fn subtract_handled(
        &self,
        handled: Option<&[ExceptionType]>,
        bounds: &ParamBounds,
        table: &TypeTable,
    ) -> (ExceptionSet, Vec<ExceptionType>) {
        let Some(handled) = handled else {
            return (ExceptionSet::empty(), self.members.clone());
        };
        let mut kept = ExceptionSet::empty();
        let mut suppressed = Vec::new();
        for member in &self.members {
            if handled.iter().any(|h| covered_by(member, h, bounds, table)) {
                suppressed.push(member.clone());
            } else {
                kept.insert(member.clone(), table);
            }
        }
        (kept, suppressed)
    }

    /// Substitute generic bindings into symbolic members and re-flatten.
    pub fn substitute(
        &self,
        bindings: &HashMap<String, ExceptionType>,
        table: &TypeTable,
    ) -> ExceptionSet {
        let mut out = ExceptionSet::empty();
        for member in &self.members {
            let replaced = match member {
                ExceptionType::Param(p) => bindings.get(p).cloned().unwrap_or_else(|| member.clone()),
                other => other.clone(),
            };
            out.insert(replaced, table);
        }
        out
    }

    /// Render for diagnostics: comma-separated member names.
    pub fn display(&self, table: &TypeTable) -> String {
        self.members
            .iter()
            .map(|m| table.display(m))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
