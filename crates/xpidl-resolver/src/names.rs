//! Per-file name scope.
//!
//! A `NameMap` binds names to entries in the resolver's shared type table.
//! Builtins shadow everything and can never be redeclared. Redeclaring an
//! existing name is allowed only for the benign cases a real IDL corpus
//! relies on: repeated forward declarations, a forward declaration upgraded
//! by (or following) the real interface, and structurally identical
//! typedef/native/webidl declarations reached through multiple includes.

use rustc_hash::FxHashMap;
use xpidl_parser::Location;

use crate::builtins::BUILTINS;
use crate::error::ResolveError;
use crate::types::{TypeNode, TypeRef, TypeTable};

#[derive(Debug, Default, Clone)]
pub struct NameMap {
    map: FxHashMap<String, TypeRef>,
    builtins: FxHashMap<&'static str, TypeRef>,
}

impl NameMap {
    /// A scope with every builtin pre-registered in `table`.
    pub fn with_builtins(table: &mut TypeTable) -> Self {
        let mut builtins = FxHashMap::default();
        for b in BUILTINS.values() {
            builtins.insert(b.name, table.alloc(TypeNode::Builtin(b)));
        }
        NameMap {
            map: FxHashMap::default(),
            builtins,
        }
    }

    /// A scope sharing another scope's builtin bindings.
    pub fn sharing_builtins(&self) -> Self {
        NameMap {
            map: FxHashMap::default(),
            builtins: self.builtins.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.builtins
            .get(name)
            .or_else(|| self.map.get(name))
            .copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate the non-builtin bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeRef)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Bind `name` to `new`, applying the redeclaration policy. Returns the
    /// canonical ref for the name, which is the existing one whenever the
    /// redeclaration is a benign duplicate.
    pub fn set(
        &mut self,
        table: &TypeTable,
        name: &str,
        new: TypeRef,
        location: &Location,
    ) -> Result<TypeRef, ResolveError> {
        if self.builtins.contains_key(name) {
            return Err(ResolveError::name(
                format!("name '{name}' is a builtin and cannot be redeclared"),
                location.clone(),
            ));
        }

        let old = match self.map.get(name) {
            Some(old) => *old,
            None => {
                self.map.insert(name.to_owned(), new);
                return Ok(new);
            }
        };
        if old == new {
            return Ok(old);
        }

        match (table.get(old), table.get(new)) {
            // A forward declaration is upgraded by the real interface.
            (TypeNode::Forward { .. }, TypeNode::Interface(_)) => {
                self.map.insert(name.to_owned(), new);
                Ok(new)
            }
            // A forward declaration after the real interface is a no-op.
            (TypeNode::Interface(_), TypeNode::Forward { .. }) => Ok(old),
            (a, b) if structurally_equal(a, b) => Ok(old),
            _ => Err(ResolveError::name(
                format!(
                    "name '{name}' specified twice. Previous location: {}",
                    table.location_of(old)
                ),
                location.clone(),
            )),
        }
    }
}

/// Redeclarations that describe the same thing, as happens when two
/// included files both declare a shared type.
fn structurally_equal(a: &TypeNode, b: &TypeNode) -> bool {
    match (a, b) {
        (TypeNode::Forward { name: a, .. }, TypeNode::Forward { name: b, .. }) => a == b,
        (
            TypeNode::Typedef {
                name: an,
                target: at,
                ..
            },
            TypeNode::Typedef {
                name: bn,
                target: bt,
                ..
            },
        ) => an == bn && at == bt,
        (
            TypeNode::Native {
                name: an,
                native_name: ann,
                modifier: am,
                ..
            },
            TypeNode::Native {
                name: bn,
                native_name: bnn,
                modifier: bm,
                ..
            },
        ) => an == bn && ann == bnn && am == bm,
        (TypeNode::WebIdl { name: a, .. }, TypeNode::WebIdl { name: b, .. }) => a == b,
        (TypeNode::Interface(a), TypeNode::Interface(b)) => {
            a.name == b.name && a.location == b.location
        }
        _ => false,
    }
}
