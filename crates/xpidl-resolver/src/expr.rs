//! Constant expression evaluation.
//!
//! Constants may reference other constants declared later in the same
//! interface or anywhere in the base chain, so evaluation is recursive
//! over the expression trees with a visited set guarding against
//! reference cycles. Arithmetic wraps at 64 bits.

use rustc_hash::FxHashSet;
use xpidl_parser::ast::{BinOp, ConstExpr};
use xpidl_parser::Location;

use crate::error::ResolveError;
use crate::interface::Interface;
use crate::types::{TypeNode, TypeTable};

/// Evaluate a constant expression against its owning interface.
pub fn evaluate(
    expr: &ConstExpr,
    iface: &Interface,
    table: &TypeTable,
) -> Result<i64, ResolveError> {
    let mut visited = FxHashSet::default();
    eval(expr, iface, table, &mut visited)
}

fn eval(
    expr: &ConstExpr,
    iface: &Interface,
    table: &TypeTable,
    visited: &mut FxHashSet<String>,
) -> Result<i64, ResolveError> {
    match expr {
        ConstExpr::Literal(v) => Ok(*v),
        ConstExpr::Neg(inner) => Ok(eval(inner, iface, table, visited)?.wrapping_neg()),
        ConstExpr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, iface, table, visited)?;
            let r = eval(rhs, iface, table, visited)?;
            Ok(match op {
                BinOp::Add => l.wrapping_add(r),
                BinOp::Sub => l.wrapping_sub(r),
                BinOp::Mul => l.wrapping_mul(r),
                BinOp::Shl => l.wrapping_shl(r as u32),
                BinOp::Shr => l.wrapping_shr(r as u32),
                BinOp::Or => l | r,
            })
        }
        ConstExpr::Name(name, location) => {
            lookup(name, location, iface, table, visited)
        }
    }
}

fn lookup(
    name: &str,
    location: &Location,
    iface: &Interface,
    table: &TypeTable,
    visited: &mut FxHashSet<String>,
) -> Result<i64, ResolveError> {
    // Constants of the interface being resolved may not have cached values
    // yet; recurse through their expressions.
    if let Some(c) = iface.find_const(name) {
        if let Some(v) = c.value {
            return Ok(v);
        }
        if !visited.insert(name.to_owned()) {
            return Err(ResolveError::constraint(
                format!("constant '{name}' is defined in terms of itself"),
                location.clone(),
            ));
        }
        let v = eval(&c.expr, iface, table, visited)?;
        visited.remove(name);
        return Ok(v);
    }

    // Anything reachable through the base chain is already resolved and
    // carries a cached value.
    let mut cursor = iface.base;
    while let Some(base) = cursor {
        match table.get(base) {
            TypeNode::Interface(ancestor) => {
                if let Some(c) = ancestor.find_const(name) {
                    if let Some(v) = c.value {
                        return Ok(v);
                    }
                    return eval(&c.expr, ancestor, table, visited);
                }
                if ancestor.members.iter().any(|m| m.name() == Some(name)) {
                    break;
                }
                cursor = ancestor.base;
            }
            _ => break,
        }
    }

    if iface.members.iter().any(|m| m.name() == Some(name)) {
        return Err(ResolveError::ty(
            format!("symbol '{name}' is not a constant"),
            location.clone(),
        ));
    }
    Err(ResolveError::name(
        format!("cannot find symbol '{name}'"),
        location.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::builtin;
    use crate::interface::{ConstMember, InterfaceAttributes, Member};
    use xpidl_parser::ast::TypeId;

    fn literal(v: i64) -> ConstExpr {
        ConstExpr::Literal(v)
    }

    fn binary(op: BinOp, lhs: ConstExpr, rhs: ConstExpr) -> ConstExpr {
        ConstExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn name(n: &str) -> ConstExpr {
        ConstExpr::Name(n.into(), Location::builtin())
    }

    fn konst(name: &str, expr: ConstExpr, table: &mut TypeTable) -> Member {
        let long = table.alloc(TypeNode::Builtin(builtin("long").unwrap()));
        Member::Const(ConstMember {
            name: name.into(),
            ty: long,
            type_id: TypeId::new("long"),
            expr,
            value: None,
            location: Location::builtin(),
            doc_comments: vec![],
        })
    }

    fn iface_with(members: Vec<Member>) -> Interface {
        Interface {
            name: "nsITest".into(),
            attributes: InterfaceAttributes {
                uuid: "00000000-0000-0000-0000-000000000000".into(),
                scriptable: true,
                builtinclass: false,
                function: false,
                noscript: false,
                main_process_scriptable_only: false,
                shim: None,
                shimfile: None,
            },
            base: None,
            base_name: None,
            members,
            location: Location::builtin(),
            doc_comments: vec![],
            implicit_builtinclass: false,
        }
    }

    #[test]
    fn test_arithmetic() {
        let table = TypeTable::new();
        let iface = iface_with(vec![]);
        let e = binary(
            BinOp::Or,
            binary(BinOp::Shl, literal(1), literal(4)),
            literal(3),
        );
        assert_eq!(evaluate(&e, &iface, &table).unwrap(), 19);
        let e = ConstExpr::Neg(Box::new(binary(BinOp::Mul, literal(6), literal(7))));
        assert_eq!(evaluate(&e, &iface, &table).unwrap(), -42);
    }

    #[test]
    fn test_forward_reference_within_interface() {
        let mut table = TypeTable::new();
        let first = konst("A", binary(BinOp::Add, name("B"), literal(1)), &mut table);
        let second = konst("B", literal(41), &mut table);
        let iface = iface_with(vec![first, second]);
        assert_eq!(evaluate(&name("A"), &iface, &table).unwrap(), 42);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let mut table = TypeTable::new();
        let a = konst("A", name("B"), &mut table);
        let b = konst("B", name("A"), &mut table);
        let iface = iface_with(vec![a, b]);
        let err = evaluate(&name("A"), &iface, &table).unwrap_err();
        assert!(err.to_string().contains("in terms of itself"), "{err}");
    }

    #[test]
    fn test_unknown_symbol() {
        let table = TypeTable::new();
        let iface = iface_with(vec![]);
        let err = evaluate(&name("MISSING"), &iface, &table).unwrap_err();
        assert!(matches!(err, ResolveError::Name { .. }));
    }

    #[test]
    fn test_base_chain_lookup() {
        let mut table = TypeTable::new();
        let mut base = iface_with(vec![konst("FLAG", literal(8), &mut table)]);
        if let Some(Member::Const(c)) = base.members.first_mut() {
            c.value = Some(8);
        }
        let base_ref = table.alloc(TypeNode::Interface(base));
        let mut derived = iface_with(vec![]);
        derived.base = Some(base_ref);
        assert_eq!(evaluate(&name("FLAG"), &derived, &table).unwrap(), 8);
    }
}
