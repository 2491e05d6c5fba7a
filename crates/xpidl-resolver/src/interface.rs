//! The resolved interface model.
//!
//! Everything here is immutable once the resolver has produced it. Member
//! attribute lists have been interpreted into typed flags; constant values
//! are evaluated and cached.

use xpidl_parser::ast::{Attrib, ConstExpr, TypeId};
use xpidl_parser::Location;

use crate::error::ResolveError;
use crate::types::{CallType, TypeRef, TypeTable};

/// Bracketed attributes on an interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceAttributes {
    /// Required, stored lowercased.
    pub uuid: String,
    pub scriptable: bool,
    pub builtinclass: bool,
    pub function: bool,
    pub noscript: bool,
    pub main_process_scriptable_only: bool,
    pub shim: Option<String>,
    pub shimfile: Option<String>,
}

impl InterfaceAttributes {
    pub fn from_attlist(attlist: &[Attrib], location: &Location) -> Result<Self, ResolveError> {
        let mut attrs = InterfaceAttributes {
            uuid: String::new(),
            scriptable: false,
            builtinclass: false,
            function: false,
            noscript: false,
            main_process_scriptable_only: false,
            shim: None,
            shimfile: None,
        };

        for attr in attlist {
            let takes_value = matches!(attr.name.as_str(), "uuid" | "shim" | "shimfile");
            if takes_value && attr.value.is_none() {
                return Err(ResolveError::constraint(
                    format!("expected value for attribute '{}'", attr.name),
                    attr.location.clone(),
                ));
            }
            if !takes_value && attr.value.is_some() {
                return Err(ResolveError::constraint(
                    format!("unexpected value for attribute '{}'", attr.name),
                    attr.location.clone(),
                ));
            }
            match attr.name.as_str() {
                "uuid" => attrs.uuid = attr.value.clone().unwrap_or_default().to_lowercase(),
                "shim" => attrs.shim = attr.value.clone(),
                "shimfile" => attrs.shimfile = attr.value.clone(),
                "scriptable" => attrs.scriptable = true,
                "builtinclass" => attrs.builtinclass = true,
                "function" => attrs.function = true,
                "noscript" => attrs.noscript = true,
                "main_process_scriptable_only" => attrs.main_process_scriptable_only = true,
                // Accepted for historical reasons, does nothing.
                "object" => {}
                other => {
                    return Err(ResolveError::constraint(
                        format!("unexpected interface attribute '{other}'"),
                        attr.location.clone(),
                    ));
                }
            }
        }

        if attrs.uuid.is_empty() {
            return Err(ResolveError::constraint(
                "interface has no uuid",
                location.clone(),
            ));
        }
        Ok(attrs)
    }
}

/// A fully resolved interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub attributes: InterfaceAttributes,
    pub base: Option<TypeRef>,
    pub base_name: Option<String>,
    pub members: Vec<Member>,
    pub location: Location,
    pub doc_comments: Vec<String>,
    /// True when the interface (or one of its bases) has a notxpcom
    /// method, which makes it unimplementable from script.
    pub implicit_builtinclass: bool,
}

impl Interface {
    /// Vtable entries contributed by this interface alone.
    pub fn count_local_entries(&self) -> usize {
        self.members.iter().map(Member::count).sum()
    }

    pub fn consts(&self) -> impl Iterator<Item = &ConstMember> {
        self.members.iter().filter_map(|m| match m {
            Member::Const(c) => Some(c),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodMember> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn find_const(&self, name: &str) -> Option<&ConstMember> {
        self.consts().find(|c| c.name == name)
    }

    /// Whether generated bindings for this interface need SpiderMonkey
    /// types.
    pub fn needs_js_types(&self, table: &TypeTable) -> bool {
        self.members.iter().any(|m| match m {
            Member::Attribute(a) => a.type_id == TypeId::new("jsval"),
            Member::Method(m) => m.needs_js_types(table),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Cdata(CdataMember),
    Const(ConstMember),
    Attribute(AttributeMember),
    Method(MethodMember),
}

impl Member {
    /// Vtable entries the member occupies.
    pub fn count(&self) -> usize {
        match self {
            Member::Cdata(_) | Member::Const(_) => 0,
            Member::Attribute(a) => {
                if a.readonly {
                    1
                } else {
                    2
                }
            }
            Member::Method(_) => 1,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Cdata(_) => None,
            Member::Const(c) => Some(&c.name),
            Member::Attribute(a) => Some(&a.name),
            Member::Method(m) => Some(&m.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CdataMember {
    pub data: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstMember {
    pub name: String,
    pub ty: TypeRef,
    pub type_id: TypeId,
    pub expr: ConstExpr,
    /// Evaluated value; `Some` once the owning interface is resolved.
    pub value: Option<i64>,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

impl ConstMember {
    pub fn value(&self) -> i64 {
        self.value.unwrap_or_default()
    }
}

/// Sentinel policy for `[Null(...)]` / `[Undefined(...)]` on DOMString
/// setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Empty,
    Null,
    Stringify,
}

impl Sentinel {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentinel::Empty => "Empty",
            Sentinel::Null => "Null",
            Sentinel::Stringify => "Stringify",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMember {
    pub name: String,
    pub ty: TypeRef,
    pub type_id: TypeId,
    pub readonly: bool,
    pub noscript: bool,
    pub implicit_jscontext: bool,
    pub nostdcall: bool,
    pub must_use: bool,
    pub infallible: bool,
    pub binaryname: Option<String>,
    pub null: Option<Sentinel>,
    pub undefined: Option<Sentinel>,
    pub attlist: Vec<Attrib>,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

impl AttributeMember {
    pub fn is_scriptable(&self, iface: &Interface) -> bool {
        iface.attributes.scriptable && !self.noscript
    }

    pub fn to_idl(&self) -> String {
        format!(
            "{}{}attribute {} {};",
            attlist_to_idl(&self.attlist),
            if self.readonly { "readonly " } else { "" },
            self.type_id,
            self.name
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodMember {
    pub name: String,
    pub ty: TypeRef,
    pub type_id: TypeId,
    pub noscript: bool,
    pub notxpcom: bool,
    pub implicit_jscontext: bool,
    pub optional_argc: bool,
    pub nostdcall: bool,
    pub must_use: bool,
    pub binaryname: Option<String>,
    pub params: Vec<Param>,
    pub raises: Vec<String>,
    pub attlist: Vec<Attrib>,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

impl MethodMember {
    pub fn is_scriptable(&self, iface: &Interface) -> bool {
        iface.attributes.scriptable && !(self.noscript || self.notxpcom)
    }

    pub fn needs_js_types(&self, table: &TypeTable) -> bool {
        if self.implicit_jscontext || self.type_id == TypeId::new("jsval") {
            return true;
        }
        self.params.iter().any(|p| {
            table
                .as_builtin(p.ty)
                .map(|b| b.name == "jsval")
                .unwrap_or(false)
        })
    }

    pub fn to_idl(&self) -> String {
        let raises = if self.raises.is_empty() {
            String::new()
        } else {
            format!(" raises ({})", self.raises.join(","))
        };
        let params: Vec<String> = self.params.iter().map(Param::to_idl).collect();
        format!(
            "{}{} {} ({}){};",
            attlist_to_idl(&self.attlist),
            self.type_id,
            self.name,
            params.join(", "),
            raises
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub calltype: CallType,
    /// Real type, with the legacy `[array]` wrapper applied.
    pub ty: TypeRef,
    pub type_id: TypeId,
    pub size_is: Option<String>,
    pub iid_is: Option<String>,
    pub const_: bool,
    pub array: bool,
    pub retval: bool,
    pub shared: bool,
    pub optional: bool,
    pub attlist: Vec<Attrib>,
    pub location: Location,
}

impl Param {
    pub fn native_type(
        &self,
        table: &TypeTable,
    ) -> Result<String, crate::error::UnsupportedTargetError> {
        table
            .native_type(self.ty, self.calltype, self.const_ || self.shared)
            .map_err(|e| crate::error::UnsupportedTargetError::new(e.message, self.location.clone()))
    }

    pub fn rust_type(
        &self,
        table: &TypeTable,
    ) -> Result<String, crate::error::UnsupportedTargetError> {
        if self.shared {
            return Err(crate::error::UnsupportedTargetError::new(
                "[shared] is unsupported",
                self.location.clone(),
            ));
        }
        table
            .rust_type(self.ty, self.calltype)
            .map_err(|e| crate::error::UnsupportedTargetError::new(e.message, self.location.clone()))
    }

    pub fn to_idl(&self) -> String {
        format!(
            "{}{} {} {}",
            param_attlist_to_idl(&self.attlist),
            self.calltype.as_str(),
            self.type_id,
            self.name
        )
    }
}

/// Print a declaration attribute list the way the classic compiler did:
/// entries sorted by name.
pub fn attlist_to_idl(attlist: &[Attrib]) -> String {
    if attlist.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&Attrib> = attlist.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    let parts: Vec<String> = sorted
        .iter()
        .map(|a| match &a.value {
            Some(v) => format!("{}({})", a.name, v),
            None => a.name.clone(),
        })
        .collect();
    format!("[{}] ", parts.join(","))
}

// The classic compiler inherited this ordering from a hash-table walk and
// generated IDL depends on it, so two- and three-entry parameter lists use
// a fixed order instead of a sort.
const PARAM_ORDER_2: [&str; 5] = ["array", "shared", "iid_is", "size_is", "retval"];
const PARAM_ORDER_3: [&str; 3] = ["array", "size_is", "const"];

/// Print a parameter attribute list.
pub fn param_attlist_to_idl(attlist: &[Attrib]) -> String {
    if attlist.is_empty() {
        return String::new();
    }
    let mut rest: Vec<&Attrib> = attlist.iter().collect();
    let mut sorted: Vec<&Attrib> = Vec::with_capacity(rest.len());
    let hardcode: &[&str] = match attlist.len() {
        2 => &PARAM_ORDER_2,
        3 => &PARAM_ORDER_3,
        _ => &[],
    };
    for name in hardcode {
        let mut i = 0;
        while i < rest.len() {
            if rest[i].name == *name {
                sorted.push(rest.remove(i));
            } else {
                i += 1;
            }
        }
    }
    sorted.extend(rest);
    let parts: Vec<String> = sorted
        .iter()
        .map(|a| match &a.value {
            Some(v) => format!("{} ({})", a.name, v),
            None => a.name.clone(),
        })
        .collect();
    format!("[{}] ", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: Option<&str>) -> Attrib {
        Attrib {
            name: name.into(),
            value: value.map(str::to_owned),
            location: Location::builtin(),
        }
    }

    #[test]
    fn test_interface_attributes() {
        let attrs = InterfaceAttributes::from_attlist(
            &[
                attr("scriptable", None),
                attr("uuid", Some("00000000-0000-0000-0000-0000000000AB")),
                attr("object", None),
            ],
            &Location::builtin(),
        )
        .unwrap();
        assert!(attrs.scriptable);
        assert!(!attrs.builtinclass);
        // uuids are normalized to lowercase
        assert_eq!(attrs.uuid, "00000000-0000-0000-0000-0000000000ab");
    }

    #[test]
    fn test_uuid_is_required() {
        let err =
            InterfaceAttributes::from_attlist(&[attr("scriptable", None)], &Location::builtin())
                .unwrap_err();
        assert!(err.to_string().contains("no uuid"), "{err}");
    }

    #[test]
    fn test_value_rules() {
        let err = InterfaceAttributes::from_attlist(&[attr("uuid", None)], &Location::builtin())
            .unwrap_err();
        assert!(err.to_string().contains("expected value"), "{err}");

        let err = InterfaceAttributes::from_attlist(
            &[
                attr("uuid", Some("db242e01-e4d9-11d2-9dde-000064657374")),
                attr("scriptable", Some("yes")),
            ],
            &Location::builtin(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unexpected value"), "{err}");
    }

    #[test]
    fn test_attlist_printing() {
        assert_eq!(attlist_to_idl(&[]), "");
        assert_eq!(
            attlist_to_idl(&[attr("scriptable", None), attr("noscript", None)]),
            "[noscript,scriptable] "
        );
        assert_eq!(
            param_attlist_to_idl(&[attr("size_is", Some("n")), attr("array", None)]),
            "[array, size_is (n)] "
        );
        assert_eq!(
            param_attlist_to_idl(&[
                attr("const", None),
                attr("array", None),
                attr("size_is", Some("n")),
            ]),
            "[array, size_is (n), const] "
        );
    }
}
