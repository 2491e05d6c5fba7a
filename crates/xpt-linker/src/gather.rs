//! Lowering the resolved interface model into typelib descriptors.
//!
//! Only interfaces visible to script make it into the typelib: those
//! marked scriptable, plus shims. Attributes become getter/setter method
//! records, non-void returns become a trailing retval parameter, and
//! hidden methods keep their slot but drop their parameter info.

use xpidl_resolver::{
    CallType, Interface, Member, MethodMember, Param, ResolvedUnit, TypeNode, TypeRef, TypeTable,
};

use crate::descriptor::{
    ConstDescriptor, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, TypeDescriptor,
};
use crate::error::LinkError;

/// Lower every typelib-visible interface of a resolved unit.
pub fn gather_descriptors(
    unit: &ResolvedUnit,
    table: &TypeTable,
) -> Result<Vec<InterfaceDescriptor>, LinkError> {
    let mut descriptors = Vec::new();
    for r in unit.interfaces() {
        let iface = match table.interface(r) {
            Some(iface) => iface,
            None => continue,
        };
        if !iface.attributes.scriptable && iface.attributes.shim.is_none() {
            continue;
        }
        descriptors.push(lower_interface(iface, table)?);
    }
    Ok(descriptors)
}

fn lower_interface(
    iface: &Interface,
    table: &TypeTable,
) -> Result<InterfaceDescriptor, LinkError> {
    let mut flags = Vec::new();
    if iface.attributes.scriptable {
        flags.push("scriptable".to_owned());
    }
    if iface.attributes.builtinclass || iface.implicit_builtinclass {
        flags.push("builtinclass".to_owned());
    }
    if iface.attributes.function {
        flags.push("function".to_owned());
    }
    if iface.attributes.main_process_scriptable_only {
        flags.push("main_process_only".to_owned());
    }

    let mut methods = Vec::new();
    let mut consts = Vec::new();
    // A shim's methods and constants come from its WebIDL binding, so its
    // own member list never reaches the typelib.
    if iface.attributes.shim.is_none() {
        for member in &iface.members {
            match member {
                Member::Attribute(attr) => {
                    let hidden = attr.noscript;
                    methods.push(lower_getter(attr, iface, table, hidden)?);
                    if !attr.readonly {
                        methods.push(lower_setter(attr, iface, table, hidden)?);
                    }
                }
                Member::Method(method) => {
                    methods.push(lower_method(method, iface, table)?);
                }
                Member::Const(c) => {
                    let tag = table.xpt_tag(c.ty).ok_or_else(|| {
                        LinkError::UnsupportedType(table.name_of(c.ty))
                    })?;
                    consts.push(ConstDescriptor {
                        name: c.name.clone(),
                        ty: TypeDescriptor::new(tag),
                        value: c.value(),
                    });
                }
                Member::Cdata(_) => {}
            }
        }
    }

    Ok(InterfaceDescriptor {
        name: iface.name.clone(),
        uuid: iface.attributes.uuid.clone(),
        parent: iface.base.map(|b| table.name_of(b)),
        flags,
        methods,
        consts,
        shim: iface.attributes.shim.clone(),
        shimfile: iface.attributes.shimfile.clone(),
    })
}

fn lower_getter(
    attr: &xpidl_resolver::AttributeMember,
    iface: &Interface,
    table: &TypeTable,
    hidden: bool,
) -> Result<MethodDescriptor, LinkError> {
    let mut flags = vec!["getter".to_owned(), "hasretval".to_owned()];
    let params = if hidden {
        flags.push("hidden".to_owned());
        Vec::new()
    } else {
        vec![ParamDescriptor {
            ty: lower_type(table, attr.ty, iface, None, None)?,
            flags: vec!["out".to_owned()],
        }]
    };
    Ok(MethodDescriptor {
        name: attr.name.clone(),
        params,
        flags,
    })
}

fn lower_setter(
    attr: &xpidl_resolver::AttributeMember,
    iface: &Interface,
    table: &TypeTable,
    hidden: bool,
) -> Result<MethodDescriptor, LinkError> {
    let mut flags = vec!["setter".to_owned()];
    let params = if hidden {
        flags.push("hidden".to_owned());
        Vec::new()
    } else {
        vec![ParamDescriptor {
            ty: lower_type(table, attr.ty, iface, None, None)?,
            flags: vec!["in".to_owned()],
        }]
    };
    Ok(MethodDescriptor {
        name: attr.name.clone(),
        params,
        flags,
    })
}

fn lower_method(
    method: &MethodMember,
    iface: &Interface,
    table: &TypeTable,
) -> Result<MethodDescriptor, LinkError> {
    let hidden = method.noscript;
    let returns_value = !is_void(table, method.ty);
    let mut hasretval = returns_value || method.params.iter().any(|p| p.retval);

    let mut flags = Vec::new();
    if method.notxpcom {
        flags.push("notxpcom".to_owned());
    }
    if hidden {
        flags.push("hidden".to_owned());
    }
    if method.optional_argc {
        flags.push("optargc".to_owned());
    }
    if method.implicit_jscontext {
        flags.push("jscontext".to_owned());
    }

    // Hidden and notxpcom methods still occupy a vtable slot, but their
    // parameter types may not be scriptable, so no parameter info is kept.
    let params = if hidden || method.notxpcom {
        Vec::new()
    } else {
        let mut params = Vec::with_capacity(method.params.len() + 1);
        for param in &method.params {
            params.push(lower_param(param, method, iface, table)?);
        }
        if returns_value {
            params.push(ParamDescriptor {
                ty: lower_type(table, method.ty, iface, None, None)?,
                flags: vec!["out".to_owned(), "retval".to_owned()],
            });
            hasretval = true;
        }
        params
    };

    if hasretval {
        flags.push("hasretval".to_owned());
    }

    Ok(MethodDescriptor {
        name: method.name.clone(),
        params,
        flags,
    })
}

fn lower_param(
    param: &Param,
    method: &MethodMember,
    iface: &Interface,
    table: &TypeTable,
) -> Result<ParamDescriptor, LinkError> {
    let mut flags = Vec::new();
    match param.calltype {
        CallType::In => flags.push("in".to_owned()),
        CallType::Out => flags.push("out".to_owned()),
        CallType::InOut => {
            flags.push("in".to_owned());
            flags.push("out".to_owned());
        }
        CallType::Own => {}
    }
    if param.retval {
        flags.push("retval".to_owned());
    }
    if param.optional {
        flags.push("optional".to_owned());
    }

    let size_is = sibling_index(param.size_is.as_deref(), method, iface)?;
    let iid_is = sibling_index(param.iid_is.as_deref(), method, iface)?;

    Ok(ParamDescriptor {
        ty: lower_type(table, param.ty, iface, size_is, iid_is)?,
        flags,
    })
}

fn sibling_index(
    name: Option<&str>,
    method: &MethodMember,
    iface: &Interface,
) -> Result<Option<u8>, LinkError> {
    let name = match name {
        Some(name) => name,
        None => return Ok(None),
    };
    let idx = method
        .params
        .iter()
        .position(|p| p.name == name)
        .ok_or_else(|| {
            LinkError::malformed(
                &iface.name,
                format!("method '{}' references unknown parameter '{name}'", method.name),
            )
        })?;
    u8::try_from(idx).map(Some).map_err(|_| {
        LinkError::malformed(&iface.name, "parameter index exceeds a byte")
    })
}

fn is_void(table: &TypeTable, r: TypeRef) -> bool {
    table
        .as_builtin(r)
        .map(|b| b.name == "void")
        .unwrap_or(false)
}

/// Lower a resolved type to its wire descriptor.
fn lower_type(
    table: &TypeTable,
    r: TypeRef,
    iface: &Interface,
    size_is: Option<u8>,
    iid_is: Option<u8>,
) -> Result<TypeDescriptor, LinkError> {
    let unaliased = table.unalias(r);
    match table.get(unaliased) {
        TypeNode::Builtin(b) => {
            let tag = b
                .xpt
                .ok_or_else(|| LinkError::UnsupportedType(b.name.to_owned()))?;
            let mut desc = match (tag, size_is) {
                // Sized strings use distinct tags carrying the length
                // parameter index.
                ("TD_PSTRING", Some(_)) => TypeDescriptor::new("TD_PSTRING_SIZE_IS"),
                ("TD_PWSTRING", Some(_)) => TypeDescriptor::new("TD_PWSTRING_SIZE_IS"),
                _ => TypeDescriptor::new(tag),
            };
            if desc.tag.ends_with("_SIZE_IS") {
                desc.size_is = size_is;
            }
            if tag == "TD_INTERFACE_IS_TYPE" {
                desc.iid_is = Some(iid_is.ok_or_else(|| {
                    LinkError::malformed(&iface.name, "nsQIResult parameter without [iid_is]")
                })?);
            }
            Ok(desc)
        }
        TypeNode::Interface(target) => {
            let mut desc = TypeDescriptor::new("TD_INTERFACE_TYPE");
            desc.name = Some(target.name.clone());
            Ok(desc)
        }
        TypeNode::Forward { name, .. } => {
            let mut desc = TypeDescriptor::new("TD_INTERFACE_TYPE");
            desc.name = Some(name.clone());
            Ok(desc)
        }
        TypeNode::WebIdl {
            name,
            native,
            header_file,
            ..
        } => {
            let mut desc = TypeDescriptor::new("TD_DOMOBJECT");
            desc.name = Some(name.clone());
            desc.native = Some(native.clone());
            desc.header_file = Some(header_file.clone());
            Ok(desc)
        }
        TypeNode::Array { element, .. } => {
            let mut desc = TypeDescriptor::new("TD_ARRAY");
            desc.size_is = Some(size_is.ok_or_else(|| {
                LinkError::malformed(&iface.name, "[array] parameter without [size_is]")
            })?);
            desc.element = Some(Box::new(lower_type(table, *element, iface, None, None)?));
            Ok(desc)
        }
        TypeNode::TArray { element, .. } => {
            let mut desc = TypeDescriptor::new("TD_TARRAY");
            desc.element = Some(Box::new(lower_type(table, *element, iface, None, None)?));
            Ok(desc)
        }
        TypeNode::Native { name, .. } => Err(LinkError::UnsupportedType(name.clone())),
        TypeNode::Typedef { .. } => unreachable!("unalias returned a typedef"),
    }
}
