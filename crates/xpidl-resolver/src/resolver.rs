//! Resolution of parsed IDL into the typed interface model.
//!
//! The resolver owns the shared [`TypeTable`]; every file resolved through
//! one resolver instance sees the same type refs, so `#include` graphs that
//! reach the same file twice agree on what its names mean. Each file gets
//! its own [`NameMap`] scope, seeded with the builtins and extended with
//! the names exported by everything it includes.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use xpidl_parser::ast;
use xpidl_parser::{parse, Location};

use crate::builtins;
use crate::error::{ResolveError, Warning};
use crate::expr;
use crate::interface::{
    AttributeMember, CdataMember, ConstMember, Interface, InterfaceAttributes, Member,
    MethodMember, Param, Sentinel,
};
use crate::names::NameMap;
use crate::types::{CallType, NativeModifier, TypeNode, TypeRef, TypeTable};
use crate::webidl::WebIdlConfig;

/// One resolved top-level production.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedProduction {
    Cdata { data: String, location: Location },
    Include { filename: String },
    Typedef(TypeRef),
    Native(TypeRef),
    WebIdl(TypeRef),
    Forward(TypeRef),
    Interface(TypeRef),
}

/// The result of resolving one file: its productions in order, the name
/// scope it ended with, and every file it depends on (itself first).
#[derive(Debug)]
pub struct ResolvedUnit {
    pub productions: Vec<ResolvedProduction>,
    pub names: NameMap,
    pub deps: Vec<String>,
}

impl ResolvedUnit {
    /// Interfaces defined in this file, in declaration order.
    pub fn interfaces(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.productions.iter().filter_map(|p| match p {
            ResolvedProduction::Interface(r) => Some(*r),
            _ => None,
        })
    }

    pub fn needs_js_types(&self, table: &TypeTable) -> bool {
        self.interfaces().any(|r| {
            table
                .interface(r)
                .map(|i| i.needs_js_types(table))
                .unwrap_or(false)
        })
    }
}

/// Names exported by an already-resolved include.
struct IncludeExports {
    names: Vec<(String, TypeRef)>,
    deps: Vec<String>,
}

pub struct Resolver {
    table: TypeTable,
    root_names: NameMap,
    include_dirs: Vec<PathBuf>,
    webidl_config: WebIdlConfig,
    warnings: Vec<Warning>,
    include_cache: FxHashMap<PathBuf, IncludeExports>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        let mut table = TypeTable::new();
        let root_names = NameMap::with_builtins(&mut table);
        Resolver {
            table,
            root_names,
            include_dirs: Vec::new(),
            webidl_config: WebIdlConfig::new(),
            warnings: Vec::new(),
            include_cache: FxHashMap::default(),
        }
    }

    pub fn add_include_dir(&mut self, dir: impl Into<PathBuf>) {
        self.include_dirs.push(dir.into());
    }

    pub fn set_webidl_config(&mut self, config: WebIdlConfig) {
        self.webidl_config = config;
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn resolve_file(&mut self, path: &Path) -> Result<ResolvedUnit, ResolveError> {
        let source = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.resolve_source(&source, &path.display().to_string())
    }

    pub fn resolve_source(
        &mut self,
        source: &str,
        file: &str,
    ) -> Result<ResolvedUnit, ResolveError> {
        let idl = parse(source, file)?;
        self.resolve_idl(idl)
    }

    fn resolve_idl(&mut self, idl: ast::Idl) -> Result<ResolvedUnit, ResolveError> {
        let mut names = self.root_names.sharing_builtins();
        let mut deps = idl.deps;
        let mut productions = Vec::with_capacity(idl.productions.len());

        for production in idl.productions {
            match production {
                ast::Production::Cdata(cdata) => {
                    productions.push(ResolvedProduction::Cdata {
                        data: cdata.data,
                        location: cdata.location,
                    });
                }
                ast::Production::Include(include) => {
                    self.resolve_include(&include, &mut names, &mut deps)?;
                    productions.push(ResolvedProduction::Include {
                        filename: include.filename,
                    });
                }
                ast::Production::Typedef(decl) => {
                    let target = self.resolve_type_id(&names, &decl.ty, &decl.location)?;
                    let name = fold_name(&decl.name);
                    let node = TypeNode::Typedef {
                        name: name.clone(),
                        target,
                        location: decl.location.clone(),
                        doc_comments: decl.doc_comments,
                    };
                    let r = self.table.alloc(node);
                    let canonical = names.set(&self.table, &name, r, &decl.location)?;
                    productions.push(ResolvedProduction::Typedef(canonical));
                }
                ast::Production::Native(decl) => {
                    let r = self.resolve_native(&decl)?;
                    let name = fold_name(&decl.name);
                    let canonical = names.set(&self.table, &name, r, &decl.location)?;
                    productions.push(ResolvedProduction::Native(canonical));
                }
                ast::Production::WebIdl(decl) => {
                    let name = fold_name(&decl.name);
                    let (native, header_file) = self.webidl_config.lookup(&name);
                    let node = TypeNode::WebIdl {
                        name: name.clone(),
                        native,
                        header_file,
                        location: decl.location.clone(),
                    };
                    let r = self.table.alloc(node);
                    let canonical = names.set(&self.table, &name, r, &decl.location)?;
                    productions.push(ResolvedProduction::WebIdl(canonical));
                }
                ast::Production::Forward(decl) => {
                    let name = fold_name(&decl.name);
                    let node = TypeNode::Forward {
                        name: name.clone(),
                        location: decl.location.clone(),
                        doc_comments: decl.doc_comments,
                    };
                    let r = self.table.alloc(node);
                    let canonical = names.set(&self.table, &name, r, &decl.location)?;
                    productions.push(ResolvedProduction::Forward(canonical));
                }
                ast::Production::Interface(decl) => {
                    let r = self.resolve_interface(&mut names, &decl)?;
                    productions.push(ResolvedProduction::Interface(r));
                }
            }
        }

        Ok(ResolvedUnit {
            productions,
            names,
            deps,
        })
    }

    fn resolve_include(
        &mut self,
        include: &ast::Include,
        names: &mut NameMap,
        deps: &mut Vec<String>,
    ) -> Result<(), ResolveError> {
        let mut candidates = vec![PathBuf::from(&include.filename)];
        for dir in &self.include_dirs {
            candidates.push(dir.join(&include.filename));
        }
        let path = candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ResolveError::FileNotFound {
                filename: include.filename.clone(),
                location: include.location.clone(),
            })?;
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());

        if !self.include_cache.contains_key(&key) {
            let unit = self.resolve_file(&path)?;
            let exports = IncludeExports {
                names: unit
                    .names
                    .iter()
                    .map(|(n, r)| (n.to_owned(), r))
                    .collect(),
                deps: unit.deps,
            };
            self.include_cache.insert(key.clone(), exports);
        }

        // Merge the include's exports into the current scope. Re-imports of
        // the same refs through diamond includes are no-ops.
        let exports = &self.include_cache[&key];
        let merged: Vec<(String, TypeRef)> = exports.names.clone();
        let extra_deps = exports.deps.clone();
        for (name, r) in merged {
            names.set(&self.table, &name, r, &include.location)?;
        }
        deps.extend(extra_deps);
        Ok(())
    }

    fn resolve_native(&mut self, decl: &ast::NativeDecl) -> Result<TypeRef, ResolveError> {
        let mut modifier = None;
        for attr in &decl.attlist {
            if attr.value.is_some() {
                return Err(ResolveError::constraint(
                    "unexpected attribute value",
                    attr.location.clone(),
                ));
            }
            match attr.name.as_str() {
                "ptr" | "ref" => {
                    if modifier.is_some() {
                        return Err(ResolveError::constraint(
                            "more than one ptr/ref modifier",
                            attr.location.clone(),
                        ));
                    }
                    modifier = Some(if attr.name == "ptr" {
                        NativeModifier::Ptr
                    } else {
                        NativeModifier::Ref
                    });
                }
                other => {
                    return Err(ResolveError::constraint(
                        format!("unexpected attribute '{other}'"),
                        attr.location.clone(),
                    ));
                }
            }
        }
        Ok(self.table.alloc(TypeNode::Native {
            name: fold_name(&decl.name),
            native_name: decl.native_name.clone(),
            modifier,
            location: decl.location.clone(),
        }))
    }

    fn resolve_type_id(
        &mut self,
        names: &NameMap,
        ty: &ast::TypeId,
        location: &Location,
    ) -> Result<TypeRef, ResolveError> {
        if !ty.params.is_empty() {
            if ty.name != "TArray" {
                return Err(ResolveError::name(
                    format!("unknown templated type '{}'", ty.name),
                    location.clone(),
                ));
            }
            if ty.params.len() != 1 {
                return Err(ResolveError::name(
                    "TArray takes exactly 1 parameter",
                    location.clone(),
                ));
            }
            let element = self.resolve_type_id(names, &ty.params[0], location)?;
            return Ok(self.table.alloc(TypeNode::TArray {
                element,
                location: location.clone(),
            }));
        }
        names.get(&ty.name).ok_or_else(|| {
            ResolveError::name(format!("type '{}' not found", ty.name), location.clone())
        })
    }

    fn resolve_interface(
        &mut self,
        names: &mut NameMap,
        decl: &ast::InterfaceDecl,
    ) -> Result<TypeRef, ResolveError> {
        let attributes = InterfaceAttributes::from_attlist(&decl.attlist, &decl.location)?;
        let name = fold_name(&decl.name);

        if attributes.function {
            let methods = decl
                .members
                .iter()
                .filter(|m| matches!(m, ast::Member::Method(_)))
                .count();
            if methods > 1 {
                return Err(ResolveError::constraint(
                    format!("interface '{name}' has multiple methods, but marked 'function'"),
                    decl.location.clone(),
                ));
            }
        }

        // Bind the name before resolving members so the interface can
        // reference itself.
        let placeholder = Interface {
            name: name.clone(),
            attributes: attributes.clone(),
            base: None,
            base_name: None,
            members: Vec::new(),
            location: decl.location.clone(),
            doc_comments: decl.doc_comments.clone(),
            implicit_builtinclass: false,
        };
        let self_ref = self.table.alloc(TypeNode::Interface(placeholder));
        let canonical = names.set(&self.table, &name, self_ref, &decl.location)?;
        if canonical != self_ref {
            // Benign duplicate reached through includes; keep the existing
            // definition.
            return Ok(canonical);
        }

        let mut implicit_builtinclass = false;
        let base = match &decl.base {
            None => None,
            Some(base_name) => {
                let base_ref = names.get(base_name).ok_or_else(|| {
                    ResolveError::name(
                        format!("type '{base_name}' not found"),
                        decl.location.clone(),
                    )
                })?;
                let base_iface = match self.table.get(base_ref) {
                    TypeNode::Interface(iface) => iface,
                    _ => {
                        return Err(ResolveError::ty(
                            format!(
                                "interface '{name}' inherits from non-interface type '{base_name}'"
                            ),
                            decl.location.clone(),
                        ));
                    }
                };
                if attributes.scriptable && !base_iface.attributes.scriptable {
                    self.warnings.push(Warning {
                        message: format!(
                            "interface '{name}' is scriptable but derives from \
                             non-scriptable '{base_name}'"
                        ),
                        location: decl.location.clone(),
                    });
                }
                if attributes.scriptable
                    && base_iface.attributes.builtinclass
                    && !attributes.builtinclass
                {
                    return Err(ResolveError::ty(
                        format!(
                            "interface '{name}' is not builtinclass but derives from \
                             builtinclass '{base_name}'"
                        ),
                        decl.location.clone(),
                    ));
                }
                if base_iface.implicit_builtinclass {
                    implicit_builtinclass = true;
                }
                Some(base_ref)
            }
        };

        let mut members = Vec::with_capacity(decl.members.len());
        let mut member_names: FxHashSet<String> = FxHashSet::default();
        for member in &decl.members {
            let resolved = match member {
                ast::Member::Cdata(cdata) => Member::Cdata(CdataMember {
                    data: cdata.data.clone(),
                    location: cdata.location.clone(),
                }),
                ast::Member::Const(c) => self.resolve_const(names, c)?,
                ast::Member::Attribute(a) => self.resolve_attribute(names, &attributes, a)?,
                ast::Member::Method(m) => {
                    let resolved = self.resolve_method(names, m)?;
                    if let Member::Method(method) = &resolved {
                        if method.notxpcom && name != "nsISupports" {
                            // A notxpcom method cannot be implemented from
                            // script.
                            implicit_builtinclass = true;
                        }
                    }
                    resolved
                }
            };
            if let Some(member_name) = resolved.name() {
                if builtins::builtin(member_name).is_some() {
                    return Err(ResolveError::name(
                        format!(
                            "name '{member_name}' is a builtin and cannot be redeclared"
                        ),
                        member_location(&resolved),
                    ));
                }
                if !member_names.insert(member_name.to_owned()) {
                    return Err(ResolveError::name(
                        format!("name '{member_name}' specified twice"),
                        member_location(&resolved),
                    ));
                }
            }
            members.push(resolved);
        }

        let mut iface = Interface {
            name: name.clone(),
            attributes,
            base,
            base_name: decl.base.clone(),
            members,
            location: decl.location.clone(),
            doc_comments: decl.doc_comments.clone(),
            implicit_builtinclass,
        };

        // Evaluate constants now that the whole member list and the base
        // chain are available.
        let mut values = Vec::new();
        for (idx, member) in iface.members.iter().enumerate() {
            if let Member::Const(c) = member {
                values.push((idx, expr::evaluate(&c.expr, &iface, &self.table)?));
            }
        }
        for (idx, value) in values {
            if let Member::Const(c) = &mut iface.members[idx] {
                c.value = Some(value);
            }
        }

        // 250 is the number of stub entries the xptcall stubs provide;
        // builtinclass interfaces never go through them.
        let mut entries = iface.count_local_entries();
        if let Some(base_ref) = iface.base {
            entries += self.table.count_entries(base_ref);
        }
        if entries > 250 && !iface.attributes.builtinclass {
            return Err(ResolveError::constraint(
                format!("interface '{name}' has too many entries"),
                decl.location.clone(),
            ));
        }

        *self.table.get_mut(self_ref) = TypeNode::Interface(iface);
        Ok(self_ref)
    }

    fn resolve_const(
        &mut self,
        names: &NameMap,
        decl: &ast::ConstMemberDecl,
    ) -> Result<Member, ResolveError> {
        let ty = self.resolve_type_id(names, &decl.ty, &decl.location)?;
        let const_ok = self
            .table
            .as_builtin(ty)
            .map(|b| b.maybe_const)
            .unwrap_or(false);
        if !const_ok {
            return Err(ResolveError::ty(
                format!("const may only be a short or long type, not {}", decl.ty),
                decl.location.clone(),
            ));
        }
        Ok(Member::Const(ConstMember {
            name: fold_name(&decl.name),
            ty,
            type_id: decl.ty.clone(),
            expr: decl.value.clone(),
            value: None,
            location: decl.location.clone(),
            doc_comments: decl.doc_comments.clone(),
        }))
    }

    fn resolve_attribute(
        &mut self,
        names: &NameMap,
        iface_attrs: &InterfaceAttributes,
        decl: &ast::AttributeDecl,
    ) -> Result<Member, ResolveError> {
        let mut attr = AttributeMember {
            name: fold_name(&decl.name),
            ty: TypeRef(0),
            type_id: decl.ty.clone(),
            readonly: decl.readonly,
            noscript: false,
            implicit_jscontext: false,
            nostdcall: false,
            must_use: false,
            infallible: false,
            binaryname: None,
            null: None,
            undefined: None,
            attlist: decl.attlist.clone(),
            location: decl.location.clone(),
            doc_comments: decl.doc_comments.clone(),
        };

        for a in &decl.attlist {
            match a.name.as_str() {
                "binaryname" => {
                    attr.binaryname = Some(require_value(a)?);
                }
                "Null" => {
                    let value = require_value(a)?;
                    if decl.readonly {
                        return Err(ResolveError::constraint(
                            "'Null' attribute only makes sense for setters",
                            a.location.clone(),
                        ));
                    }
                    attr.null = Some(parse_sentinel(&value, a, true)?);
                }
                "Undefined" => {
                    let value = require_value(a)?;
                    if decl.readonly {
                        return Err(ResolveError::constraint(
                            "'Undefined' attribute only makes sense for setters",
                            a.location.clone(),
                        ));
                    }
                    attr.undefined = Some(parse_sentinel(&value, a, false)?);
                }
                _ => {
                    require_no_value(a)?;
                    match a.name.as_str() {
                        "noscript" => attr.noscript = true,
                        "implicit_jscontext" => attr.implicit_jscontext = true,
                        "nostdcall" => attr.nostdcall = true,
                        "must_use" => attr.must_use = true,
                        "infallible" => attr.infallible = true,
                        other => {
                            return Err(ResolveError::constraint(
                                format!("unexpected attribute '{other}'"),
                                a.location.clone(),
                            ));
                        }
                    }
                }
            }
        }

        attr.ty = self.resolve_type_id(names, &decl.ty, &decl.location)?;

        let is_domstring = self
            .table
            .as_builtin(attr.ty)
            .map(|b| b.name == "DOMString")
            .unwrap_or(false);
        if attr.null.is_some() && !is_domstring {
            return Err(ResolveError::constraint(
                "'Null' attribute can only be used on DOMString",
                decl.location.clone(),
            ));
        }
        if attr.undefined.is_some() && !is_domstring {
            return Err(ResolveError::constraint(
                "'Undefined' attribute can only be used on DOMString",
                decl.location.clone(),
            ));
        }

        if attr.infallible {
            let representable = matches!(
                self.table.get(attr.ty),
                TypeNode::Builtin(_)
                    | TypeNode::Interface(_)
                    | TypeNode::Forward { .. }
                    | TypeNode::WebIdl { .. }
            );
            if !representable {
                return Err(ResolveError::constraint(
                    "[infallible] only works on interfaces, domobjects, and builtin types \
                     (numbers, booleans, and raw char types)",
                    decl.location.clone(),
                ));
            }
            if !iface_attrs.builtinclass {
                return Err(ResolveError::constraint(
                    "[infallible] attributes are only allowed on [builtinclass] interfaces",
                    decl.location.clone(),
                ));
            }
        }

        Ok(Member::Attribute(attr))
    }

    fn resolve_method(
        &mut self,
        names: &NameMap,
        decl: &ast::MethodDecl,
    ) -> Result<Member, ResolveError> {
        let mut method = MethodMember {
            name: fold_name(&decl.name),
            ty: TypeRef(0),
            type_id: decl.ty.clone(),
            noscript: false,
            notxpcom: false,
            implicit_jscontext: false,
            optional_argc: false,
            nostdcall: false,
            must_use: false,
            binaryname: None,
            params: Vec::with_capacity(decl.params.len()),
            raises: decl.raises.clone(),
            attlist: decl.attlist.clone(),
            location: decl.location.clone(),
            doc_comments: decl.doc_comments.clone(),
        };

        for a in &decl.attlist {
            if a.name == "binaryname" {
                method.binaryname = Some(require_value(a)?);
                continue;
            }
            require_no_value(a)?;
            match a.name.as_str() {
                "noscript" => method.noscript = true,
                "notxpcom" => method.notxpcom = true,
                "implicit_jscontext" => method.implicit_jscontext = true,
                "optional_argc" => method.optional_argc = true,
                "nostdcall" => method.nostdcall = true,
                "must_use" => method.must_use = true,
                other => {
                    return Err(ResolveError::constraint(
                        format!("unexpected attribute '{other}'"),
                        a.location.clone(),
                    ));
                }
            }
        }

        method.ty = self.resolve_type_id(names, &decl.ty, &decl.location)?;

        let mut param_names: FxHashSet<String> = FxHashSet::default();
        for p in &decl.params {
            let param = self.resolve_param(names, p)?;
            if !param_names.insert(param.name.clone()) {
                return Err(ResolveError::name(
                    format!("name '{}' specified twice", param.name),
                    param.location.clone(),
                ));
            }
            method.params.push(param);
        }

        for (idx, p) in method.params.iter().enumerate() {
            if p.retval && idx != method.params.len() - 1 {
                return Err(ResolveError::constraint(
                    format!("'retval' parameter '{}' is not the last parameter", p.name),
                    decl.location.clone(),
                ));
            }
            if let Some(size_is) = &p.size_is {
                let size_param = method
                    .params
                    .iter()
                    .find(|q| &q.name == size_is)
                    .ok_or_else(|| {
                        ResolveError::name(
                            format!("could not find size_is parameter '{size_is}'"),
                            decl.location.clone(),
                        )
                    })?;
                let is_u32 = self
                    .table
                    .as_builtin(size_param.ty)
                    .map(|b| b.name == "unsigned long")
                    .unwrap_or(false);
                if !is_u32 {
                    return Err(ResolveError::ty(
                        "size_is parameter must have type 'unsigned long'",
                        decl.location.clone(),
                    ));
                }
            }
        }

        Ok(Member::Method(method))
    }

    fn resolve_param(
        &mut self,
        names: &NameMap,
        decl: &ast::ParamDecl,
    ) -> Result<Param, ResolveError> {
        let mut param = Param {
            name: fold_name(&decl.name),
            calltype: CallType::from(decl.direction),
            ty: TypeRef(0),
            type_id: decl.ty.clone(),
            size_is: None,
            iid_is: None,
            const_: false,
            array: false,
            retval: false,
            shared: false,
            optional: false,
            attlist: decl.attlist.clone(),
            location: decl.location.clone(),
        };

        for a in &decl.attlist {
            match a.name.as_str() {
                "size_is" => param.size_is = Some(require_value(a)?),
                "iid_is" => param.iid_is = Some(require_value(a)?),
                _ => {
                    require_no_value(a)?;
                    match a.name.as_str() {
                        "const" => param.const_ = true,
                        "array" => param.array = true,
                        "retval" => param.retval = true,
                        "shared" => param.shared = true,
                        "optional" => param.optional = true,
                        other => {
                            return Err(ResolveError::constraint(
                                format!("unexpected attribute '{other}'"),
                                a.location.clone(),
                            ));
                        }
                    }
                }
            }
        }

        let mut ty = self.resolve_type_id(names, &decl.ty, &decl.location)?;
        if param.array {
            let element_name = self.table.as_builtin(ty).map(|b| b.name);
            if matches!(
                element_name,
                Some("jsval" | "DOMString" | "AUTF8String" | "ACString" | "AString")
            ) {
                return Err(ResolveError::ty(
                    "unsupported [array] element type",
                    decl.location.clone(),
                ));
            }
            ty = self.table.alloc(TypeNode::Array {
                element: ty,
                location: decl.location.clone(),
            });
        }
        param.ty = ty;
        Ok(param)
    }
}

/// Leading-underscore names are registered without the prefix.
fn fold_name(name: &str) -> String {
    name.strip_prefix('_').unwrap_or(name).to_owned()
}

fn member_location(member: &Member) -> Location {
    match member {
        Member::Cdata(c) => c.location.clone(),
        Member::Const(c) => c.location.clone(),
        Member::Attribute(a) => a.location.clone(),
        Member::Method(m) => m.location.clone(),
    }
}

fn require_value(attr: &ast::Attrib) -> Result<String, ResolveError> {
    attr.value.clone().ok_or_else(|| {
        ResolveError::constraint(
            format!("'{}' attribute requires a value", attr.name),
            attr.location.clone(),
        )
    })
}

fn require_no_value(attr: &ast::Attrib) -> Result<(), ResolveError> {
    if attr.value.is_some() {
        return Err(ResolveError::constraint(
            "unexpected attribute value",
            attr.location.clone(),
        ));
    }
    Ok(())
}

fn parse_sentinel(
    value: &str,
    attr: &ast::Attrib,
    allow_stringify: bool,
) -> Result<Sentinel, ResolveError> {
    match value {
        "Empty" => Ok(Sentinel::Empty),
        "Null" => Ok(Sentinel::Null),
        "Stringify" if allow_stringify => Ok(Sentinel::Stringify),
        _ => {
            let allowed = if allow_stringify {
                "'Empty', 'Null' or 'Stringify'"
            } else {
                "'Empty' or 'Null'"
            };
            Err(ResolveError::constraint(
                format!("'{}' attribute value must be {allowed}", attr.name),
                attr.location.clone(),
            ))
        }
    }
}
