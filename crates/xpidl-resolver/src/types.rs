//! The resolved type arena.
//!
//! All named types, including builtins and every interface from every
//! resolved file, live in one `TypeTable` owned by the resolver. Types
//! reference each other through dense `TypeRef` indices, which stay valid
//! across recursively resolved includes.

use xpidl_parser::Location;

use crate::builtins::{rust_denied_forward, Builtin};
use crate::error::UnsupportedTargetError;
use crate::interface::Interface;

/// Index of a type in the [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(pub(crate) u32);

/// How a type is being passed. `Own` is the owned form used for array
/// elements and struct fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    In,
    Out,
    InOut,
    Own,
}

impl CallType {
    /// Representation-triple slot: out and inout share one.
    pub(crate) fn index(self) -> usize {
        match self {
            CallType::In => 0,
            CallType::Out | CallType::InOut => 1,
            CallType::Own => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallType::In => "in",
            CallType::Out => "out",
            CallType::InOut => "inout",
            CallType::Own => "own",
        }
    }
}

impl From<xpidl_parser::ast::Direction> for CallType {
    fn from(d: xpidl_parser::ast::Direction) -> Self {
        match d {
            xpidl_parser::ast::Direction::In => CallType::In,
            xpidl_parser::ast::Direction::Out => CallType::Out,
            xpidl_parser::ast::Direction::InOut => CallType::InOut,
        }
    }
}

/// `[ptr]` / `[ref]` modifier on a native declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeModifier {
    Ptr,
    Ref,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Builtin(&'static Builtin),
    Typedef {
        name: String,
        target: TypeRef,
        location: Location,
        doc_comments: Vec<String>,
    },
    Forward {
        name: String,
        location: Location,
        doc_comments: Vec<String>,
    },
    Native {
        name: String,
        native_name: String,
        modifier: Option<NativeModifier>,
        location: Location,
    },
    WebIdl {
        name: String,
        /// Fully qualified C++ type from the webidl configuration.
        native: String,
        header_file: String,
        location: Location,
    },
    Interface(Interface),
    /// Legacy `[array]` parameter type: a raw pointer plus a size_is
    /// sibling.
    Array { element: TypeRef, location: Location },
    /// `Array<T>`, passed as nsTArray.
    TArray { element: TypeRef, location: Location },
}

/// Arena of resolved types.
#[derive(Debug, Default)]
pub struct TypeTable {
    nodes: Vec<TypeNode>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    pub fn alloc(&mut self, node: TypeNode) -> TypeRef {
        let idx = self.nodes.len() as u32;
        self.nodes.push(node);
        TypeRef(idx)
    }

    pub fn get(&self, r: TypeRef) -> &TypeNode {
        &self.nodes[r.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, r: TypeRef) -> &mut TypeNode {
        &mut self.nodes[r.0 as usize]
    }

    pub fn interface(&self, r: TypeRef) -> Option<&Interface> {
        match self.get(r) {
            TypeNode::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    /// Display name, mainly for diagnostics.
    pub fn name_of(&self, r: TypeRef) -> String {
        match self.get(r) {
            TypeNode::Builtin(b) => b.name.to_owned(),
            TypeNode::Typedef { name, .. }
            | TypeNode::Forward { name, .. }
            | TypeNode::Native { name, .. }
            | TypeNode::WebIdl { name, .. } => name.clone(),
            TypeNode::Interface(iface) => iface.name.clone(),
            TypeNode::Array { element, .. } => format!("{}[]", self.name_of(*element)),
            TypeNode::TArray { element, .. } => format!("Array<{}>", self.name_of(*element)),
        }
    }

    pub fn location_of(&self, r: TypeRef) -> Location {
        match self.get(r) {
            TypeNode::Builtin(_) => Location::builtin(),
            TypeNode::Typedef { location, .. }
            | TypeNode::Forward { location, .. }
            | TypeNode::Native { location, .. }
            | TypeNode::WebIdl { location, .. }
            | TypeNode::Array { location, .. }
            | TypeNode::TArray { location, .. } => location.clone(),
            TypeNode::Interface(iface) => iface.location.clone(),
        }
    }

    /// Follow typedef links to the underlying type. Typedef targets always
    /// point at previously resolved nodes, so this terminates.
    pub fn unalias(&self, mut r: TypeRef) -> TypeRef {
        while let TypeNode::Typedef { target, .. } = self.get(r) {
            r = *target;
        }
        r
    }

    /// The unaliased builtin behind a type, if there is one.
    pub fn as_builtin(&self, r: TypeRef) -> Option<&'static Builtin> {
        match self.get(self.unalias(r)) {
            TypeNode::Builtin(b) => Some(b),
            _ => None,
        }
    }

    /// Whether values of the type can cross the script boundary.
    pub fn is_scriptable(&self, r: TypeRef) -> bool {
        match self.get(r) {
            TypeNode::Builtin(b) => b.is_scriptable(),
            TypeNode::Typedef { target, .. } => self.is_scriptable(*target),
            // As a *type*, any interface is scriptable, whatever its own
            // [scriptable] attribute says.
            TypeNode::Forward { .. } | TypeNode::Interface(_) | TypeNode::WebIdl { .. } => true,
            TypeNode::Native { .. } => false,
            TypeNode::Array { element, .. } | TypeNode::TArray { element, .. } => {
                self.is_scriptable(*element)
            }
        }
    }

    /// Wire tag for scriptable types.
    pub fn xpt_tag(&self, r: TypeRef) -> Option<&'static str> {
        match self.get(r) {
            TypeNode::Builtin(b) => b.xpt,
            TypeNode::Typedef { target, .. } => self.xpt_tag(*target),
            TypeNode::Forward { .. } | TypeNode::Interface(_) => Some("TD_INTERFACE_TYPE"),
            TypeNode::WebIdl { .. } => Some("TD_DOMOBJECT"),
            TypeNode::Native { .. } => None,
            TypeNode::Array { .. } => Some("TD_ARRAY"),
            TypeNode::TArray { .. } => Some("TD_TARRAY"),
        }
    }

    fn unsupported(&self, r: TypeRef, what: &str) -> UnsupportedTargetError {
        UnsupportedTargetError::new(
            format!("'{}' unsupported for {what}", self.name_of(r)),
            self.location_of(r),
        )
    }

    /// The C++ spelling of the type for the given calltype.
    pub fn native_type(
        &self,
        r: TypeRef,
        calltype: CallType,
        is_const: bool,
    ) -> Result<String, UnsupportedTargetError> {
        let konst = if is_const { "const " } else { "" };
        match self.get(r) {
            TypeNode::Builtin(b) => {
                let repr = b.cxx.as_ref().ok_or_else(|| self.unsupported(r, "c++"))?;
                repr.get(calltype)
                    .map(str::to_owned)
                    .ok_or_else(|| self.unsupported(r, calltype.as_str()))
            }
            TypeNode::Typedef { name, .. } => Ok(match calltype {
                CallType::In | CallType::Own => name.clone(),
                CallType::Out | CallType::InOut => format!("{name}*"),
            }),
            TypeNode::Forward { name, .. } => Ok(match calltype {
                CallType::In => format!("{name}*"),
                CallType::Out | CallType::InOut => format!("{name}**"),
                CallType::Own => format!("RefPtr<{name}>"),
            }),
            TypeNode::Native {
                native_name,
                modifier,
                ..
            } => match modifier {
                None => Ok(match calltype {
                    CallType::In | CallType::Own => native_name.clone(),
                    CallType::Out | CallType::InOut => format!("{native_name}*"),
                }),
                Some(NativeModifier::Ptr) => match calltype {
                    CallType::In => Ok(format!("{konst}{native_name}*")),
                    CallType::Out | CallType::InOut => Ok(format!("{native_name}**")),
                    CallType::Own => Err(self.unsupported(r, calltype.as_str())),
                },
                Some(NativeModifier::Ref) => match calltype {
                    CallType::In => Ok(format!("{konst}{native_name}&")),
                    CallType::Out | CallType::InOut => Ok(format!("{native_name}&")),
                    CallType::Own => Err(self.unsupported(r, calltype.as_str())),
                },
            },
            TypeNode::WebIdl { native, .. } => Ok(match calltype {
                CallType::In => format!("{native}*"),
                CallType::Out | CallType::InOut => format!("{native}**"),
                CallType::Own => format!("RefPtr<{native}>"),
            }),
            TypeNode::Interface(iface) => {
                let name = &iface.name;
                Ok(match calltype {
                    CallType::In => format!("{name}*"),
                    CallType::Out | CallType::InOut => format!("{name}**"),
                    CallType::Own => format!("RefPtr<{name}>"),
                })
            }
            TypeNode::Array { element, .. } => {
                let elt = self.native_type(*element, calltype, false)?;
                Ok(format!("{konst}{elt}*"))
            }
            TypeNode::TArray { element, .. } => {
                let elt = self.native_type(*element, CallType::Own, false)?;
                Ok(match calltype {
                    CallType::In => format!("const nsTArray<{elt}>&"),
                    CallType::Out | CallType::InOut => format!("nsTArray<{elt}>&"),
                    CallType::Own => format!("nsTArray<{elt}>"),
                })
            }
        }
    }

    /// The Rust spelling of the type for the given calltype. Many types
    /// have no Rust form; those report an unsupported target.
    pub fn rust_type(
        &self,
        r: TypeRef,
        calltype: CallType,
    ) -> Result<String, UnsupportedTargetError> {
        match self.get(r) {
            TypeNode::Builtin(b) => {
                let repr = b.rust.as_ref().ok_or_else(|| self.unsupported(r, "rust"))?;
                repr.get(calltype)
                    .map(str::to_owned)
                    .ok_or_else(|| self.unsupported(r, calltype.as_str()))
            }
            TypeNode::Typedef { name, .. } => Ok(match calltype {
                CallType::In | CallType::Own => name.clone(),
                CallType::Out | CallType::InOut => format!("*mut {name}"),
            }),
            TypeNode::Forward { name, .. } => {
                if rust_denied_forward(name) {
                    return Err(self.unsupported(r, "rust"));
                }
                match calltype {
                    CallType::In => Ok(format!("*const {name}")),
                    CallType::Out | CallType::InOut => Ok(format!("*mut *const {name}")),
                    CallType::Own => Err(self.unsupported(r, calltype.as_str())),
                }
            }
            TypeNode::Interface(iface) => match calltype {
                CallType::In => Ok(format!("*const {}", iface.name)),
                CallType::Out | CallType::InOut => Ok(format!("*mut *const {}", iface.name)),
                CallType::Own => Err(self.unsupported(r, calltype.as_str())),
            },
            TypeNode::Native { .. }
            | TypeNode::WebIdl { .. }
            | TypeNode::Array { .. }
            | TypeNode::TArray { .. } => Err(self.unsupported(r, "rust")),
        }
    }

    /// Total vtable entries for an interface, including its base chain.
    pub fn count_entries(&self, r: TypeRef) -> usize {
        let mut total = 0;
        let mut cursor = Some(r);
        while let Some(cur) = cursor {
            match self.get(cur) {
                TypeNode::Interface(iface) => {
                    total += iface.count_local_entries();
                    cursor = iface.base;
                }
                _ => break,
            }
        }
        total
    }
}
