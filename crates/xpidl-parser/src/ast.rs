//! Unresolved syntax tree for XPIDL files.
//!
//! The parser produces these nodes without interpreting names or attribute
//! lists; the resolver turns them into the typed, validated model. Nodes
//! are immutable once built.

use crate::token::Location;

/// A parsed IDL file: the ordered top-level productions plus the file
/// itself as the first dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct Idl {
    pub productions: Vec<Production>,
    pub deps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    Include(Include),
    Cdata(Cdata),
    Typedef(TypedefDecl),
    Native(NativeDecl),
    WebIdl(WebIdlDecl),
    Forward(ForwardDecl),
    Interface(InterfaceDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub filename: String,
    pub location: Location,
}

/// Raw passthrough block. Newline runs in the body are collapsed to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Cdata {
    pub data: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedefDecl {
    pub ty: TypeId,
    pub name: String,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeDecl {
    pub name: String,
    pub native_name: String,
    pub attlist: Vec<Attrib>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebIdlDecl {
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDecl {
    pub name: String,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub attlist: Vec<Attrib>,
    pub base: Option<String>,
    pub members: Vec<Member>,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

/// One `[key]` or `[key(value)]` entry from a bracketed attribute list.
#[derive(Debug, Clone, PartialEq)]
pub struct Attrib {
    pub name: String,
    pub value: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Cdata(Cdata),
    Const(ConstMemberDecl),
    Attribute(AttributeDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstMemberDecl {
    pub ty: TypeId,
    pub name: String,
    pub value: ConstExpr,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub ty: TypeId,
    pub name: String,
    pub attlist: Vec<Attrib>,
    pub readonly: bool,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub ty: TypeId,
    pub name: String,
    pub attlist: Vec<Attrib>,
    pub params: Vec<ParamDecl>,
    pub raises: Vec<String>,
    pub location: Location,
    pub doc_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub direction: Direction,
    pub ty: TypeId,
    pub name: String,
    pub attlist: Vec<Attrib>,
    pub location: Location,
}

/// Parameter calling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
        }
    }
}

/// A type reference as written: a name plus optional template parameters
/// (only `TArray<T>` is meaningful; validation happens at resolution).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeId {
    pub name: String,
    pub params: Vec<TypeId>,
}

impl TypeId {
    pub fn new(name: impl Into<String>) -> Self {
        TypeId {
            name: name.into(),
            params: Vec::new(),
        }
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, "{}<{}>", self.name, params.join(", "))
        }
    }
}

/// Constant value expressions, evaluated lazily against the owning
/// interface so constants may reference ones declared later in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstExpr {
    Literal(i64),
    /// A reference to a named constant in the owning interface or one of
    /// its bases.
    Name(String, Location),
    Neg(Box<ConstExpr>),
    Binary {
        op: BinOp,
        lhs: Box<ConstExpr>,
        rhs: Box<ConstExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    Or,
}
