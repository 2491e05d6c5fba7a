//! C++ value construction helpers.
//!
//! The output file initializes private struct fields through generated
//! `constexpr` factory methods on a `friend` struct, so this file never
//! depends on the field order in the C++ headers. Each distinct struct
//! type gets one factory; each table entry is an [`Instance`] naming its
//! fields explicitly.

use std::fmt;

use rustc_hash::FxHashMap;

/// Indent a rendered value by one level.
pub fn indented(s: &str) -> String {
    s.replace('\n', "\n  ")
}

/// A field value in a generated instance. Booleans render as integers.
#[derive(Debug, Clone)]
pub enum Value {
    Raw(String),
    Bool(bool),
    Int(usize),
    Nested(Box<Instance>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Raw(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{}", *b as u8),
            Value::Int(n) => write!(f, "{n}"),
            Value::Nested(inst) => write!(f, "{inst}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Raw(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Raw(s.to_owned())
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Nested(Box::new(inst))
    }
}

/// One constructed table entry.
#[derive(Debug, Clone)]
pub struct Instance {
    ty: String,
    comment: String,
    /// (field, value) pairs in the factory's canonical order.
    fields: Vec<(&'static str, Value)>,
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| format!("\n/* {name} */ {}", indented(&value.to_string())))
            .collect();
        write!(
            f,
            "XPTConstruct::Mk_{}( // {}{})",
            self.ty,
            self.comment,
            indented(&body.join(","))
        )
    }
}

/// The set of factory methods the output needs, deduplicated by struct
/// type. Field lists are sorted so the generated signature is independent
/// of call-site order.
#[derive(Debug, Default)]
pub struct ConstructorSet {
    order: Vec<String>,
    fields: FxHashMap<String, Vec<&'static str>>,
}

impl ConstructorSet {
    pub fn new() -> Self {
        ConstructorSet::default()
    }

    /// Construct an instance of `ty`, registering its factory on first use.
    pub fn instance(
        &mut self,
        ty: &str,
        comment: impl Into<String>,
        mut fields: Vec<(&'static str, Value)>,
    ) -> Instance {
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let canonical = self.fields.entry(ty.to_owned()).or_insert_with(|| {
            self.order.push(ty.to_owned());
            fields.iter().map(|(name, _)| *name).collect()
        });
        debug_assert_eq!(
            &fields.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            canonical,
            "inconsistent field set for {ty}"
        );
        Instance {
            ty: ty.to_owned(),
            comment: comment.into(),
            fields,
        }
    }

    /// Factory declarations, one per registered struct type.
    pub fn decls(&self) -> String {
        let mut out = String::new();
        for ty in &self.order {
            out.push_str(&indented(&decl(ty, &self.fields[ty])));
        }
        out
    }
}

fn decl(ty: &str, fields: &[&'static str]) -> String {
    let pname = |field: &str| format!("a{}", field[1..].replace('.', "_"));

    let params: Vec<String> = fields
        .iter()
        .map(|field| format!("MTYPE({ty}, {field}) {}", pname(field)))
        .collect();
    let assigns: Vec<String> = fields
        .iter()
        .map(|field| format!("obj.{field} = {};", pname(field)))
        .collect();

    format!(
        "\nstatic constexpr {ty} Mk_{ty}(\n  {})\n{{\n  {ty} obj;\n  {}\n  return obj;\n}}",
        indented(&params.join(",\n")),
        indented(&assigns.join("\n")),
    )
}
