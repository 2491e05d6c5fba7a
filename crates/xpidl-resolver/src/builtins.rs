//! The builtin XPIDL types.
//!
//! Each builtin carries optional C++ and Rust representation triples
//! (in, out/inout, owned) and an optional wire tag. A missing triple or a
//! `None` slot inside one means the type has no representation for that
//! target or calltype, which surfaces as an `UnsupportedTargetError`.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::types::CallType;

/// Per-target representation strings, indexed by calltype.
#[derive(Debug, Clone, PartialEq)]
pub struct Repr {
    templates: [Option<String>; 3],
}

impl Repr {
    pub fn new(
        in_: Option<&str>,
        out: Option<&str>,
        own: Option<&str>,
    ) -> Self {
        Repr {
            templates: [
                in_.map(str::to_owned),
                out.map(str::to_owned),
                own.map(str::to_owned),
            ],
        }
    }

    /// Scalar shorthand: `T` in-param, `T*` out-param, `T` owned.
    pub fn scalar(t: &str) -> Self {
        Repr::new(Some(t), Some(&format!("{t}*")), Some(t))
    }

    /// Scalar shorthand for raw Rust pointers: `T`, `*mut T`, `T`.
    pub fn scalar_rust(t: &str) -> Self {
        Repr::new(Some(t), Some(&format!("*mut {t}")), Some(t))
    }

    pub fn get(&self, calltype: CallType) -> Option<&str> {
        self.templates[calltype.index()].as_deref()
    }
}

/// One entry in the builtin registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Builtin {
    pub name: &'static str,
    pub cxx: Option<Repr>,
    pub rust: Option<Repr>,
    /// Wire tag when the type is scriptable (`TD_*`).
    pub xpt: Option<&'static str>,
    /// Whether the type may carry interface constants.
    pub maybe_const: bool,
}

impl Builtin {
    fn new(
        name: &'static str,
        cxx: Option<Repr>,
        rust: Option<Repr>,
        xpt: Option<&'static str>,
        maybe_const: bool,
    ) -> Self {
        Builtin {
            name,
            cxx,
            rust,
            xpt,
            maybe_const,
        }
    }

    pub fn is_scriptable(&self) -> bool {
        self.xpt.is_some()
    }
}

/// Registry of all builtin type names, including the multi-word integer
/// spellings, which the lexer merges into single identifiers.
pub static BUILTINS: Lazy<FxHashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    let mut add = |b: Builtin| {
        map.insert(b.name, b);
    };

    let scalar = |name, cxx: &str, rust: &str, xpt, maybe_const| {
        Builtin::new(
            name,
            Some(Repr::scalar(cxx)),
            Some(Repr::scalar_rust(rust)),
            Some(xpt),
            maybe_const,
        )
    };

    add(scalar("boolean", "bool", "bool", "TD_BOOL", false));
    add(scalar("void", "void", "libc::c_void", "TD_VOID", false));
    add(scalar("octet", "uint8_t", "libc::uint8_t", "TD_UINT8", false));
    add(scalar("short", "int16_t", "libc::int16_t", "TD_INT16", true));
    add(scalar("long", "int32_t", "libc::int32_t", "TD_INT32", true));
    add(scalar("long long", "int64_t", "libc::int64_t", "TD_INT64", false));
    add(scalar("unsigned short", "uint16_t", "libc::uint16_t", "TD_UINT16", true));
    add(scalar("unsigned long", "uint32_t", "libc::uint32_t", "TD_UINT32", true));
    add(scalar("unsigned long long", "uint64_t", "libc::uint64_t", "TD_UINT64", false));
    add(scalar("float", "float", "libc::c_float", "TD_FLOAT", false));
    add(scalar("double", "double", "libc::c_double", "TD_DOUBLE", false));
    add(scalar("char", "char", "libc::c_char", "TD_CHAR", false));
    add(scalar("wchar", "char16_t", "libc::int16_t", "TD_WCHAR", false));

    // String classes.
    for (name, xpt) in [("AString", "TD_ASTRING"), ("DOMString", "TD_DOMSTRING")] {
        add(Builtin::new(
            name,
            Some(Repr::new(
                Some("const nsAString&"),
                Some("nsAString&"),
                Some("nsString"),
            )),
            Some(Repr::new(
                Some("*const nsstring::nsAString"),
                Some("*mut nsstring::nsAString"),
                Some("nsstring::nsString"),
            )),
            Some(xpt),
            false,
        ));
    }
    for (name, xpt) in [("ACString", "TD_CSTRING"), ("AUTF8String", "TD_UTF8STRING")] {
        add(Builtin::new(
            name,
            Some(Repr::new(
                Some("const nsACString&"),
                Some("nsACString&"),
                Some("nsCString"),
            )),
            Some(Repr::new(
                Some("*const nsstring::nsACString"),
                Some("*mut nsstring::nsACString"),
                Some("nsstring::nsCString"),
            )),
            Some(xpt),
            false,
        ));
    }

    // Raw string pointers. No owned form.
    add(Builtin::new(
        "string",
        Some(Repr::new(Some("const char*"), Some("char**"), None)),
        None,
        Some("TD_PSTRING"),
        false,
    ));
    add(Builtin::new(
        "wstring",
        Some(Repr::new(Some("const char16_t*"), Some("char16_t**"), None)),
        None,
        Some("TD_PWSTRING"),
        false,
    ));

    // jsval uses handles for in/out-params and Value for owned elements.
    add(Builtin::new(
        "jsval",
        Some(Repr::new(
            Some("JS::HandleValue"),
            Some("JS::MutableHandleValue"),
            Some("JS::Value"),
        )),
        None,
        Some("TD_JSVAL"),
        false,
    ));

    // Promises are passed like interfaces.
    add(Builtin::new(
        "Promise",
        Some(Repr::new(
            Some("mozilla::dom::Promise*"),
            Some("mozilla::dom::Promise**"),
            Some("RefPtr<mozilla::dom::Promise>"),
        )),
        None,
        Some("TD_PROMISE"),
        false,
    ));

    // nsQIResult is the special void* used with iid_is parameters.
    add(Builtin::new(
        "nsQIResult",
        Some(Repr::new(Some("void*"), Some("void**"), None)),
        Some(Repr::new(
            Some("*const libc::c_void"),
            Some("*mut *mut libc::c_void"),
            None,
        )),
        Some("TD_INTERFACE_IS_TYPE"),
        false,
    ));

    // The nsID variants. Bare nsID is never scriptable and may appear in
    // Array<T>; the Ref and Ptr forms are passed indirectly.
    for (nsid, ref_name, ptr_name) in [
        ("nsID", "nsIDRef", "nsIDPtr"),
        ("nsIID", "nsIIDRef", "nsIIDPtr"),
        ("nsCID", "nsCIDRef", "nsCIDPtr"),
    ] {
        add(Builtin::new(
            nsid,
            Some(Repr::scalar(nsid)),
            Some(Repr::scalar_rust(nsid)),
            None,
            false,
        ));
        add(Builtin::new(
            ref_name,
            Some(Repr::new(
                Some(&format!("const {nsid}&")),
                Some(&format!("{nsid}&")),
                None,
            )),
            Some(Repr::new(
                Some(&format!("*const {nsid}")),
                Some(&format!("*mut {nsid}")),
                None,
            )),
            Some("TD_PNSIID"),
            false,
        ));
        add(Builtin::new(
            ptr_name,
            Some(Repr::new(
                Some(&format!("const {nsid}*")),
                Some(&format!("{nsid}**")),
                None,
            )),
            Some(Repr::new(
                Some(&format!("*const {nsid}")),
                Some(&format!("*mut *mut {nsid}")),
                None,
            )),
            Some("TD_PNSIID"),
            false,
        ));
    }

    map
});

/// Look up a builtin by name.
pub fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

/// These names are forward declared in IDL but never defined there, so the
/// Rust target refuses to reference them.
pub fn rust_denied_forward(name: &str) -> bool {
    matches!(name, "nsIFrame" | "nsIObjectFrame" | "nsSubDocumentFrame")
}
