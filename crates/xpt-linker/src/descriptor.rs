//! The JSON typelib descriptor format.
//!
//! One `.idl` file compiles to a list of [`InterfaceDescriptor`]s; the
//! build links many such lists into one source unit. The format is flat
//! and self-contained so intermediate files can be merged by simple
//! concatenation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    /// Canonical lowercased `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
    pub uuid: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Interface flags: `scriptable`, `builtinclass`, `function`,
    /// `main_process_only`.
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub consts: Vec<ConstDescriptor>,
    #[serde(default)]
    pub shim: Option<String>,
    #[serde(default)]
    pub shimfile: Option<String>,
}

impl InterfaceDescriptor {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    /// Method flags: `getter`, `setter`, `notxpcom`, `hidden`, `optargc`,
    /// `jscontext`, `hasretval`.
    #[serde(default)]
    pub flags: Vec<String>,
}

impl MethodDescriptor {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Param flags: `in`, `out`, `optional`.
    #[serde(default)]
    pub flags: Vec<String>,
}

impl ParamDescriptor {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

/// A lowered type. The `tag` is the wire tag (`TD_*`); the remaining
/// fields are populated per tag: interfaces carry `name`, arrays carry
/// `element` and (for the legacy form) `size_is`, sized strings carry
/// `size_is`, `nsQIResult` carries `iid_is`, and DOM objects carry
/// `name`/`native`/`headerFile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<TypeDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_is: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iid_is: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<String>,
    #[serde(
        default,
        rename = "headerFile",
        skip_serializing_if = "Option::is_none"
    )]
    pub header_file: Option<String>,
}

impl TypeDescriptor {
    pub fn new(tag: impl Into<String>) -> Self {
        TypeDescriptor {
            tag: tag.into(),
            name: None,
            element: None,
            size_is: None,
            iid_is: None,
            native: None,
            header_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_json() {
        let json = r#"[
            {
                "name": "nsIFoo",
                "uuid": "01234567-89ab-cdef-0123-456789abcdef",
                "parent": "nsISupports",
                "flags": ["scriptable"],
                "methods": [
                    {
                        "name": "frob",
                        "params": [
                            {"type": {"tag": "TD_INT32"}, "flags": ["in"]}
                        ],
                        "flags": []
                    }
                ],
                "consts": [
                    {"name": "FLAG", "type": {"tag": "TD_UINT32"}, "value": 3}
                ],
                "shim": null,
                "shimfile": null
            }
        ]"#;
        let parsed: Vec<InterfaceDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].has_flag("scriptable"));
        assert_eq!(parsed[0].methods[0].params[0].ty.tag, "TD_INT32");
        assert_eq!(parsed[0].consts[0].value, 3);

        let reserialized = serde_json::to_string(&parsed).unwrap();
        let reparsed: Vec<InterfaceDescriptor> = serde_json::from_str(&reserialized).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"name": "nsIBare", "uuid": "00000000-0000-0000-0000-000000000000"}"#;
        let parsed: InterfaceDescriptor = serde_json::from_str(json).unwrap();
        assert!(parsed.parent.is_none());
        assert!(parsed.methods.is_empty());
        assert!(parsed.shim.is_none());
    }
}
