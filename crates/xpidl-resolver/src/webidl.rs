//! Configuration for `webidl` declarations.
//!
//! IDL can reference WebIDL-defined objects; the configuration maps each
//! name to the C++ type and header implementing it. Unconfigured names
//! fall back to `mozilla::dom::<Name>` with a header derived from the
//! type path.

use rustc_hash::FxHashMap;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebIdlEntry {
    pub native_type: Option<String>,
    pub header_file: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WebIdlConfig {
    entries: FxHashMap<String, WebIdlEntry>,
}

impl WebIdlConfig {
    pub fn new() -> Self {
        WebIdlConfig::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: FxHashMap<String, WebIdlEntry> = serde_json::from_str(json)?;
        Ok(WebIdlConfig { entries })
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: WebIdlEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// The (native type, header file) pair for a webidl name.
    pub fn lookup(&self, name: &str) -> (String, String) {
        let entry = self.entries.get(name);
        let native = entry
            .and_then(|e| e.native_type.clone())
            .unwrap_or_else(|| format!("mozilla::dom::{name}"));
        let header = entry
            .and_then(|e| e.header_file.clone())
            .unwrap_or_else(|| format!("{}.h", native.replace("::", "/")));
        (native, header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WebIdlConfig::new();
        let (native, header) = config.lookup("Document");
        assert_eq!(native, "mozilla::dom::Document");
        assert_eq!(header, "mozilla/dom/Document.h");
    }

    #[test]
    fn test_configured_entry() {
        let config = WebIdlConfig::from_json(
            r#"{
                "EventTarget": {
                    "nativeType": "mozilla::dom::EventTarget",
                    "headerFile": "mozilla/dom/EventTarget.h"
                },
                "Node": { "nativeType": "nsINode" }
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.lookup("EventTarget"),
            (
                "mozilla::dom::EventTarget".to_string(),
                "mozilla/dom/EventTarget.h".to_string()
            )
        );
        // header falls back to the path derived from the native type
        assert_eq!(
            config.lookup("Node"),
            ("nsINode".to_string(), "nsINode.h".to_string())
        );
    }
}
