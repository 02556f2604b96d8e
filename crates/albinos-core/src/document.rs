//! The persisted configuration document.
//!
//! One document per configuration row, stored as JSON text in the
//! `config_text` column:
//!
//! ```json
//! { "CONFIG_NAME": "...", "SETTINGS": { "name": "value" }, "INCLUDES": [2, 5] }
//! ```
//!
//! `INCLUDES` is kept sorted ascending and deduplicated on every write.
//! Rows written by older services used `OTHER_CONFIG` for the include list;
//! those are accepted on read and come out as `INCLUDES` on the next write.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::ConfigId;

/// JSON document carried by a configuration row.
///
/// The settings map preserves insertion order, which is the order
/// `CONFIG_GET_SETTINGS_NAMES` reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "CONFIG_NAME")]
    pub name: String,

    #[serde(rename = "SETTINGS", default)]
    pub settings: IndexMap<String, Value>,

    #[serde(rename = "INCLUDES", alias = "OTHER_CONFIG", default)]
    pub includes: Vec<ConfigId>,
}

impl ConfigDocument {
    /// Fresh document for a newly created configuration.
    pub fn new(name: impl Into<String>) -> Self {
        ConfigDocument {
            name: name.into(),
            settings: IndexMap::new(),
            includes: Vec::new(),
        }
    }

    /// Append an include and normalize the list (ascending, deduplicated).
    ///
    /// Returns the resulting list length.
    pub fn insert_include(&mut self, id: ConfigId) -> usize {
        self.includes.push(id);
        self.includes.sort_unstable();
        self.includes.dedup();
        self.includes.len()
    }

    /// Setting names in insertion order.
    pub fn setting_names(&self) -> Vec<String> {
        self.settings.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_json() {
        let mut doc = ConfigDocument::new("ma_config");
        doc.settings.insert("foo".into(), json!("bar"));
        doc.settings.insert("titi".into(), json!("1"));
        doc.insert_include(ConfigId(3));

        let text = serde_json::to_string(&doc).unwrap();
        let back: ConfigDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.setting_names(), vec!["foo", "titi"]);
    }

    #[test]
    fn accepts_legacy_other_config_field() {
        let text = r#"{"CONFIG_NAME":"old","SETTINGS":{},"OTHER_CONFIG":[4,2,4]}"#;
        let doc: ConfigDocument = serde_json::from_str(text).unwrap();
        assert_eq!(doc.includes, vec![ConfigId(4), ConfigId(2), ConfigId(4)]);

        // The next write comes out under the modern name.
        let rewritten = serde_json::to_string(&doc).unwrap();
        assert!(rewritten.contains("\"INCLUDES\""));
        assert!(!rewritten.contains("OTHER_CONFIG"));
    }

    #[test]
    fn insert_include_sorts_and_deduplicates() {
        let mut doc = ConfigDocument::new("cfg");
        assert_eq!(doc.insert_include(ConfigId(5)), 1);
        assert_eq!(doc.insert_include(ConfigId(2)), 2);
        assert_eq!(doc.insert_include(ConfigId(5)), 2);
        assert_eq!(doc.includes, vec![ConfigId(2), ConfigId(5)]);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: ConfigDocument = serde_json::from_str(r#"{"CONFIG_NAME":"bare"}"#).unwrap();
        assert!(doc.settings.is_empty());
        assert!(doc.includes.is_empty());
    }
}
