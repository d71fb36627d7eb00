//! Messages embedded in the document for the inline pass.
//!
//! The payload is a JSON object keyed by message id. A value is either the
//! message text or an object with an optional `value` and an `attributes`
//! map:
//!
//! ```json
//! {
//!   "title": "Welcome",
//!   "search": { "attributes": { "placeholder": "Search" } }
//! }
//! ```

use indexmap::IndexMap;
use l10n_dom::Translation;
use serde::Deserialize;

pub type InlineMessages = IndexMap<String, InlineEntry>;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InlineEntry {
    Text(String),
    Message {
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        attributes: IndexMap<String, String>,
    },
}

impl InlineEntry {
    pub fn to_translation(&self) -> Translation {
        match self {
            Self::Text(text) => Translation::text(text.clone()),
            Self::Message { value, attributes } => Translation {
                value: value.clone(),
                attributes: attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_entry_shapes_parse_in_order() {
        let messages: InlineMessages = serde_json::from_str(
            r#"{
                "title": "Welcome",
                "search": { "attributes": { "placeholder": "Search", "title": "Find" } }
            }"#,
        )
        .unwrap();

        let ids: Vec<_> = messages.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["title", "search"]);
        assert_eq!(messages["title"].to_translation(), Translation::text("Welcome"));

        let search = messages["search"].to_translation();
        assert_eq!(search.value, None);
        assert_eq!(
            search.attributes,
            vec![
                ("placeholder".to_string(), "Search".to_string()),
                ("title".to_string(), "Find".to_string())
            ]
        );
    }

    #[test]
    fn non_string_values_are_rejected() {
        assert!(serde_json::from_str::<InlineMessages>(r#"{"count": 3}"#).is_err());
    }
}
