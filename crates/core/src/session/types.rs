use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RsaKeyMaterial;

/// A single session attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SessionAttribute {
    Text(String),
    Flag(bool),
}

impl SessionAttribute {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl From<String> for SessionAttribute {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SessionAttribute {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for SessionAttribute {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// State of one OIDC login session.
///
/// Attributes are kept sorted by name so two equal values always encode to
/// the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionValue {
    pub attributes: BTreeMap<String, SessionAttribute>,
    pub rsa_key: Option<RsaKeyMaterial>,
}

impl SessionValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, replacing any previous value with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SessionAttribute>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_rsa_key(mut self, key: impl Into<RsaKeyMaterial>) -> Self {
        self.rsa_key = Some(key.into());
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SessionAttribute>,
    ) -> Option<SessionAttribute> {
        self.attributes.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<SessionAttribute> {
        self.attributes.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&SessionAttribute> {
        self.attributes.get(name)
    }

    /// Returns the attribute as text, or `None` if missing or a flag.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SessionAttribute::as_text)
    }

    /// Returns the attribute as a flag, or `None` if missing or text.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(SessionAttribute::as_flag)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True when there are no attributes and no key.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.rsa_key.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_text_and_flag_attributes() {
        let value = SessionValue::new().with("sub", "abc").with("active", true);

        assert_eq!(value.text("sub"), Some("abc"));
        assert_eq!(value.flag("active"), Some(true));
        assert_eq!(value.len(), 2);
        assert!(value.rsa_key.is_none());
    }

    #[test]
    fn typed_getters_do_not_coerce() {
        let value = SessionValue::new().with("sub", "abc").with("active", true);

        assert_eq!(value.flag("sub"), None);
        assert_eq!(value.text("active"), None);
        assert_eq!(value.text("missing"), None);
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut value = SessionValue::new().with("active", true);

        let previous = value.insert("active", false);

        assert_eq!(previous, Some(SessionAttribute::Flag(true)));
        assert_eq!(value.flag("active"), Some(false));
    }

    #[test]
    fn empty_value_has_no_attributes_or_key() {
        let mut value = SessionValue::new().with("sub", "abc");
        assert!(!value.is_empty());

        value.remove("sub");
        assert!(value.is_empty());
    }

    #[test]
    fn attribute_serializes_as_tagged_value() {
        let text = serde_json::to_value(SessionAttribute::from("abc")).unwrap();
        let flag = serde_json::to_value(SessionAttribute::from(false)).unwrap();

        assert_eq!(text, serde_json::json!({"type": "text", "value": "abc"}));
        assert_eq!(flag, serde_json::json!({"type": "flag", "value": false}));
    }
}
