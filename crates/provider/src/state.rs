//! Terraform State Management
//!
//! Values exchanged with the host, and the [`ResourceData`] record that
//! resources read and mutate.

use std::collections::HashMap;

/// Configuration, plan or state value as handed over by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(HashMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }
}

/// Helper to extract an optional string attribute from a DynamicValue
pub fn get_optional_string_attr(value: &DynamicValue, key: &str) -> Option<String> {
    value.get(key).and_then(|v| match v {
        DynamicValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = HashMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// Create a null DynamicValue
pub fn null_value() -> DynamicValue {
    DynamicValue::Null
}

/// Identity plus attributes of one resource instance.
///
/// An empty id means the resource does not exist; the host drops it from
/// state and plans a recreate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    attributes: HashMap<String, DynamicValue>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record carrying only an identity, as handed over by an import.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Split a host state object into identity and attributes.
    pub fn from_state(value: &DynamicValue) -> Self {
        let mut attributes = value.as_map().cloned().unwrap_or_default();
        let id = match attributes.remove("id") {
            Some(DynamicValue::String(id)) => id,
            _ => String::new(),
        };

        Self { id, attributes }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.attributes.get(key)
    }

    /// String attribute, empty when unset or not a string
    pub fn get_string(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_string())
            .unwrap_or("")
            .to_string()
    }

    /// Non-empty string attribute
    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(DynamicValue::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: DynamicValue) {
        self.attributes.insert(key.into(), value);
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, string_value(value));
    }

    /// Host representation; null once the identity has been cleared.
    pub fn to_state(&self) -> DynamicValue {
        if !self.exists() {
            return DynamicValue::Null;
        }

        let mut map = self.attributes.clone();
        map.insert("id".to_string(), string_value(&self.id));
        DynamicValue::Map(map)
    }
}
