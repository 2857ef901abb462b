//! Property-bag capability shared by every primitive in this crate.
//!
//! Composition replaces inheritance here: a type that wants property-bag
//! behaviour holds a [`PropertyBag`] and implements [`ToJson`], rather than
//! deriving from a common base.

use serde_json::{Map, Value};

/// Serialization hook: expose an object's backing state.
pub trait ToJson {
    /// Shape of the exposed state.
    type Output;

    /// Return the backing state.
    fn to_json(&self) -> Self::Output;
}

/// Plain key/value holder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    properties: Map<String, Value>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag from default properties.
    ///
    /// Anything other than a JSON object yields an empty bag.
    pub fn from_value(properties: Value) -> Self {
        match properties {
            Value::Object(properties) => Self { properties },
            _ => Self::default(),
        }
    }

    /// Read a property.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Remove a property.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// Number of properties.
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if the bag is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(properties: Map<String, Value>) -> Self {
        Self { properties }
    }
}

impl ToJson for PropertyBag {
    type Output = Value;

    fn to_json(&self) -> Value {
        Value::Object(self.properties.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_json_returns_backing_state() {
        let mut bag = PropertyBag::from_value(json!({ "key": "value" }));
        bag.set("count", 3);

        assert_eq!(bag.to_json(), json!({ "key": "value", "count": 3 }));
    }

    #[test]
    fn non_object_defaults_are_ignored() {
        assert!(PropertyBag::from_value(json!(null)).is_empty());
        assert!(PropertyBag::from_value(json!([1, 2])).is_empty());
    }

    #[test]
    fn set_and_remove_report_previous_values() {
        let mut bag = PropertyBag::new();
        assert_eq!(bag.set("a", 1), None);
        assert_eq!(bag.set("a", 2), Some(json!(1)));
        assert_eq!(bag.remove("a"), Some(json!(2)));
        assert!(bag.get("a").is_none());
    }
}
