use std::sync::Arc;

use serde_json::Value;

/// ResolvedValue are values passed around between resolvers: what a resolver produced, and
/// therefore the parent value of every field selected beneath it.
///
/// Cheap to Clone.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue {
    data: Arc<Value>,
}

impl Default for ResolvedValue {
    fn default() -> Self {
        Self::null()
    }
}

impl ResolvedValue {
    pub fn new(value: Value) -> Self {
        Self { data: Arc::new(value) }
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn data_resolved(&self) -> &Value {
        &self.data
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Takes the inner value, cloning it only when other copies are still alive.
    pub fn take(self) -> Value {
        Arc::try_unwrap(self.data).unwrap_or_else(|data| Value::clone(&data))
    }

    /// Reads a same-named property off an object value. Anything else reads as null.
    pub fn get_field(&self, name: &str) -> ResolvedValue {
        match self.data.get(name) {
            Some(value) => ResolvedValue::new(value.clone()),
            None => ResolvedValue::null(),
        }
    }

    /// Splits an array value into one value per item, `None` if it is not an array.
    pub fn item_iter(&self) -> Option<impl Iterator<Item = ResolvedValue> + '_> {
        self.data
            .as_array()
            .map(|items| items.iter().cloned().map(ResolvedValue::new))
    }
}

impl From<Value> for ResolvedValue {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Map<String, Value>> for ResolvedValue {
    fn from(object: serde_json::Map<String, Value>) -> Self {
        Self::new(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ResolvedValue;

    #[test]
    fn property_reads() {
        let value = ResolvedValue::new(json!({"name": "alice", "balance": 1.5}));
        assert_eq!(value.get_field("name").data_resolved(), &json!("alice"));
        assert!(value.get_field("missing").is_null());
        assert!(ResolvedValue::new(json!(1)).get_field("name").is_null());
    }

    #[test]
    fn items_preserve_order() {
        let value = ResolvedValue::new(json!(["a", "b", "c"]));
        let items = value
            .item_iter()
            .map(|items| items.map(ResolvedValue::take).collect::<Vec<_>>());
        assert_eq!(items, Some(vec![json!("a"), json!("b"), json!("c")]));
        assert!(ResolvedValue::null().item_iter().is_none());
    }
}
