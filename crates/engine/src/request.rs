use std::{any::Any, collections::BTreeMap, fmt};

use async_graphql_value::{ConstValue, Name};
use serde::{Deserialize, Deserializer, Serialize};

use crate::context::Data;

/// Variables of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<Name, ConstValue>);

impl Variables {
    /// Get the variables from a GraphQL value.
    ///
    /// If the value is not a map, then no variables will be returned.
    pub fn from_value(value: ConstValue) -> Self {
        match value {
            ConstValue::Object(obj) => Self(obj.into_iter().collect()),
            _ => Self::default(),
        }
    }

    /// Get the values from a JSON value.
    ///
    /// If the value is not a map or the keys of a map are not valid GraphQL names, then no
    /// variables will be returned.
    pub fn from_json(value: serde_json::Value) -> Self {
        ConstValue::from_json(value).map(Self::from_value).unwrap_or_default()
    }

    pub fn get(&self, name: &Name) -> Option<&ConstValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ConstValue) {
        self.0.insert(Name::new(name.into()), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Variables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `null` is sent by clients as often as an absent or empty map.
        Ok(Self(
            <Option<BTreeMap<Name, ConstValue>>>::deserialize(deserializer)?.unwrap_or_default(),
        ))
    }
}

/// GraphQL request.
///
/// This can be deserialized from a structure of the query string, the operation name and the
/// variables. The names are all in `camelCase` (e.g. `operationName`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The query source of the request.
    #[serde(default)]
    pub query: String,

    /// The operation name of the request.
    #[serde(default)]
    pub operation_name: Option<String>,

    /// The variables of the request.
    #[serde(default)]
    pub variables: Variables,

    /// The data of the request that can be accessed through `ResolverContext::data`.
    #[serde(skip)]
    pub data: Data,
}

impl Request {
    /// Create a request object with query source.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Variables::default(),
            data: Data::default(),
        }
    }

    /// Specify the operation name of the request.
    #[must_use]
    pub fn operation_name<T: Into<String>>(self, name: T) -> Self {
        Self {
            operation_name: Some(name.into()),
            ..self
        }
    }

    /// Specify the variables.
    #[must_use]
    pub fn variables(self, variables: Variables) -> Self {
        Self { variables, ..self }
    }

    /// Insert some data for this request.
    #[must_use]
    pub fn data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.insert(data);
        self
    }
}

impl<T: Into<String>> From<T> for Request {
    fn from(query: T) -> Self {
        Self::new(query)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("query", &self.query)
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_request() {
        let request: Request = serde_json::from_value(json!({
            "query": "query Q($id: UUID!) { user(id: $id) { name } }",
            "operationName": "Q",
            "variables": { "id": "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc" }
        }))
        .unwrap();

        assert_eq!(request.operation_name.as_deref(), Some("Q"));
        assert_eq!(
            request.variables.get(&Name::new("id")),
            Some(&ConstValue::String("0a7c5d4e-2f1b-4c3d-9e8f-123456789abc".to_string()))
        );
    }

    #[test]
    fn null_and_missing_variables() {
        let request: Request = serde_json::from_value(json!({ "query": "{ a }", "variables": null })).unwrap();
        assert!(request.variables.is_empty());

        let request: Request = serde_json::from_value(json!({ "query": "{ a }" })).unwrap();
        assert!(request.variables.is_empty());
        assert!(request.operation_name.is_none());
    }

    #[test]
    fn variables_from_json_ignore_non_objects() {
        assert!(Variables::from_json(json!([1, 2])).is_empty());
        assert!(!Variables::from_json(json!({ "a": 1 })).is_empty());
    }
}
