use async_graphql_value::ConstValue;
use serde::Serialize;

use crate::ServerError;

/// Query response
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Response {
    /// Data of query result. Absent when the request failed before execution started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ConstValue>,

    /// Errors, in the order they were detected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl Response {
    /// Create a new successful response with the data.
    pub fn new(data: impl Into<ConstValue>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Create a response from some errors, without data.
    pub fn from_errors(errors: Vec<ServerError>) -> Self {
        Self {
            data: None,
            errors,
        }
    }

    /// Set the errors of the response.
    #[must_use]
    pub fn with_errors(self, errors: Vec<ServerError>) -> Self {
        Self { errors, ..self }
    }

    /// Returns `true` if the response is ok.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` if the response is error.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::Pos;
    use serde_json::json;

    use super::*;
    use crate::{ErrorCode, QueryPath};

    #[test]
    fn data_and_errors() {
        let path = QueryPath::empty().child("users").child(1_usize).child("name");
        let response = Response::new(ConstValue::from_json(json!({ "users": [{ "name": "a" }, null] })).unwrap())
            .with_errors(vec![ServerError::new("boom", Some(Pos { line: 1, column: 10 })).with_path(&path)]);

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "users": [
              {
                "name": "a"
              },
              null
            ]
          },
          "errors": [
            {
              "message": "boom",
              "locations": [
                {
                  "line": 1,
                  "column": 10
                }
              ],
              "path": [
                "users",
                1,
                "name"
              ]
            }
          ]
        }
        "###);
    }

    #[test]
    fn errors_only() {
        let response = Response::from_errors(vec![
            ServerError::new("Request timed out", None).with_code(ErrorCode::GatewayTimeout)
        ]);

        assert!(response.is_err());
        assert_eq!(response.to_json(), json!({ "errors": [{ "message": "Request timed out" }] }));
    }
}
