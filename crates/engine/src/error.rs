use std::fmt::{self, Display, Formatter};

use async_graphql_parser::Pos;

use crate::{QueryPath, QueryPathSegment};

/// Classifies where in the pipeline an error was raised.
///
/// Codes stay on the server side: they drive logging and let embedders map errors to transport
/// statuses, but they are not part of the serialized response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    OperationParsingError,
    OperationValidationError,
    /// The document is valid but cannot run against this schema (missing mutation root, unknown operation name).
    OperationError,
    ArgumentCoercionError,
    FieldResolutionError,
    InternalServerError,
    GatewayTimeout,
}

/// An error in a GraphQL server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ServerError {
    /// An explanatory message of the error.
    pub message: String,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Pos>,
    /// If the error occurred in a resolver, the path to the error.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<QueryPathSegment>,
    #[serde(skip)]
    pub code: ErrorCode,
}

impl ServerError {
    pub fn new(message: impl Into<String>, pos: Option<Pos>) -> Self {
        Self {
            message: message.into(),
            locations: pos.into_iter().collect(),
            path: Vec::new(),
            code: ErrorCode::FieldResolutionError,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: &QueryPath) -> Self {
        if self.path.is_empty() {
            self.path = path.iter().cloned().collect();
        }
        self
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<async_graphql_parser::Error> for ServerError {
    fn from(error: async_graphql_parser::Error) -> Self {
        ServerError {
            message: error.to_string(),
            locations: error.positions().collect(),
            path: Vec::new(),
            code: ErrorCode::OperationParsingError,
        }
    }
}

/// Alias for `Result<T, ServerError>`.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// An error raised by a resolver.
///
/// Anything implementing `Display` converts into it, so resolvers can use `?` on their own
/// error types and the message ends up in the response as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub message: String,
}

impl Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn into_server_error(self, pos: Pos) -> ServerError {
        ServerError::new(self.message, Some(pos))
    }
}

impl<T: Display + Send + Sync + 'static> From<T> for Error {
    fn from(error: T) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// An error while coercing an input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueError {
    message: String,
}

impl InputValueError {
    fn new(message: String) -> Self {
        Self { message }
    }

    /// The expected input type did not match the actual input type.
    pub fn expected_type(expected: impl Display, actual: &async_graphql_value::ConstValue) -> Self {
        Self::new(format!(r#"Expected input type "{expected}", found {actual}."#))
    }

    /// A custom error message for a named type.
    pub fn ty_custom(ty: impl Display, msg: impl Display) -> Self {
        Self::new(format!(r#"Failed to parse "{ty}": {msg}"#))
    }

    /// Prefixes the message with the location of the offending value inside a nested input.
    #[must_use]
    pub fn within(self, location: impl Display) -> Self {
        Self::new(format!("{location}: {}", self.message))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_server_error(self, pos: Pos) -> ServerError {
        ServerError::new(self.message, Some(pos)).with_code(ErrorCode::ArgumentCoercionError)
    }
}

impl Display for InputValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An error while coercing an input value.
pub type InputValueResult<T> = Result<T, InputValueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_errors_keep_the_display_text() {
        #[derive(Debug)]
        struct NotFound;

        impl Display for NotFound {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("User was not found")
            }
        }

        let error: Error = NotFound.into();
        assert_eq!(error.message, "User was not found");
    }

    #[test]
    fn serialization_omits_empty_members() {
        let error = ServerError::new("boom", None);
        assert_eq!(serde_json::to_value(&error).unwrap(), serde_json::json!({"message": "boom"}));

        let error = ServerError::new("boom", Some(Pos { line: 1, column: 3 }))
            .with_path(&QueryPath::empty().child("users").child(0_usize));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({
                "message": "boom",
                "locations": [{"line": 1, "column": 3}],
                "path": ["users", 0]
            })
        );
    }
}
