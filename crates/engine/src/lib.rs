//! A dynamic GraphQL execution engine.
//!
//! Types are described at runtime in a [`Registry`](registry::Registry), wrapped into a [`Schema`]
//! and every incoming [`Request`] goes through the same pipeline: parsing, validation, variable
//! and argument coercion, then concurrent resolution of the selection sets. Whatever happens, a
//! [`Response`] comes out, carrying the errors next to the partial data.

mod coercion;
pub mod config;
mod context;
mod error;
mod query_path;
pub mod registry;
mod request;
mod resolver_utils;
mod response;
mod schema;
mod validation;

pub use async_graphql_parser::{Pos, Positioned};
pub use async_graphql_value::{ConstValue, Name};

pub use context::{ContextField, ContextSelectionSet, Data, QueryEnv};
pub use error::{Error, ErrorCode, InputValueError, InputValueResult, ServerError, ServerResult};
pub use query_path::{QueryPath, QueryPathSegment};
pub use request::{Request, Variables};
pub use response::Response;
pub use schema::{Schema, SchemaBuilder};
pub use validation::RuleError;

/// Result type returned by resolvers.
pub type Result<T, E = Error> = std::result::Result<T, E>;
