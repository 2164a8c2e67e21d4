//! Query context.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use async_graphql_parser::{
    types::{Field, FragmentDefinition, OperationDefinition, SelectionSet},
    Pos, Positioned,
};
use async_graphql_value::Name;

use crate::{
    registry::{ObjectType, Registry},
    QueryPath, ServerError,
};

/// Schema/Context data.
///
/// This is a type map, allowing you to store anything inside it.
#[derive(Default)]
pub struct Data(HashMap<TypeId, Box<dyn Any + Sync + Send>>);

impl Data {
    /// Insert data.
    pub fn insert<D: Any + Send + Sync>(&mut self, data: D) {
        self.0.insert(TypeId::of::<D>(), Box::new(data));
    }

    pub fn get<D: Any + Send + Sync>(&self) -> Option<&D> {
        self.0.get(&TypeId::of::<D>()).and_then(|data| data.downcast_ref::<D>())
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Data").field(&self.0.len()).finish()
    }
}

/// Arguments of every field of the operation, coerced before execution starts.
///
/// Keyed by the position of the field in the document, which identifies it even when it sits in a
/// fragment spread in several places.
pub type CoercedArguments = HashMap<Pos, serde_json::Map<String, serde_json::Value>>;

/// Everything scoped to a single request.
pub struct QueryEnv {
    pub operation_name: Option<String>,
    pub operation: Positioned<OperationDefinition>,
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
    pub arguments: CoercedArguments,
    pub ctx_data: Arc<Data>,
    pub errors: Mutex<Vec<ServerError>>,
}

impl QueryEnv {
    /// Records an error where it is detected, keeping the order errors happen in.
    pub fn add_error(&self, error: ServerError) {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).push(error);
    }

    pub fn take_errors(&self) -> Vec<ServerError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Context for a selection set being resolved against an object type.
#[derive(Clone)]
pub struct ContextSelectionSet<'a> {
    /// The current path being resolved.
    pub path: QueryPath,
    /// The object type owning the selection set.
    pub ty: &'a ObjectType,
    /// The selection set being resolved
    pub item: &'a Positioned<SelectionSet>,
    pub registry: &'a Registry,
    /// Context scoped to the current query
    pub query_env: &'a QueryEnv,
}

impl<'a> ContextSelectionSet<'a> {
    pub fn with_field(&self, field: &'a Positioned<Field>) -> ContextField<'a> {
        ContextField {
            path: self.path.child(field.node.response_key().node.as_str()),
            item: field,
            parent_type: self.ty,
            registry: self.registry,
            query_env: self.query_env,
        }
    }

    pub fn add_error(&self, error: ServerError) {
        self.query_env.add_error(error);
    }
}

/// Context for a single field being resolved.
#[derive(Clone)]
pub struct ContextField<'a> {
    /// Path of the field, ending with its response key.
    pub path: QueryPath,
    pub item: &'a Positioned<Field>,
    pub parent_type: &'a ObjectType,
    pub registry: &'a Registry,
    pub query_env: &'a QueryEnv,
}

impl<'a> ContextField<'a> {
    /// Context for the selection set of this field, resolved against `ty` at `path`.
    ///
    /// `path` differs from the field path for list items.
    pub fn with_selection_set(&self, ty: &'a ObjectType, path: QueryPath) -> ContextSelectionSet<'a> {
        ContextSelectionSet {
            path,
            ty,
            item: &self.item.node.selection_set,
            registry: self.registry,
            query_env: self.query_env,
        }
    }

    pub fn field_name(&self) -> &'a str {
        self.item.node.name.node.as_str()
    }

    pub fn arguments(&self) -> serde_json::Map<String, serde_json::Value> {
        self.query_env
            .arguments
            .get(&self.item.pos)
            .cloned()
            .unwrap_or_default()
    }

    pub fn add_error(&self, error: ServerError) {
        self.query_env.add_error(error);
    }
}
