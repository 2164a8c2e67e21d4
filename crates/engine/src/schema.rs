use std::{convert::Infallible, ops::Deref, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use async_graphql_parser::{
    parse_query,
    types::{Directive, DocumentOperations, ExecutableDocument, OperationDefinition, OperationType, Selection, SelectionSet},
    Positioned,
};
use async_graphql_value::ConstValue;
use futures_util::FutureExt;
use tracing::Instrument;

use crate::{
    coercion::{coerce_arguments, coerce_variables, VariableValues},
    config::EngineConfig,
    context::QueryEnv,
    registry::{ObjectType, Registry},
    resolver_utils::{resolve_root_container, resolve_root_container_serial, ErrorPropagation},
    validation::{check_rules, CONDITION_ARGUMENT, INCLUDE, SKIP},
    ContextSelectionSet, ErrorCode, InputValueError, QueryPath, Request, Response, ServerError, ServerResult,
};

/// Schema builder
pub struct SchemaBuilder {
    registry: Registry,
    depth: Option<usize>,
    timeout: Option<Duration>,
}

impl SchemaBuilder {
    /// Set the maximum depth a query can have. By default, there is no limit.
    #[must_use]
    pub fn limit_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set the time a request may take before it is answered with a timeout error. By default,
    /// there is no limit.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Applies the limits of an [`EngineConfig`].
    #[must_use]
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.depth = config.operation_limits.depth.map(usize::from);
        self.timeout = config.execution.timeout;
        self
    }

    /// Build schema.
    pub fn finish(self) -> Schema {
        Schema(Arc::new(SchemaInner {
            registry: self.registry,
            depth: self.depth,
            timeout: self.timeout,
        }))
    }
}

#[doc(hidden)]
pub struct SchemaInner {
    pub(crate) registry: Registry,
    pub(crate) depth: Option<usize>,
    pub(crate) timeout: Option<Duration>,
}

/// GraphQL schema.
///
/// Cloning a schema is cheap, so it can be easily shared.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

impl Deref for Schema {
    type Target = SchemaInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Schema {
    /// Create a schema builder
    pub fn build(registry: Registry) -> SchemaBuilder {
        SchemaBuilder {
            registry,
            depth: None,
            timeout: None,
        }
    }

    /// Create a schema
    pub fn new(registry: Registry) -> Schema {
        Self::build(registry).finish()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn root_type(&self, operation_type: OperationType) -> ServerResult<&ObjectType> {
        match operation_type {
            OperationType::Query => Ok(self.registry.query_type()),
            OperationType::Mutation => self.registry.mutation_type().ok_or_else(|| {
                ServerError::new("Schema is not configured for mutations.", None).with_code(ErrorCode::OperationError)
            }),
            OperationType::Subscription => Err(ServerError::new("Schema is not configured for subscriptions.", None)
                .with_code(ErrorCode::OperationError)),
        }
    }

    fn prepare_request(&self, request: Request) -> Result<QueryEnv, Vec<ServerError>> {
        let Request {
            query,
            operation_name,
            variables,
            data,
        } = request;

        let document = parse_query(&query).map_err(|error| {
            tracing::debug!(%error, "rejected a document that does not parse");
            vec![ServerError::from(error)]
        })?;

        check_rules(&self.registry, &document, self.depth).map_err(|errors| {
            tracing::debug!(errors = errors.len(), "rejected a document that does not validate");
            errors.into_iter().map(ServerError::from).collect::<Vec<_>>()
        })?;

        let ExecutableDocument {
            operations,
            mut fragments,
        } = document;

        let rejected = |error: ServerError| {
            tracing::debug!(error = %error.message, code = %error.code, "rejected the operation");
            vec![error]
        };

        let (operation_name, mut operation) =
            select_operation(operations, operation_name.as_deref()).map_err(rejected)?;
        tracing::Span::current().record("operation_type", tracing::field::display(operation.node.ty));

        let root = self.root_type(operation.node.ty).map_err(rejected)?;
        let variables = coerce_variables(&self.registry, &operation.node, &variables).map_err(rejected)?;

        for fragment in fragments.values_mut() {
            remove_skipped_selection(&mut fragment.node.selection_set.node, &variables).map_err(rejected)?;
        }
        remove_skipped_selection(&mut operation.node.selection_set.node, &variables).map_err(rejected)?;

        let arguments =
            coerce_arguments(&self.registry, root, &operation.node, &fragments, &variables).map_err(rejected)?;

        Ok(QueryEnv {
            operation_name,
            operation,
            fragments,
            arguments,
            ctx_data: Arc::new(data),
            errors: Default::default(),
        })
    }

    async fn execute_once(&self, env: QueryEnv) -> Response {
        let ty = match self.root_type(env.operation.node.ty) {
            Ok(ty) => ty,
            Err(error) => return Response::from_errors(vec![error]),
        };

        let ctx = ContextSelectionSet {
            path: QueryPath::empty(),
            ty,
            item: &env.operation.node.selection_set,
            registry: &self.registry,
            query_env: &env,
        };

        let result = match env.operation.node.ty {
            OperationType::Mutation => resolve_root_container_serial(&ctx).await,
            _ => resolve_root_container(&ctx).await,
        };

        match result {
            Ok(data) => Response::new(data).with_errors(env.take_errors()),
            // Nothing nullable above the failed field, the whole data is null.
            Err(ErrorPropagation) => Response {
                data: Some(ConstValue::Null),
                errors: env.take_errors(),
            },
        }
    }

    /// Execute a GraphQL query.
    ///
    /// Never fails: every problem, a panic or the configured timeout included, ends up in the
    /// errors of the response.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let request = request.into();
        let span = tracing::info_span!(
            "execute",
            operation_name = request.operation_name.as_deref().unwrap_or_default(),
            operation_type = tracing::field::Empty,
        );

        let request_fut = async move {
            let response = AssertUnwindSafe(async {
                match self.prepare_request(request) {
                    Ok(env) => self.execute_once(env).await,
                    Err(errors) => Response::from_errors(errors),
                }
            })
            .catch_unwind()
            .await;

            response.unwrap_or_else(|_| {
                tracing::error!("execution panicked");
                Response::from_errors(vec![
                    ServerError::new("Internal server error", None).with_code(ErrorCode::InternalServerError)
                ])
            })
        };

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, request_fut)
                .instrument(span)
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!(?timeout, "request timed out");
                    Response::from_errors(vec![
                        ServerError::new("Request timed out", None).with_code(ErrorCode::GatewayTimeout)
                    ])
                }),
            None => request_fut.instrument(span).await,
        }
    }
}

fn select_operation(
    operations: DocumentOperations,
    operation_name: Option<&str>,
) -> ServerResult<(Option<String>, Positioned<OperationDefinition>)> {
    let operation_error = |message: String| ServerError::new(message, None).with_code(ErrorCode::OperationError);

    match (operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Ok((None, operation)),
        (DocumentOperations::Multiple(mut operations), Some(name)) => operations
            .remove(name)
            .map(|operation| (Some(name.to_string()), operation))
            .ok_or_else(|| operation_error(format!(r#"Unknown operation named "{name}""#))),
        (DocumentOperations::Single(_), Some(name)) => {
            Err(operation_error(format!(r#"Unknown operation named "{name}""#)))
        }
        (DocumentOperations::Multiple(operations), None) => {
            let mut operations = operations.into_iter();
            match (operations.next(), operations.next()) {
                (Some((name, operation)), None) => Ok((Some(name.to_string()), operation)),
                _ => Err(operation_error("Operation name required in request.".to_string())),
            }
        }
    }
}

fn remove_skipped_selection(selection_set: &mut SelectionSet, variables: &VariableValues) -> ServerResult<()> {
    fn is_skipped(directives: &[Positioned<Directive>], variables: &VariableValues) -> ServerResult<bool> {
        for directive in directives {
            let include = match directive.node.name.node.as_str() {
                SKIP => false,
                INCLUDE => true,
                _ => continue,
            };

            if let Some(condition_input) = directive.node.get_argument(CONDITION_ARGUMENT) {
                let value = condition_input
                    .node
                    .clone()
                    .into_const_with(|name| Ok::<_, Infallible>(variables.get(&name).cloned().unwrap_or(ConstValue::Null)))
                    .unwrap_or(ConstValue::Null);

                let ConstValue::Boolean(value) = value else {
                    let error = InputValueError::expected_type("Boolean!", &value);
                    return Err(ServerError::new(
                        format!(r#"Invalid value for argument "{CONDITION_ARGUMENT}", {error}"#),
                        Some(condition_input.pos),
                    )
                    .with_code(ErrorCode::ArgumentCoercionError));
                };

                if include != value {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    let mut skipped = Vec::with_capacity(selection_set.items.len());
    for selection in &selection_set.items {
        skipped.push(is_skipped(selection.node.directives(), variables)?);
    }
    let mut skipped = skipped.into_iter();
    selection_set.items.retain(|_| !skipped.next().unwrap_or(false));

    for selection in &mut selection_set.items {
        selection.node.directives_mut().retain(|directive| {
            let name = directive.node.name.node.as_str();
            name != SKIP && name != INCLUDE
        });
    }

    for selection in &mut selection_set.items {
        match &mut selection.node {
            Selection::Field(field) => {
                remove_skipped_selection(&mut field.node.selection_set.node, variables)?;
            }
            Selection::FragmentSpread(_) => {}
            Selection::InlineFragment(inline_fragment) => {
                remove_skipped_selection(&mut inline_fragment.node.selection_set.node, variables)?;
            }
        }
    }

    Ok(())
}
