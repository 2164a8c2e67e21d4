use async_graphql_value::{ConstValue, Name};
use futures_util::{future::BoxFuture, FutureExt};
use tracing::Instrument;

use super::{resolve_container, resolve_list, ErrorPropagation, ResolveResult};
use crate::{
    registry::{
        resolvers::{ResolvedValue, Resolver, ResolverContext},
        MetaField, MetaType, TypeRef,
    },
    ContextField, Error, ErrorCode, QueryPath, ServerError,
};

/// Resolves the field inside `ctx` within its parent type.
///
/// Errors are recorded as soon as they happen. A failed nullable field becomes null, a failed
/// non-null field returns [`ErrorPropagation`] so the closest nullable ancestor becomes null.
pub async fn resolve_field(ctx: &ContextField<'_>, parent_resolver_value: ResolvedValue) -> ResolveResult<ConstValue> {
    let name = ctx.field_name();
    if name == "__typename" {
        return Ok(ConstValue::String(ctx.parent_type.name.clone()));
    }

    let Some(field) = ctx.parent_type.field(name) else {
        ctx.add_error(
            ServerError::new(
                format!("Could not find a field named {name} on {}", ctx.parent_type.name),
                Some(ctx.item.node.name.pos),
            )
            .with_path(&ctx.path),
        );
        return Err(ErrorPropagation);
    };

    let result = match run_field_resolver(ctx, field, parent_resolver_value).await {
        Ok(value) => complete_value(ctx, &field.ty, ctx.path.clone(), value).await,
        Err(error) => {
            ctx.add_error(error.into_server_error(ctx.item.pos).with_path(&ctx.path));
            Err(ErrorPropagation)
        }
    };

    match result {
        Err(ErrorPropagation) if field.ty.is_nullable() => Ok(ConstValue::Null),
        result => result,
    }
}

async fn run_field_resolver(
    ctx: &ContextField<'_>,
    field: &MetaField,
    parent_resolver_value: ResolvedValue,
) -> Result<ResolvedValue, Error> {
    if let Resolver::Parent = field.resolver {
        return Ok(parent_resolver_value.get_field(&field.name));
    }

    let resolver_ctx = ResolverContext::new(
        parent_resolver_value,
        ctx.arguments(),
        ctx.query_env.ctx_data.clone(),
    );
    let span = tracing::info_span!(
        "resolver",
        field = %format_args!("{}.{}", ctx.parent_type.name, field.name),
        path = %ctx.path,
    );

    field.resolver.resolve(&field.name, resolver_ctx).instrument(span).await
}

/// Checks `value` against `ty` and turns it into its response representation.
///
/// Objects recurse into the field's selection set and lists into their items, so this returns a
/// boxed future.
pub(super) fn complete_value<'a>(
    ctx: &'a ContextField<'a>,
    ty: &'a TypeRef,
    path: QueryPath,
    value: ResolvedValue,
) -> BoxFuture<'a, ResolveResult<ConstValue>> {
    async move {
        let field_error = |message: String| {
            ctx.add_error(
                ServerError::new(message, Some(ctx.item.pos))
                    .with_code(ErrorCode::FieldResolutionError)
                    .with_path(&path),
            );
            ErrorPropagation
        };

        match ty {
            TypeRef::NonNull(inner) => {
                let value = complete_value(ctx, inner, path.clone(), value).await?;
                if value != ConstValue::Null {
                    return Ok(value);
                }

                tracing::warn!(
                    expected = %ty.display(ctx.registry),
                    path = %path,
                    "non-null field resolved to null"
                );
                Err(field_error(format!(
                    "An error happened while fetching `{}`, expected a non null value but found a null",
                    ctx.field_name()
                )))
            }
            _ if value.is_null() => Ok(ConstValue::Null),
            TypeRef::List(inner) => resolve_list(ctx, inner, path, value).await,
            TypeRef::Named(id) => match ctx.registry.get(*id) {
                MetaType::Scalar(scalar) => scalar
                    .kind
                    .to_value(value.take())
                    .map_err(|error| field_error(error.message)),
                MetaType::Enum(enum_type) => enum_type
                    .name_of(value.data_resolved())
                    .map(|name| ConstValue::Enum(Name::new(name)))
                    .ok_or_else(|| {
                        field_error(format!(
                            "Enum {} cannot represent value: {}",
                            enum_type.name,
                            value.data_resolved()
                        ))
                    }),
                MetaType::Object(object) => {
                    let ctx_selection_set = ctx.with_selection_set(object, path);
                    resolve_container(&ctx_selection_set, value).await
                }
                MetaType::InputObject(input_object) => Err(field_error(format!(
                    "Input object {} cannot be used as an output type",
                    input_object.name
                ))),
            },
        }
    }
    .boxed()
}
