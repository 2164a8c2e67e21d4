use async_graphql_value::ConstValue;

use super::{complete_value, ErrorPropagation, ResolveResult};
use crate::{
    registry::{resolvers::ResolvedValue, TypeRef},
    ContextField, QueryPath, ServerError,
};

/// Resolve a list by completing each of the items concurrently.
///
/// Item slots keep the order of the resolved value whatever order they complete in. A failed
/// item becomes null when the item type is nullable, otherwise the whole list fails.
pub(super) async fn resolve_list<'a>(
    ctx: &'a ContextField<'a>,
    item_ty: &'a TypeRef,
    path: QueryPath,
    value: ResolvedValue,
) -> ResolveResult<ConstValue> {
    let Some(items) = value.item_iter() else {
        ctx.add_error(
            ServerError::new(
                format!(
                    "Encountered a {} where we expected a list",
                    json_kind_str(value.data_resolved())
                ),
                Some(ctx.item.pos),
            )
            .with_path(&path),
        );
        return Err(ErrorPropagation);
    };

    let futures = items
        .enumerate()
        .map(|(index, item)| complete_value(ctx, item_ty, path.child(index), item))
        .collect::<Vec<_>>();

    let mut children = Vec::with_capacity(futures.len());
    for result in futures_util::future::join_all(futures).await {
        match result {
            Ok(value) => children.push(value),
            Err(ErrorPropagation) if item_ty.is_nullable() => children.push(ConstValue::Null),
            Err(ErrorPropagation) => return Err(ErrorPropagation),
        }
    }

    Ok(ConstValue::List(children))
}

fn json_kind_str(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
