use std::{future::Future, pin::Pin};

use async_graphql_parser::types::{Selection, SelectionSet};
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use super::{field::resolve_field, ErrorPropagation, ResolveResult};
use crate::{registry::resolvers::ResolvedValue, ContextSelectionSet};

/// Resolve a container by executing each of the fields concurrently.
pub async fn resolve_root_container(ctx: &ContextSelectionSet<'_>) -> ResolveResult<ConstValue> {
    resolve_container_inner(ctx, true, ResolvedValue::null()).await
}

/// Resolve a container by executing each of the fields serially, in document order.
pub async fn resolve_root_container_serial(ctx: &ContextSelectionSet<'_>) -> ResolveResult<ConstValue> {
    resolve_container_inner(ctx, false, ResolvedValue::null()).await
}

pub(super) async fn resolve_container(
    ctx: &ContextSelectionSet<'_>,
    parent_resolver_value: ResolvedValue,
) -> ResolveResult<ConstValue> {
    resolve_container_inner(ctx, true, parent_resolver_value).await
}

async fn resolve_container_inner(
    ctx: &ContextSelectionSet<'_>,
    parallel: bool,
    parent_resolver_value: ResolvedValue,
) -> ResolveResult<ConstValue> {
    tracing::trace!("Where: {}", ctx.ty.name);

    let mut fields = FieldExecutionSet(Vec::new());
    fields.add_selection_set(ctx, &ctx.item.node, &parent_resolver_value);

    // Siblings keep running after one of them failed.
    let results = if parallel {
        futures_util::future::join_all(fields.0).await
    } else {
        let mut results = Vec::with_capacity(fields.0.len());
        for field in fields.0 {
            let output = field.await;
            let failed = output.1.is_err();
            results.push(output);
            if failed {
                break;
            }
        }
        results
    };

    let mut container = IndexMap::with_capacity(results.len());
    for (response_key, result) in results {
        match result {
            Ok(value) => merge_field(&mut container, response_key, value),
            // Parents null things out, the error is already in the response.
            Err(ErrorPropagation) => return Err(ErrorPropagation),
        }
    }

    Ok(ConstValue::Object(container))
}

/// Fields selected several times under the same response key are merged into a single entry.
fn merge_field(container: &mut IndexMap<Name, ConstValue>, response_key: Name, value: ConstValue) {
    match container.get_mut(&response_key) {
        Some(existing) => merge_value(existing, value),
        None => {
            container.insert(response_key, value);
        }
    }
}

fn merge_value(existing: &mut ConstValue, incoming: ConstValue) {
    match (existing, incoming) {
        (ConstValue::Object(existing), ConstValue::Object(incoming)) => {
            for (key, value) in incoming {
                merge_field(existing, key, value);
            }
        }
        // Both lists come from the same resolver, items line up.
        (ConstValue::List(existing), ConstValue::List(incoming)) => {
            for (existing, incoming) in existing.iter_mut().zip(incoming) {
                merge_value(existing, incoming);
            }
        }
        _ => {}
    }
}

type FieldExecutionFuture<'a> = Pin<Box<dyn Future<Output = (Name, ResolveResult<ConstValue>)> + Send + 'a>>;

/// A set of futures associated with the fields of a selection set, in document order.
struct FieldExecutionSet<'a>(Vec<FieldExecutionFuture<'a>>);

impl<'a> FieldExecutionSet<'a> {
    /// Creates futures for all the fields in the given selection set, flattening fragments.
    fn add_selection_set(
        &mut self,
        ctx: &ContextSelectionSet<'a>,
        selection_set: &'a SelectionSet,
        parent_resolver_value: &ResolvedValue,
    ) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let ctx_field = ctx.with_field(field);
                    let parent_resolver_value = parent_resolver_value.clone();
                    self.0.push(Box::pin(async move {
                        let response_key = ctx_field.item.node.response_key().node.clone();
                        let result = resolve_field(&ctx_field, parent_resolver_value).await;
                        (response_key, result)
                    }));
                }
                Selection::FragmentSpread(spread) => {
                    let Some(fragment) = ctx.query_env.fragments.get(&spread.node.fragment_name.node) else {
                        continue;
                    };
                    if fragment.node.type_condition.node.on.node.as_str() == ctx.ty.name {
                        self.add_selection_set(ctx, &fragment.node.selection_set.node, parent_resolver_value);
                    }
                }
                Selection::InlineFragment(inline_fragment) => {
                    let applies = match &inline_fragment.node.type_condition {
                        Some(condition) => condition.node.on.node.as_str() == ctx.ty.name,
                        None => true,
                    };
                    if applies {
                        self.add_selection_set(ctx, &inline_fragment.node.selection_set.node, parent_resolver_value);
                    }
                }
            }
        }
    }
}
