//! Resolver builders shared by the object and root types.
//!
//! Each builder captures what it needs by value, the returned [`Resolver`] is called once per
//! resolved field and performs exactly one data-access call.

use engine::{
    registry::resolvers::{Resolver, ResolverContext},
    Error,
};
use runtime::{Context, DataAccess, EntityKind, Filter, Record, RecordKey};
use serde_json::Value;

pub(crate) fn data_access(ctx: &ResolverContext) -> Result<&dyn DataAccess, Error> {
    Ok(ctx.data::<Context>()?.data_access())
}

pub(crate) fn record(record: Record) -> Value {
    Value::Object(record)
}

fn records(records: Vec<Record>) -> Value {
    Value::Array(records.into_iter().map(Value::Object).collect())
}

/// Every record of `kind`.
pub(crate) fn find_all(kind: EntityKind) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let found = data_access(&ctx)?.find_many(kind, None).await?;
        Ok::<_, Error>(records(found))
    })
}

/// The record of `kind` whose id is the `id` argument, null when there is none.
pub(crate) fn find_by_id_argument(kind: EntityKind) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: String = ctx.arg("id")?;
        let found = data_access(&ctx)?.find_unique(kind, RecordKey::id(id)).await?;
        Ok::<_, Error>(found.map(record).unwrap_or(Value::Null))
    })
}

/// The record of `kind` the parent points to through its `foreign_key` property.
pub(crate) fn find_referenced(kind: EntityKind, foreign_key: &'static str) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: String = ctx.parent_field(foreign_key)?;
        let found = data_access(&ctx)?.find_unique(kind, RecordKey::id(id)).await?;
        Ok::<_, Error>(found.map(record).unwrap_or(Value::Null))
    })
}

/// Records of `kind` whose `field` holds the parent id.
pub(crate) fn find_referencing(kind: EntityKind, field: &'static str) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: Value = ctx.parent_field("id")?;
        let found = data_access(&ctx)?
            .find_many(kind, Some(Filter::equals(field, id)))
            .await?;
        Ok::<_, Error>(records(found))
    })
}

/// Like [`find_referencing`], for a one-to-one relation: the first match or null.
pub(crate) fn find_first_referencing(kind: EntityKind, field: &'static str) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: Value = ctx.parent_field("id")?;
        let found = data_access(&ctx)?
            .find_many(kind, Some(Filter::equals(field, id)))
            .await?;
        Ok::<_, Error>(found.into_iter().next().map(record).unwrap_or(Value::Null))
    })
}

/// Users linked to the parent user through subscription rows, from the `via` side to the
/// `target` side.
pub(crate) fn find_subscription_peers(via: &'static str, target: &'static str) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: String = ctx.parent_field("id")?;
        let filter = Filter::related(EntityKind::Subscription, via, target, id);
        let found = data_access(&ctx)?.find_many(EntityKind::User, Some(filter)).await?;
        Ok::<_, Error>(records(found))
    })
}
