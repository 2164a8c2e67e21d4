//! The `Mutations` root. Its fields run one after the other, in document order.

use engine::{
    registry::{
        resolvers::{Resolver, ResolverContext},
        MetaField, MetaInputValue, MetaTypeId, ObjectType, RegistryBuilder, RegistryError, TypeRef,
    },
    Error,
};
use runtime::{EntityKind, Record, RecordKey};
use serde_json::Value;

use crate::{
    objects::{Inputs, Types},
    resolvers::{data_access, record},
};

pub(crate) fn define(builder: &mut RegistryBuilder, types: &Types, inputs: &Inputs) -> Result<MetaTypeId, RegistryError> {
    let uuid = builder.named("UUID")?.non_null();
    let ack = builder.named("String")?.non_null();
    let dto = |input: MetaTypeId| MetaInputValue::new("dto", TypeRef::named(input).non_null());
    let id = || MetaInputValue::new("id", uuid.clone());

    let creates = [
        ("createUser", types.user, inputs.create_user, EntityKind::User),
        ("createPost", types.post, inputs.create_post, EntityKind::Post),
        ("createProfile", types.profile, inputs.create_profile, EntityKind::Profile),
    ];
    let changes = [
        ("changeUser", types.user, inputs.change_user, EntityKind::User),
        ("changePost", types.post, inputs.change_post, EntityKind::Post),
        ("changeProfile", types.profile, inputs.change_profile, EntityKind::Profile),
    ];
    let deletes = [
        ("deleteUser", EntityKind::User, "User deleted successfully"),
        ("deletePost", EntityKind::Post, "Post deleted successfully"),
        ("deleteProfile", EntityKind::Profile, "Profile deleted successfully"),
    ];

    let mut mutation = ObjectType::new("Mutations");
    for (name, ty, input, kind) in creates {
        mutation = mutation.with_field(
            MetaField::new(name, TypeRef::named(ty).non_null())
                .with_arg(dto(input))
                .with_resolver(create(kind)),
        );
    }
    for (name, ty, input, kind) in changes {
        mutation = mutation.with_field(
            MetaField::new(name, TypeRef::named(ty).non_null())
                .with_arg(id())
                .with_arg(dto(input))
                .with_resolver(change(kind)),
        );
    }
    for (name, kind, message) in deletes {
        mutation = mutation.with_field(
            MetaField::new(name, ack.clone())
                .with_arg(id())
                .with_resolver(delete(kind, message)),
        );
    }

    mutation = mutation
        .with_field(
            MetaField::new("subscribeTo", ack.clone())
                .with_arg(MetaInputValue::new("userId", uuid.clone()))
                .with_arg(MetaInputValue::new("authorId", uuid.clone()))
                .with_resolver(Resolver::custom(subscribe_to)),
        )
        .with_field(
            MetaField::new("unsubscribeFrom", ack)
                .with_arg(MetaInputValue::new("userId", uuid.clone()))
                .with_arg(MetaInputValue::new("authorId", uuid))
                .with_resolver(Resolver::custom(unsubscribe_from)),
        );

    builder.register(mutation)
}

fn create(kind: EntityKind) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let dto: Record = ctx.arg("dto")?;
        let created = data_access(&ctx)?.create(kind, dto).await?;
        Ok::<_, Error>(record(created))
    })
}

/// Only the fields present in `dto` are changed.
fn change(kind: EntityKind) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: String = ctx.arg("id")?;
        let dto: Record = ctx.arg("dto")?;
        let updated = data_access(&ctx)?.update(kind, RecordKey::id(id), dto).await?;
        Ok::<_, Error>(record(updated))
    })
}

fn delete(kind: EntityKind, message: &'static str) -> Resolver {
    Resolver::custom(move |ctx: ResolverContext| async move {
        let id: String = ctx.arg("id")?;
        data_access(&ctx)?.delete(kind, RecordKey::id(id)).await?;
        Ok::<_, Error>(Value::from(message))
    })
}

async fn subscribe_to(ctx: ResolverContext) -> Result<Value, Error> {
    let subscriber_id: String = ctx.arg("userId")?;
    let author_id: String = ctx.arg("authorId")?;

    let mut row = Record::new();
    row.insert("subscriberId".into(), subscriber_id.into());
    row.insert("authorId".into(), author_id.into());
    data_access(&ctx)?.create(EntityKind::Subscription, row).await?;

    Ok(Value::from("Subscribed successfully"))
}

async fn unsubscribe_from(ctx: ResolverContext) -> Result<Value, Error> {
    let subscriber_id: String = ctx.arg("userId")?;
    let author_id: String = ctx.arg("authorId")?;

    data_access(&ctx)?
        .delete(EntityKind::Subscription, RecordKey::subscription(subscriber_id, author_id))
        .await?;

    Ok(Value::from("Unsubscribed successfully"))
}
