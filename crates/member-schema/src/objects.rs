use engine::registry::{
    EnumType, InputObjectType, MetaField, MetaInputValue, MetaTypeId, ObjectType, RegistryBuilder, RegistryError,
    TypeRef,
};
use runtime::EntityKind;
use strum::IntoEnumIterator;

use crate::{resolvers, MemberTypeId};

/// Handles of the types shared by the root types.
pub(crate) struct Types {
    pub(crate) member_type_id: MetaTypeId,
    pub(crate) member_type: MetaTypeId,
    pub(crate) post: MetaTypeId,
    pub(crate) profile: MetaTypeId,
    pub(crate) user: MetaTypeId,
}

impl Types {
    /// `[T!]`, the shape of every list field of the schema.
    pub(crate) fn list_of(id: MetaTypeId) -> TypeRef {
        TypeRef::named(id).non_null().list()
    }
}

pub(crate) struct Inputs {
    pub(crate) create_user: MetaTypeId,
    pub(crate) change_user: MetaTypeId,
    pub(crate) create_post: MetaTypeId,
    pub(crate) change_post: MetaTypeId,
    pub(crate) create_profile: MetaTypeId,
    pub(crate) change_profile: MetaTypeId,
}

pub(crate) fn declare(builder: &mut RegistryBuilder) -> Result<Types, RegistryError> {
    let member_type_id = MemberTypeId::iter().fold(EnumType::new("MemberTypeId"), |ty, id| {
        ty.value(id.graphql_name(), id.as_str())
    });

    Ok(Types {
        member_type_id: builder.register(member_type_id)?,
        member_type: builder.declare("MemberType")?,
        post: builder.declare("Post")?,
        profile: builder.declare("Profile")?,
        user: builder.declare("User")?,
    })
}

pub(crate) fn define(builder: &mut RegistryBuilder, types: &Types) -> Result<(), RegistryError> {
    let uuid = builder.named("UUID")?.non_null();
    let string = builder.named("String")?.non_null();
    let int = builder.named("Int")?.non_null();
    let float = builder.named("Float")?.non_null();
    let boolean = builder.named("Boolean")?.non_null();
    let member_type_id = TypeRef::named(types.member_type_id).non_null();

    builder.define(
        types.member_type,
        ObjectType::new("MemberType")
            .with_field(MetaField::new("id", member_type_id.clone()))
            .with_field(MetaField::new("discount", float.clone()))
            .with_field(MetaField::new("postsLimitPerMonth", int.clone()))
            .with_field(
                MetaField::new("profiles", Types::list_of(types.profile))
                    .with_resolver(resolvers::find_referencing(EntityKind::Profile, "memberTypeId")),
            ),
    )?;

    builder.define(
        types.post,
        ObjectType::new("Post")
            .with_field(MetaField::new("id", uuid.clone()))
            .with_field(MetaField::new("title", string.clone()))
            .with_field(MetaField::new("content", string.clone()))
            .with_field(MetaField::new("authorId", uuid.clone()))
            .with_field(
                MetaField::new("author", TypeRef::named(types.user).non_null())
                    .with_resolver(resolvers::find_referenced(EntityKind::User, "authorId")),
            ),
    )?;

    builder.define(
        types.profile,
        ObjectType::new("Profile")
            .with_field(MetaField::new("id", uuid.clone()))
            .with_field(MetaField::new("isMale", boolean))
            .with_field(MetaField::new("yearOfBirth", int))
            .with_field(MetaField::new("userId", uuid.clone()))
            .with_field(MetaField::new("memberTypeId", member_type_id))
            .with_field(
                MetaField::new("memberType", TypeRef::named(types.member_type).non_null())
                    .with_resolver(resolvers::find_referenced(EntityKind::MemberType, "memberTypeId")),
            )
            .with_field(
                MetaField::new("user", TypeRef::named(types.user).non_null())
                    .with_resolver(resolvers::find_referenced(EntityKind::User, "userId")),
            ),
    )?;

    builder.define(
        types.user,
        ObjectType::new("User")
            .with_field(MetaField::new("id", uuid))
            .with_field(MetaField::new("name", string))
            .with_field(MetaField::new("balance", float))
            .with_field(
                MetaField::new("profile", TypeRef::named(types.profile))
                    .with_resolver(resolvers::find_first_referencing(EntityKind::Profile, "userId")),
            )
            .with_field(
                MetaField::new("posts", Types::list_of(types.post))
                    .with_resolver(resolvers::find_referencing(EntityKind::Post, "authorId")),
            )
            .with_field(
                MetaField::new("userSubscribedTo", Types::list_of(types.user))
                    .with_resolver(resolvers::find_subscription_peers("subscriberId", "authorId")),
            )
            .with_field(
                MetaField::new("subscribedToUser", Types::list_of(types.user))
                    .with_resolver(resolvers::find_subscription_peers("authorId", "subscriberId")),
            ),
    )?;

    Ok(())
}

/// Payloads of the mutations. `Create*` inputs require every field, `Change*` inputs are partial.
pub(crate) fn define_inputs(builder: &mut RegistryBuilder, types: &Types) -> Result<Inputs, RegistryError> {
    let uuid = builder.named("UUID")?;
    let string = builder.named("String")?;
    let int = builder.named("Int")?;
    let float = builder.named("Float")?;
    let boolean = builder.named("Boolean")?;
    let member_type_id = TypeRef::named(types.member_type_id);

    let create_user = builder.register(
        InputObjectType::new("CreateUserInput")
            .with_field(MetaInputValue::new("name", string.clone().non_null()))
            .with_field(MetaInputValue::new("balance", float.clone().non_null())),
    )?;
    let change_user = builder.register(
        InputObjectType::new("ChangeUserInput")
            .with_field(MetaInputValue::new("name", string.clone()))
            .with_field(MetaInputValue::new("balance", float)),
    )?;

    let create_post = builder.register(
        InputObjectType::new("CreatePostInput")
            .with_field(MetaInputValue::new("title", string.clone().non_null()))
            .with_field(MetaInputValue::new("content", string.clone().non_null()))
            .with_field(MetaInputValue::new("authorId", uuid.clone().non_null())),
    )?;
    let change_post = builder.register(
        InputObjectType::new("ChangePostInput")
            .with_field(MetaInputValue::new("title", string.clone()))
            .with_field(MetaInputValue::new("content", string)),
    )?;

    let create_profile = builder.register(
        InputObjectType::new("CreateProfileInput")
            .with_field(MetaInputValue::new("isMale", boolean.clone().non_null()))
            .with_field(MetaInputValue::new("yearOfBirth", int.clone().non_null()))
            .with_field(MetaInputValue::new("userId", uuid.non_null()))
            .with_field(MetaInputValue::new("memberTypeId", member_type_id.clone().non_null())),
    )?;
    let change_profile = builder.register(
        InputObjectType::new("ChangeProfileInput")
            .with_field(MetaInputValue::new("isMale", boolean))
            .with_field(MetaInputValue::new("yearOfBirth", int))
            .with_field(MetaInputValue::new("memberTypeId", member_type_id)),
    )?;

    Ok(Inputs {
        create_user,
        change_user,
        create_post,
        change_post,
        create_profile,
        change_profile,
    })
}
