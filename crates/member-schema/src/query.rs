use engine::registry::{MetaField, MetaInputValue, MetaTypeId, ObjectType, RegistryBuilder, RegistryError, TypeRef};
use runtime::EntityKind;

use crate::{objects::Types, resolvers};

pub(crate) fn define(builder: &mut RegistryBuilder, types: &Types) -> Result<MetaTypeId, RegistryError> {
    let uuid = builder.named("UUID")?.non_null();

    let lists = [
        ("memberTypes", types.member_type, EntityKind::MemberType),
        ("posts", types.post, EntityKind::Post),
        ("users", types.user, EntityKind::User),
        ("profiles", types.profile, EntityKind::Profile),
    ];
    let lookups = [
        ("memberType", types.member_type, EntityKind::MemberType, TypeRef::named(types.member_type_id).non_null()),
        ("post", types.post, EntityKind::Post, uuid.clone()),
        ("user", types.user, EntityKind::User, uuid.clone()),
        ("profile", types.profile, EntityKind::Profile, uuid),
    ];

    let mut query = ObjectType::new("RootQueryType");
    for (name, ty, kind) in lists {
        query = query.with_field(MetaField::new(name, Types::list_of(ty)).with_resolver(resolvers::find_all(kind)));
    }
    // A missing record is null, not an error.
    for (name, ty, kind, id) in lookups {
        query = query.with_field(
            MetaField::new(name, TypeRef::named(ty))
                .with_arg(MetaInputValue::new("id", id))
                .with_resolver(resolvers::find_by_id_argument(kind)),
        );
    }

    builder.register(query)
}
