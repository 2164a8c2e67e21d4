//! The member, post, profile and user schema.
//!
//! Every relation field is resolved on its own through the [`runtime::DataAccess`] found in the
//! request data, so a request has to carry a [`runtime::Context`]:
//!
//! ```ignore
//! let schema = member_schema::build_schema(&EngineConfig::default())?;
//! let context = runtime::Context::new(InMemoryDataAccess::new());
//! let response = schema.execute(Request::new("{ users { id } }").data(context)).await;
//! ```

mod mutation;
mod objects;
mod query;
mod resolvers;

use engine::{config::EngineConfig, registry::Registry, Schema};
pub use engine::registry::RegistryError;

/// Identifier of a member tier, stored lowercase and exposed as `BASIC` / `BUSINESS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberTypeId {
    Basic,
    Business,
}

impl MemberTypeId {
    /// The stored identifier.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Name of the enum value in documents and responses.
    pub fn graphql_name(self) -> &'static str {
        match self {
            MemberTypeId::Basic => "BASIC",
            MemberTypeId::Business => "BUSINESS",
        }
    }
}

/// Builds the schema served for the whole process lifetime.
pub fn build_schema(config: &EngineConfig) -> Result<Schema, RegistryError> {
    let registry = build_registry(config)?;
    tracing::debug!(
        mutations = registry.mutation_type().is_some(),
        depth = ?config.operation_limits.depth,
        "built member schema"
    );
    Ok(Schema::build(registry).config(config).finish())
}

/// The type graph alone, the mutation root only exists when `config` enables mutations.
pub fn build_registry(config: &EngineConfig) -> Result<Registry, RegistryError> {
    let mut builder = Registry::builder();
    let types = objects::declare(&mut builder)?;
    objects::define(&mut builder, &types)?;

    let query = query::define(&mut builder, &types)?;
    builder.set_query_type(query);

    if config.execution.mutations {
        let inputs = objects::define_inputs(&mut builder, &types)?;
        let mutation = mutation::define(&mut builder, &types, &inputs)?;
        builder.set_mutation_type(mutation);
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use engine::registry::MetaType;

    use super::*;

    fn field_names(registry: &Registry, name: &str) -> Vec<String> {
        match registry.lookup_type(name) {
            Some(MetaType::Object(object)) => object.fields.keys().cloned().collect(),
            Some(MetaType::InputObject(input)) => input.fields.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn object_fields_keep_their_order() {
        let registry = build_registry(&EngineConfig::default()).unwrap();

        assert_eq!(
            field_names(&registry, "User"),
            ["id", "name", "balance", "profile", "posts", "userSubscribedTo", "subscribedToUser"]
        );
        assert_eq!(
            field_names(&registry, "Profile"),
            ["id", "isMale", "yearOfBirth", "userId", "memberTypeId", "memberType", "user"]
        );
        assert_eq!(field_names(&registry, "Post"), ["id", "title", "content", "authorId", "author"]);
        assert_eq!(
            field_names(&registry, "MemberType"),
            ["id", "discount", "postsLimitPerMonth", "profiles"]
        );
        assert_eq!(
            field_names(&registry, "RootQueryType"),
            ["memberTypes", "posts", "users", "profiles", "memberType", "post", "user", "profile"]
        );
        assert_eq!(field_names(&registry, "ChangeProfileInput"), ["isMale", "yearOfBirth", "memberTypeId"]);
    }

    #[test]
    fn mutations_can_be_disabled() {
        let mut config = EngineConfig::default();
        assert!(build_registry(&config).unwrap().mutation_type().is_some());

        config.execution.mutations = false;
        let registry = build_registry(&config).unwrap();
        assert!(registry.mutation_type().is_none());
        assert!(registry.lookup_type("CreateUserInput").is_none());
    }

    #[test]
    fn member_type_ids() {
        assert_eq!(MemberTypeId::Business.as_str(), "business");
        assert_eq!(MemberTypeId::Basic.graphql_name(), "BASIC");
        assert_eq!(
            serde_json::from_value::<MemberTypeId>(serde_json::json!("basic")).unwrap(),
            MemberTypeId::Basic
        );
    }
}
