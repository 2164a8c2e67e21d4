//! Resolvers dynamic strategy explained here.
//!
//! Every field of an object type carries a [`Resolver`]. Most fields are plain data and read the
//! same-named property off their parent value. Relation and root fields run a custom async
//! function instead, which receives the parent value, the coerced arguments and the request data
//! through a [`ResolverContext`].

use std::{any::type_name, fmt, future::Future, sync::Arc};

use futures_util::{future::BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use self::resolved_value::ResolvedValue;
use crate::{context::Data, Error};

mod resolved_value;

type ResolverFn = dyn Fn(ResolverContext) -> BoxFuture<'static, Result<ResolvedValue, Error>> + Send + Sync;

#[derive(Clone, Default)]
pub enum Resolver {
    /// Reads the same-named property off the parent value.
    #[default]
    Parent,
    Custom(Arc<ResolverFn>),
}

impl Resolver {
    pub fn custom<F, Fut, T>(resolver: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
        T: Into<ResolvedValue> + 'static,
    {
        Resolver::Custom(Arc::new(move |ctx| resolver(ctx).map(|result| result.map(Into::into)).boxed()))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Resolver::Custom(_))
    }

    pub(crate) async fn resolve(&self, field_name: &str, ctx: ResolverContext) -> Result<ResolvedValue, Error> {
        match self {
            Resolver::Parent => Ok(ctx.parent.get_field(field_name)),
            Resolver::Custom(resolver) => resolver(ctx).await,
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Parent => f.write_str("Parent"),
            Resolver::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Resolver Context
///
/// Built for every invocation of a custom resolver. It owns everything it hands out so the
/// resolver future doesn't borrow from the engine.
#[derive(Clone)]
pub struct ResolverContext {
    /// The value the parent field resolved to. Null for root fields.
    pub parent: ResolvedValue,
    /// Arguments after coercion, absent optional arguments are omitted.
    pub args: serde_json::Map<String, Value>,
    data: Arc<Data>,
}

impl ResolverContext {
    pub(crate) fn new(parent: ResolvedValue, args: serde_json::Map<String, Value>, data: Arc<Data>) -> Self {
        Self { parent, args, data }
    }

    /// Gets the request data of type `D`.
    pub fn data<D: std::any::Any + Send + Sync>(&self) -> Result<&D, Error> {
        self.data
            .get::<D>()
            .ok_or_else(|| Error::new(format!("Data `{}` does not exist.", type_name::<D>())))
    }

    /// Deserializes the argument `name`.
    pub fn arg<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        let value = self.args.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| Error::new(format!("Invalid argument \"{name}\": {err}")))
    }

    /// Deserializes the property `name` of the parent value.
    pub fn parent_field<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        serde_json::from_value(self.parent.get_field(name).take())
            .map_err(|err| Error::new(format!("Invalid parent field \"{name}\": {err}")))
    }
}

impl fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContext")
            .field("parent", &self.parent)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn context(parent: Value, args: Value) -> ResolverContext {
        let mut data = Data::default();
        data.insert(42_u32);
        let args = match args {
            Value::Object(args) => args,
            _ => serde_json::Map::new(),
        };
        ResolverContext::new(ResolvedValue::new(parent), args, Arc::new(data))
    }

    #[tokio::test]
    async fn parent_resolver_reads_the_property() {
        let ctx = context(json!({"title": "hello"}), json!({}));
        let value = Resolver::Parent.resolve("title", ctx).await.unwrap();
        assert_eq!(value.take(), json!("hello"));
    }

    #[tokio::test]
    async fn custom_resolver() {
        let resolver = Resolver::custom(|ctx: ResolverContext| async move {
            let id: String = ctx.arg("id")?;
            let multiplier = *ctx.data::<u32>()?;
            Ok::<_, Error>(json!({ "id": id, "multiplier": multiplier }))
        });

        let ctx = context(Value::Null, json!({"id": "abc"}));
        let value = resolver.resolve("user", ctx).await.unwrap();
        assert_eq!(value.take(), json!({"id": "abc", "multiplier": 42}));
    }

    #[test]
    fn missing_data_and_arguments() {
        let ctx = context(json!({"authorId": 3}), json!({}));
        assert_eq!(
            ctx.data::<String>().unwrap_err().message,
            "Data `alloc::string::String` does not exist."
        );
        assert!(ctx.arg::<String>("id").is_err());
        assert_eq!(ctx.arg::<Option<String>>("id").unwrap(), None);
        assert!(ctx.parent_field::<String>("authorId").is_err());
    }
}
