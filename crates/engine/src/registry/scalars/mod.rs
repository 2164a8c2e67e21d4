use async_graphql_value::ConstValue;

use crate::{Error, InputValueResult};

mod boolean;
pub use boolean::BooleanScalar;
mod float;
pub use float::FloatScalar;
mod id;
pub use id::IDScalar;
mod int;
pub use int::IntScalar;
mod string;
pub use string::StringScalar;
mod uuid;
pub use self::uuid::UuidScalar;

pub trait DynamicParse {
    /// Name the scalar is registered under.
    const NAME: &'static str;

    /// Input coercion.
    ///
    /// Turns a literal or variable value into the JSON handed to resolvers.
    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value>;

    /// Result coercion.
    ///
    /// Takes the value a resolver produced and converts it into the response representation.
    /// Can fail if the data can't be coerced.
    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error>;
}

/// The closed set of scalars the engine knows how to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Boolean,
    Id,
    Uuid,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => StringScalar::NAME,
            ScalarKind::Int => IntScalar::NAME,
            ScalarKind::Float => FloatScalar::NAME,
            ScalarKind::Boolean => BooleanScalar::NAME,
            ScalarKind::Id => IDScalar::NAME,
            ScalarKind::Uuid => UuidScalar::NAME,
        }
    }

    pub fn parse(self, value: ConstValue) -> InputValueResult<serde_json::Value> {
        match self {
            ScalarKind::String => StringScalar::parse(value),
            ScalarKind::Int => IntScalar::parse(value),
            ScalarKind::Float => FloatScalar::parse(value),
            ScalarKind::Boolean => BooleanScalar::parse(value),
            ScalarKind::Id => IDScalar::parse(value),
            ScalarKind::Uuid => UuidScalar::parse(value),
        }
    }

    pub fn to_value(self, value: serde_json::Value) -> Result<ConstValue, Error> {
        match self {
            ScalarKind::String => StringScalar::to_value(value),
            ScalarKind::Int => IntScalar::to_value(value),
            ScalarKind::Float => FloatScalar::to_value(value),
            ScalarKind::Boolean => BooleanScalar::to_value(value),
            ScalarKind::Id => IDScalar::to_value(value),
            ScalarKind::Uuid => UuidScalar::to_value(value),
        }
    }
}
