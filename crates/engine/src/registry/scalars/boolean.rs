use async_graphql_value::ConstValue;

use super::DynamicParse;
use crate::{Error, InputValueError, InputValueResult};

pub struct BooleanScalar;

impl DynamicParse for BooleanScalar {
    const NAME: &'static str = "Boolean";

    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value> {
        match value {
            ConstValue::Boolean(value) => Ok(serde_json::Value::Bool(value)),
            other => Err(InputValueError::expected_type(Self::NAME, &other)),
        }
    }

    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error> {
        match value {
            serde_json::Value::Bool(value) => Ok(ConstValue::Boolean(value)),
            other => Err(Error::new(format!("Boolean cannot represent a non boolean value: {other}"))),
        }
    }
}
