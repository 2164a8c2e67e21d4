use async_graphql_value::ConstValue;

use super::DynamicParse;
use crate::{Error, InputValueError, InputValueResult};

pub struct StringScalar;

impl DynamicParse for StringScalar {
    const NAME: &'static str = "String";

    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value> {
        match value {
            ConstValue::String(value) => Ok(serde_json::Value::String(value)),
            other => Err(InputValueError::expected_type(Self::NAME, &other)),
        }
    }

    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error> {
        match value {
            serde_json::Value::String(value) => Ok(ConstValue::String(value)),
            other => Err(Error::new(format!("String cannot represent a non string value: {other}"))),
        }
    }
}
