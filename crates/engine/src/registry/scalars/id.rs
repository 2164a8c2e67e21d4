use async_graphql_value::ConstValue;

use super::DynamicParse;
use crate::{Error, InputValueError, InputValueResult};

pub struct IDScalar;

impl DynamicParse for IDScalar {
    const NAME: &'static str = "ID";

    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value> {
        match value {
            ConstValue::String(value) => Ok(serde_json::Value::String(value)),
            ConstValue::Number(number) if number.is_i64() || number.is_u64() => {
                Ok(serde_json::Value::String(number.to_string()))
            }
            other => Err(InputValueError::expected_type(Self::NAME, &other)),
        }
    }

    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error> {
        match value {
            serde_json::Value::String(value) => Ok(ConstValue::String(value)),
            serde_json::Value::Number(number) if number.is_i64() || number.is_u64() => {
                Ok(ConstValue::String(number.to_string()))
            }
            other => Err(Error::new(format!("ID cannot represent value: {other}"))),
        }
    }
}
