use async_graphql_value::ConstValue;

use super::DynamicParse;
use crate::{Error, InputValueError, InputValueResult};

pub struct FloatScalar;

impl DynamicParse for FloatScalar {
    const NAME: &'static str = "Float";

    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value> {
        match value {
            ConstValue::Number(number) => Ok(serde_json::Value::Number(number)),
            other => Err(InputValueError::expected_type(Self::NAME, &other)),
        }
    }

    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error> {
        match value {
            serde_json::Value::Number(number) => Ok(ConstValue::Number(number)),
            other => Err(Error::new(format!("Float cannot represent non numeric value: {other}"))),
        }
    }
}
