use async_graphql_value::ConstValue;

use super::DynamicParse;
use crate::{Error, InputValueError, InputValueResult};

pub struct IntScalar;

impl IntScalar {
    fn as_i32(number: &serde_json::Number) -> Option<i32> {
        match number.as_i64() {
            Some(value) => i32::try_from(value).ok(),
            None => number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && *value >= f64::from(i32::MIN) && *value <= f64::from(i32::MAX))
                .map(|value| value as i32),
        }
    }
}

impl DynamicParse for IntScalar {
    const NAME: &'static str = "Int";

    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value> {
        match value {
            ConstValue::Number(number) if number.is_f64() => Err(InputValueError::ty_custom(
                Self::NAME,
                format!("Expected an integer, found {number}"),
            )),
            ConstValue::Number(number) => Self::as_i32(&number)
                .map(serde_json::Value::from)
                .ok_or_else(|| {
                    InputValueError::ty_custom(
                        Self::NAME,
                        format!("Only 32-bit integers are supported, found {number}"),
                    )
                }),
            other => Err(InputValueError::expected_type(Self::NAME, &other)),
        }
    }

    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error> {
        match value {
            serde_json::Value::Number(number) => Self::as_i32(&number)
                .map(|value| ConstValue::Number(value.into()))
                .ok_or_else(|| Error::new(format!("Int cannot represent non 32-bit integer value: {number}"))),
            other => Err(Error::new(format!("Int cannot represent non-integer value: {other}"))),
        }
    }
}
