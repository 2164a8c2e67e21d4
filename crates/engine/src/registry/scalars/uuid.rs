use async_graphql_value::ConstValue;

use super::DynamicParse;
use crate::{Error, InputValueError, InputValueResult};

/// Identifier scalar in the hyphenated `8-4-4-4-12` form, any letter case.
///
/// Values are validated but never normalised: what the client sent is exactly what the resolver
/// receives, and what the resolver returned is exactly what the client gets.
pub struct UuidScalar;

impl UuidScalar {
    pub fn is_valid(value: &str) -> bool {
        // 36 characters rules out the simple, braced and urn forms `Uuid::try_parse` also accepts.
        value.len() == 36 && uuid::Uuid::try_parse(value).is_ok()
    }

    /// Coerces a client-supplied value.
    pub fn parse_value(raw: &str) -> InputValueResult<&str> {
        if Self::is_valid(raw) {
            Ok(raw)
        } else {
            Err(InputValueError::ty_custom(
                Self::NAME,
                format!(r#""{raw}" is not a valid UUID"#),
            ))
        }
    }

    /// Coerces an outgoing field value.
    pub fn serialize(value: &str) -> Result<&str, Error> {
        if Self::is_valid(value) {
            Ok(value)
        } else {
            Err(Error::new(format!(r#"UUID cannot represent value: "{value}""#)))
        }
    }
}

impl DynamicParse for UuidScalar {
    const NAME: &'static str = "UUID";

    fn parse(value: ConstValue) -> InputValueResult<serde_json::Value> {
        match value {
            ConstValue::String(value) => {
                Self::parse_value(&value)?;
                Ok(serde_json::Value::String(value))
            }
            other => Err(InputValueError::expected_type(Self::NAME, &other)),
        }
    }

    fn to_value(value: serde_json::Value) -> Result<ConstValue, Error> {
        match value {
            serde_json::Value::String(value) => {
                Self::serialize(&value)?;
                Ok(ConstValue::String(value))
            }
            other => Err(Error::new(format!("UUID cannot represent value: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;
    use rstest::rstest;

    use super::{DynamicParse, UuidScalar};

    #[rstest]
    #[case("0b1e6a4e-7d7b-4c3a-9d56-2a57f2f0f3a1")]
    #[case("0B1E6A4E-7D7B-4C3A-9D56-2A57F2F0F3A1")]
    #[case("0b1E6a4E-7d7B-4c3A-9d56-2a57f2F0f3a1")]
    #[case("00000000-0000-0000-0000-000000000000")]
    fn accepts_canonical_form_untouched(#[case] raw: &str) {
        assert_eq!(UuidScalar::parse_value(raw).unwrap(), raw);
        assert_eq!(UuidScalar::serialize(raw).unwrap(), raw);
        assert_eq!(
            UuidScalar::parse(ConstValue::String(raw.to_string())).unwrap(),
            serde_json::Value::String(raw.to_string())
        );
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("0b1e6a4e7d7b4c3a9d562a57f2f0f3a1")]
    #[case("{0b1e6a4e-7d7b-4c3a-9d56-2a57f2f0f3a1}")]
    #[case("urn:uuid:0b1e6a4e-7d7b-4c3a-9d56-2a57f2f0f3a1")]
    #[case("0b1e6a4e-7d7b-4c3a-9d56-2a57f2f0f3ag")]
    #[case("0b1e6a4e-7d7b4-c3a-9d56-2a57f2f0f3a1")]
    fn rejects_everything_else(#[case] raw: &str) {
        let error = UuidScalar::parse_value(raw).unwrap_err();
        assert_eq!(
            error.message(),
            format!(r#"Failed to parse "UUID": "{raw}" is not a valid UUID"#)
        );
        assert!(UuidScalar::serialize(raw).unwrap_err().message.contains(raw));
    }

    #[test]
    fn rejects_non_strings() {
        let error = UuidScalar::parse(ConstValue::Number(42.into())).unwrap_err();
        assert_eq!(error.message(), r#"Expected input type "UUID", found 42."#);

        let error = UuidScalar::to_value(serde_json::json!(42)).unwrap_err();
        assert_eq!(error.message, "UUID cannot represent value: 42");
    }
}
