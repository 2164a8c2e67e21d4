//! Input coercion of variables and field arguments.
//!
//! Everything is coerced before the first resolver runs. A single value that cannot be coerced
//! fails the whole request, there is no partial execution with half of the arguments.

use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{Field, FragmentDefinition, OperationDefinition, Selection, SelectionSet},
    Positioned,
};
use async_graphql_value::{ConstValue, Name, Value};

use crate::{
    context::CoercedArguments,
    registry::{MetaField, MetaInputValue, MetaType, ObjectType, Registry, TypeRef},
    ErrorCode, InputValueError, InputValueResult, ServerError, ServerResult, Variables,
};

/// Variables of the operation after checking them against their declared types.
///
/// Values are kept as sent, apart from enum names, and coerced again with the type of each
/// argument they end up in.
pub(crate) type VariableValues = HashMap<Name, ConstValue>;

/// Checks the request variables against the variable definitions of `operation`.
///
/// Absent variables take their default value when they have one and are left out otherwise.
pub(crate) fn coerce_variables(
    registry: &Registry,
    operation: &OperationDefinition,
    variables: &Variables,
) -> ServerResult<VariableValues> {
    let mut values = VariableValues::new();

    for definition in &operation.variable_definitions {
        let name = &definition.node.name.node;
        let coercion_error =
            |message: String| ServerError::new(message, Some(definition.pos)).with_code(ErrorCode::ArgumentCoercionError);

        let Some(ty) = registry.resolve_type(&definition.node.var_type.node) else {
            return Err(coercion_error(format!(
                r#"Unknown type "{}"."#,
                definition.node.var_type.node
            )));
        };

        let value = match variables.get(name) {
            Some(value) => enum_names_from_json(registry, &ty, value.clone()),
            None => match &definition.node.default_value {
                Some(default_value) => default_value.node.clone(),
                None if ty.is_non_null() => {
                    return Err(coercion_error(format!(
                        r#"Variable "${name}" of required type "{}" was not provided."#,
                        ty.display(registry)
                    )));
                }
                None => continue,
            },
        };

        if let Err(error) = coerce_input_value(registry, &ty, value.clone()) {
            return Err(coercion_error(format!(
                r#"Variable "${name}" got invalid value {value}; {error}"#
            )));
        }
        values.insert(name.clone(), value);
    }

    Ok(values)
}

/// JSON has no enum values, so strings sent at enum positions of a variable name enum values.
fn enum_names_from_json(registry: &Registry, ty: &TypeRef, value: ConstValue) -> ConstValue {
    match (ty, value) {
        (TypeRef::NonNull(inner), value) => enum_names_from_json(registry, inner, value),
        (TypeRef::List(inner), ConstValue::List(items)) => ConstValue::List(
            items
                .into_iter()
                .map(|item| enum_names_from_json(registry, inner, item))
                .collect(),
        ),
        (TypeRef::List(inner), value) => enum_names_from_json(registry, inner, value),
        (TypeRef::Named(id), value) => match (registry.get(*id), value) {
            (MetaType::Enum(_), ConstValue::String(name)) => ConstValue::Enum(Name::new(name)),
            (MetaType::InputObject(input_object), ConstValue::Object(fields)) => ConstValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| match input_object.fields.get(key.as_str()) {
                        Some(field) => {
                            let value = enum_names_from_json(registry, &field.ty, value);
                            (key, value)
                        }
                        None => (key, value),
                    })
                    .collect(),
            ),
            (_, value) => value,
        },
    }
}

/// Coerces the arguments of every field selected by `operation`, keyed by field position.
pub(crate) fn coerce_arguments(
    registry: &Registry,
    root: &ObjectType,
    operation: &OperationDefinition,
    fragments: &HashMap<Name, Positioned<FragmentDefinition>>,
    variables: &VariableValues,
) -> ServerResult<CoercedArguments> {
    let mut walker = ArgumentsWalker {
        registry,
        fragments,
        variables,
        coerced_fragments: HashSet::new(),
        arguments: CoercedArguments::new(),
    };
    walker.walk(root, &operation.selection_set.node)?;
    Ok(walker.arguments)
}

struct ArgumentsWalker<'a> {
    registry: &'a Registry,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    variables: &'a VariableValues,
    coerced_fragments: HashSet<&'a Name>,
    arguments: CoercedArguments,
}

impl<'a> ArgumentsWalker<'a> {
    fn walk(&mut self, ty: &'a ObjectType, selection_set: &'a SelectionSet) -> ServerResult<()> {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let Some(meta_field) = ty.field(field.node.name.node.as_str()) else {
                        continue;
                    };
                    let arguments = self.coerce_field_arguments(meta_field, field)?;
                    self.arguments.insert(field.pos, arguments);

                    let registry = self.registry;
                    if let MetaType::Object(object) = registry.concrete_type(&meta_field.ty) {
                        self.walk(object, &field.node.selection_set.node)?;
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let name = &spread.node.fragment_name.node;
                    let fragments = self.fragments;
                    let Some(fragment) = fragments.get(name) else {
                        continue;
                    };
                    // A fragment always applies to the same type, its arguments are the same wherever it is spread.
                    if fragment.node.type_condition.node.on.node.as_str() != ty.name
                        || !self.coerced_fragments.insert(name)
                    {
                        continue;
                    }
                    self.walk(ty, &fragment.node.selection_set.node)?;
                }
                Selection::InlineFragment(inline_fragment) => {
                    let applies = match &inline_fragment.node.type_condition {
                        Some(condition) => condition.node.on.node.as_str() == ty.name,
                        None => true,
                    };
                    if applies {
                        self.walk(ty, &inline_fragment.node.selection_set.node)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn coerce_field_arguments(
        &self,
        meta_field: &MetaField,
        field: &Positioned<Field>,
    ) -> ServerResult<serde_json::Map<String, serde_json::Value>> {
        let mut arguments = serde_json::Map::new();

        for arg in meta_field.args.values() {
            let provided = field.node.get_argument(&arg.name);
            let value = provided.and_then(|value| self.substitute_variables(&value.node));
            let pos = provided.map_or(field.pos, |value| value.pos);

            match self.coerce_argument(arg, &meta_field.name, value) {
                Ok(Some(value)) => {
                    arguments.insert(arg.name.clone(), value);
                }
                Ok(None) => {}
                Err(error) => {
                    return Err(ServerError::new(
                        format!(r#"Invalid value for argument "{}", {error}"#, arg.name),
                        Some(pos),
                    )
                    .with_code(ErrorCode::ArgumentCoercionError));
                }
            }
        }

        Ok(arguments)
    }

    /// Replaces variables by their values. A variable that was not provided makes the whole
    /// argument absent, nested ones become null.
    fn substitute_variables(&self, value: &Value) -> Option<ConstValue> {
        if let Value::Variable(name) = value {
            return self.variables.get(name).cloned();
        }

        value
            .clone()
            .into_const_with(|name| Ok::<_, std::convert::Infallible>(self.variables.get(&name).cloned().unwrap_or(ConstValue::Null)))
            .ok()
    }

    fn coerce_argument(
        &self,
        arg: &MetaInputValue,
        field_name: &str,
        value: Option<ConstValue>,
    ) -> InputValueResult<Option<serde_json::Value>> {
        let value = match value.or_else(|| arg.default_value.clone()) {
            Some(value) => value,
            None if arg.ty.is_non_null() => {
                return Err(InputValueError::ty_custom(
                    arg.ty.display(self.registry),
                    format!(r#"Field "{field_name}" argument "{}" is required but not provided."#, arg.name),
                ));
            }
            None => return Ok(None),
        };

        coerce_input_value(self.registry, &arg.ty, value).map(Some)
    }
}

/// Coerces a value against an input type, producing the JSON resolvers receive.
pub(crate) fn coerce_input_value(
    registry: &Registry,
    ty: &TypeRef,
    value: ConstValue,
) -> InputValueResult<serde_json::Value> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value == ConstValue::Null {
                return Err(InputValueError::expected_type(ty.display(registry), &value));
            }
            coerce_input_value(registry, inner, value)
        }
        _ if value == ConstValue::Null => Ok(serde_json::Value::Null),
        TypeRef::List(inner) => match value {
            ConstValue::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    coerce_input_value(registry, inner, item).map_err(|error| error.within(format!("[{index}]")))
                })
                .collect::<InputValueResult<Vec<_>>>()
                .map(serde_json::Value::Array),
            // A single value where a list is expected is a list of one.
            other => Ok(serde_json::Value::Array(vec![coerce_input_value(registry, inner, other)?])),
        },
        TypeRef::Named(id) => match registry.get(*id) {
            MetaType::Scalar(scalar) => scalar.kind.parse(value),
            MetaType::Enum(enum_type) => {
                let ConstValue::Enum(name) = &value else {
                    return Err(InputValueError::expected_type(&enum_type.name, &value));
                };
                let name = name.as_str();
                enum_type.internal_value(name).cloned().ok_or_else(|| {
                    InputValueError::ty_custom(
                        &enum_type.name,
                        format!(r#"Enumeration type does not contain value "{name}"."#),
                    )
                })
            }
            MetaType::InputObject(input_object) => {
                let ConstValue::Object(fields) = value else {
                    return Err(InputValueError::expected_type(&input_object.name, &value));
                };

                if let Some(unknown) = fields
                    .keys()
                    .find(|key| !input_object.fields.contains_key(key.as_str()))
                {
                    return Err(InputValueError::ty_custom(
                        &input_object.name,
                        format!(r#"Unknown field "{unknown}"."#),
                    ));
                }

                let mut coerced = serde_json::Map::new();
                for field in input_object.fields.values() {
                    let value = match fields.get(field.name.as_str()).cloned() {
                        Some(value) => value,
                        None => match &field.default_value {
                            Some(default_value) => default_value.clone(),
                            None if field.ty.is_non_null() => {
                                return Err(InputValueError::ty_custom(
                                    &input_object.name,
                                    format!(
                                        r#"Field "{}" of required type "{}" was not provided."#,
                                        field.name,
                                        field.ty.display(registry)
                                    ),
                                ));
                            }
                            None => continue,
                        },
                    };

                    let value = coerce_input_value(registry, &field.ty, value)
                        .map_err(|error| error.within(format!(r#"field "{}""#, field.name)))?;
                    coerced.insert(field.name.clone(), value);
                }
                Ok(serde_json::Value::Object(coerced))
            }
            MetaType::Object(object) => Err(InputValueError::ty_custom(
                &object.name,
                "object types cannot be used as input",
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::{ConstValue, Name};
    use indexmap::IndexMap;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::registry::{EnumType, InputObjectType, MetaField, MetaInputValue, ObjectType};

    const ID: &str = "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc";

    fn registry() -> Registry {
        let mut builder = Registry::builder();
        let tier = builder
            .register(EnumType::new("Tier").value("BASIC", "basic").value("GOLD", "gold"))
            .unwrap();
        let input = builder
            .register(
                InputObjectType::new("CreateInput")
                    .with_field(MetaInputValue::new("name", builder.named("String").unwrap().non_null()))
                    .with_field(MetaInputValue::new("tier", TypeRef::named(tier)))
                    .with_field(
                        MetaInputValue::new("score", builder.named("Int").unwrap())
                            .with_default(ConstValue::Number(1.into())),
                    ),
            )
            .unwrap();
        let query = builder
            .register(
                ObjectType::new("Query").with_field(
                    MetaField::new("ok", builder.named("Boolean").unwrap())
                        .with_arg(MetaInputValue::new("id", builder.named("UUID").unwrap().non_null()))
                        .with_arg(MetaInputValue::new("input", TypeRef::named(input)))
                        .with_arg(MetaInputValue::new("ids", builder.named("UUID").unwrap().non_null().list())),
                ),
            )
            .unwrap();
        builder.set_query_type(query);
        builder.finish().unwrap()
    }

    fn coerce(ty: &str, value: serde_json::Value) -> Result<serde_json::Value, String> {
        let registry = registry();
        let ty = registry
            .resolve_type(&async_graphql_parser::types::Type::new(ty).unwrap())
            .unwrap();
        let value = enum_names_from_json(&registry, &ty, ConstValue::from_json(value).unwrap());
        coerce_input_value(&registry, &ty, value).map_err(|error| error.to_string())
    }

    #[rstest]
    #[case("UUID!", json!(ID), json!(ID))]
    #[case("UUID", json!(null), json!(null))]
    #[case("[UUID!]", json!([ID, ID]), json!([ID, ID]))]
    #[case("[UUID!]", json!(ID), json!([ID]))]
    #[case("Tier", json!("GOLD"), json!("gold"))]
    #[case("CreateInput!", json!({"name": "a"}), json!({"name": "a", "score": 1}))]
    #[case("CreateInput", json!({"tier": "BASIC", "name": "a", "score": null}), json!({"name": "a", "tier": "basic", "score": null}))]
    fn coerces(#[case] ty: &str, #[case] value: serde_json::Value, #[case] expected: serde_json::Value) {
        assert_eq!(coerce(ty, value), Ok(expected));
    }

    #[rstest]
    #[case("UUID!", json!(null), r#"Expected input type "UUID!", found null."#)]
    #[case("UUID", json!("nope"), r#"Failed to parse "UUID": "nope" is not a valid UUID"#)]
    #[case("UUID", json!(12), r#"Expected input type "UUID", found 12."#)]
    #[case("[UUID!]", json!([ID, null]), r#"[1]: Expected input type "UUID!", found null."#)]
    #[case("Tier", json!("SILVER"), r#"Failed to parse "Tier": Enumeration type does not contain value "SILVER"."#)]
    #[case("CreateInput", json!({}), r#"Failed to parse "CreateInput": Field "name" of required type "String!" was not provided."#)]
    #[case("CreateInput", json!({"name": "a", "x": 1}), r#"Failed to parse "CreateInput": Unknown field "x"."#)]
    #[case("CreateInput", json!({"name": 1}), r#"field "name": Expected input type "String", found 1."#)]
    #[case("CreateInput", json!("a"), r#"Expected input type "CreateInput", found "a"."#)]
    fn rejects(#[case] ty: &str, #[case] value: serde_json::Value, #[case] expected: &str) {
        assert_eq!(coerce(ty, value), Err(expected.to_string()));
    }

    fn parse_operation(query: &str) -> async_graphql_parser::types::ExecutableDocument {
        async_graphql_parser::parse_query(query).unwrap()
    }

    fn variables(value: serde_json::Value) -> Variables {
        Variables::from_json(value)
    }

    #[test]
    fn variables_take_defaults_and_skip_absent_ones() {
        let registry = registry();
        let doc = parse_operation(r#"query ($id: UUID = "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc", $other: UUID) { ok(id: $id) }"#);
        let operation = &doc.operations.iter().next().unwrap().1.node;

        let values = coerce_variables(&registry, operation, &variables(json!({}))).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("id"), Some(&ConstValue::String(ID.to_string())));
    }

    #[test]
    fn missing_required_variable() {
        let registry = registry();
        let doc = parse_operation("query ($id: UUID!) { ok(id: $id) }");
        let operation = &doc.operations.iter().next().unwrap().1.node;

        let error = coerce_variables(&registry, operation, &variables(json!({}))).unwrap_err();
        assert_eq!(error.message, r#"Variable "$id" of required type "UUID!" was not provided."#);
        assert_eq!(error.code, ErrorCode::ArgumentCoercionError);
    }

    #[test]
    fn invalid_variable() {
        let registry = registry();
        let doc = parse_operation("query ($id: UUID!) { ok(id: $id) }");
        let operation = &doc.operations.iter().next().unwrap().1.node;

        let error = coerce_variables(&registry, operation, &variables(json!({"id": "abc"}))).unwrap_err();
        assert_eq!(
            error.message,
            r#"Variable "$id" got invalid value "abc"; Failed to parse "UUID": "abc" is not a valid UUID"#
        );
    }

    fn arguments(query: &str, vars: serde_json::Value) -> ServerResult<Vec<serde_json::Value>> {
        let registry = registry();
        let doc = parse_operation(query);
        let operation = &doc.operations.iter().next().unwrap().1.node;
        let values = coerce_variables(&registry, operation, &variables(vars))?;
        let arguments = coerce_arguments(&registry, registry.query_type(), operation, &doc.fragments, &values)?;

        let mut arguments = arguments.into_iter().collect::<Vec<_>>();
        arguments.sort_by_key(|(pos, _)| *pos);
        Ok(arguments
            .into_iter()
            .map(|(_, args)| serde_json::Value::Object(args))
            .collect())
    }

    #[test]
    fn literal_and_variable_arguments() {
        let query = r#"
            query ($input: CreateInput) {
                a: ok(id: "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc", input: {name: "x", tier: GOLD})
                b: ok(id: "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc", input: $input, ids: [])
            }
        "#;

        let arguments = arguments(query, json!({"input": {"name": "y"}})).unwrap();
        assert_eq!(
            arguments,
            vec![
                json!({"id": ID, "input": {"name": "x", "tier": "gold", "score": 1}}),
                json!({"id": ID, "input": {"name": "y", "score": 1}, "ids": []}),
            ]
        );
    }

    #[test]
    fn enum_values_are_names_in_documents_and_strings_in_variables() {
        let query = r#"query ($input: CreateInput) { ok(id: "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc", input: $input) }"#;
        assert_eq!(
            arguments(query, json!({"input": {"name": "y", "tier": "GOLD"}})).unwrap(),
            vec![json!({"id": ID, "input": {"name": "y", "tier": "gold", "score": 1}})]
        );

        let query = r#"{ ok(id: "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc", input: {name: "x", tier: "GOLD"}) }"#;
        let error = arguments(query, json!({})).unwrap_err();
        assert_eq!(
            error.message,
            r#"Invalid value for argument "input", field "tier": Expected input type "Tier", found "GOLD"."#
        );
    }

    #[test]
    fn absent_variable_leaves_the_argument_out() {
        let query = r#"query ($input: CreateInput) { ok(id: "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc", input: $input) }"#;
        assert_eq!(arguments(query, json!({})).unwrap(), vec![json!({"id": ID})]);
    }

    #[test]
    fn invalid_literal_fails_the_request() {
        let query = r#"{ ok(id: "not-a-uuid") }"#;
        let error = arguments(query, json!({})).unwrap_err();
        assert_eq!(
            error.message,
            r#"Invalid value for argument "id", Failed to parse "UUID": "not-a-uuid" is not a valid UUID"#
        );
        assert_eq!(error.code, ErrorCode::ArgumentCoercionError);
    }

    #[test]
    fn arguments_inside_fragments() {
        let query = r#"
            { ...A ... on Query { ...A } }
            fragment A on Query { ok(id: "0a7c5d4e-2f1b-4c3d-9e8f-123456789abc") }
        "#;
        assert_eq!(arguments(query, json!({})).unwrap(), vec![json!({"id": ID})]);
    }

    #[test]
    fn enum_names_are_not_strings_of_other_types() {
        let mut object = IndexMap::new();
        object.insert(Name::new("name"), ConstValue::String("x".into()));
        object.insert(Name::new("tier"), ConstValue::Boolean(true));

        let registry = registry();
        let ty = TypeRef::named(registry.id_of("CreateInput").unwrap());
        let error = coerce_input_value(&registry, &ty, ConstValue::Object(object)).unwrap_err();
        assert_eq!(error.to_string(), r#"field "tier": Expected input type "Tier", found true."#);
    }
}
