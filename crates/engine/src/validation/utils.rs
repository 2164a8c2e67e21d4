use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::{Name, Value};

/// Name of the innermost type of a type written in a document, `[UUID!]!` gives `UUID`.
pub(crate) fn base_type_name(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => base_type_name(inner),
    }
}

/// Every variable the value refers to, nested lists and objects included.
pub(crate) fn referenced_variables(value: &Value) -> Vec<&Name> {
    let mut variables = Vec::new();
    collect_variables(value, &mut variables);
    variables
}

fn collect_variables<'a>(value: &'a Value, variables: &mut Vec<&'a Name>) {
    match value {
        Value::Variable(name) => variables.push(name),
        Value::List(items) => {
            for item in items {
                collect_variables(item, variables);
            }
        }
        Value::Object(fields) => {
            for value in fields.values() {
                collect_variables(value, variables);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::types::Type;
    use async_graphql_value::Value;

    use super::*;

    #[test]
    fn unwraps_list_and_non_null() {
        let ty = Type::new("[UUID!]!").unwrap();
        assert_eq!(base_type_name(&ty), "UUID");
    }

    #[test]
    fn finds_nested_variables() {
        let value = async_graphql_parser::parse_query("{ f(a: {b: [$x, 1, {c: $y}]}) }").unwrap();
        let operation = value.operations.iter().next().unwrap().1;
        let async_graphql_parser::types::Selection::Field(field) = &operation.node.selection_set.node.items[0].node
        else {
            unreachable!()
        };
        let argument: &Value = &field.node.arguments[0].1.node;

        let names = referenced_variables(argument)
            .into_iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "y"]);
    }
}
