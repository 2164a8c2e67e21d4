use async_graphql_parser::{types::VariableDefinition, Positioned};

use crate::validation::{
    utils::base_type_name,
    visitor::{Visitor, VisitorContext},
};

#[derive(Default)]
pub(crate) struct VariablesAreInputTypes;

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let ty = base_type_name(&variable_definition.node.var_type.node);
        if ctx.registry.lookup_type(ty).is_some_and(|ty| !ty.is_input()) {
            ctx.report_error(
                vec![variable_definition.pos],
                format!(
                    r#"Variable "${}" cannot be non-input type "{}"."#,
                    variable_definition.node.name.node, variable_definition.node.var_type.node
                ),
            );
        }
    }
}
