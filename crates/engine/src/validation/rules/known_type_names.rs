use async_graphql_parser::{
    types::{FragmentDefinition, InlineFragment, TypeCondition, VariableDefinition},
    Positioned,
};
use async_graphql_value::Name;

use crate::validation::{
    utils::base_type_name,
    visitor::{Visitor, VisitorContext},
};

/// Type conditions and variable types must name types of the schema.
#[derive(Default)]
pub(crate) struct KnownTypeNames;

impl KnownTypeNames {
    fn check_type_condition(ctx: &mut VisitorContext<'_>, condition: &Positioned<TypeCondition>) {
        let name = condition.node.on.node.as_str();
        if ctx.registry.lookup_type(name).is_none() {
            ctx.report_error(vec![condition.pos], format!(r#"Unknown type "{name}"."#));
        }
    }
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        Self::check_type_condition(ctx, &fragment_definition.node.type_condition);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline_fragment: &'a Positioned<InlineFragment>) {
        if let Some(condition) = &inline_fragment.node.type_condition {
            Self::check_type_condition(ctx, condition);
        }
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let name = base_type_name(&variable_definition.node.var_type.node);
        if ctx.registry.lookup_type(name).is_none() {
            ctx.report_error(
                vec![variable_definition.node.var_type.pos],
                format!(r#"Unknown type "{name}"."#),
            );
        }
    }
}
