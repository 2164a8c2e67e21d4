use async_graphql_parser::{
    types::{FragmentDefinition, InlineFragment},
    Positioned,
};
use async_graphql_value::Name;

use crate::{
    registry::MetaType,
    validation::visitor::{Visitor, VisitorContext},
};

/// Fragments can only apply to object types.
#[derive(Default)]
pub(crate) struct FragmentsOnCompositeTypes;

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        let condition = &fragment_definition.node.type_condition;
        let on = condition.node.on.node.as_str();
        if let Some(ty) = ctx.registry.lookup_type(on) {
            if !matches!(ty, MetaType::Object(_)) {
                ctx.report_error(
                    vec![condition.pos],
                    format!(r#"Fragment "{name}" cannot condition on non composite type "{on}"."#),
                );
            }
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline_fragment: &'a Positioned<InlineFragment>) {
        let Some(condition) = &inline_fragment.node.type_condition else {
            return;
        };
        let on = condition.node.on.node.as_str();
        if let Some(ty) = ctx.registry.lookup_type(on) {
            if !matches!(ty, MetaType::Object(_)) {
                ctx.report_error(
                    vec![condition.pos],
                    format!(r#"Fragment cannot condition on non composite type "{on}"."#),
                );
            }
        }
    }
}
