//! ### What it does
//!
//! The schema only has object types, so a fragment applies exactly when its type condition is the
//! type it is spread into. Anything else could never match.

use async_graphql_parser::{
    types::{FragmentSpread, InlineFragment},
    Positioned,
};

use crate::{
    registry::MetaType,
    validation::visitor::{Visitor, VisitorContext},
};

#[derive(Default)]
pub(crate) struct PossibleFragmentSpreads;

impl<'a> Visitor<'a> for PossibleFragmentSpreads {
    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, fragment_spread: &'a Positioned<FragmentSpread>) {
        let Some(MetaType::Object(parent)) = ctx.current_type() else {
            return;
        };
        let name = &fragment_spread.node.fragment_name.node;
        let fragments = ctx.fragments;
        let Some(fragment) = fragments.get(name) else {
            return;
        };

        let on = fragment.node.type_condition.node.on.node.as_str();
        if matches!(ctx.registry.lookup_type(on), Some(MetaType::Object(_))) && on != parent.name {
            ctx.report_error(
                vec![fragment_spread.pos],
                format!(
                    r#"Fragment "{name}" cannot be spread here as objects of type "{}" can never be of type "{on}"."#,
                    parent.name
                ),
            );
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline_fragment: &'a Positioned<InlineFragment>) {
        let Some(MetaType::Object(parent)) = ctx.current_type() else {
            return;
        };
        let Some(condition) = &inline_fragment.node.type_condition else {
            return;
        };

        let on = condition.node.on.node.as_str();
        if matches!(ctx.registry.lookup_type(on), Some(MetaType::Object(_))) && on != parent.name {
            ctx.report_error(
                vec![inline_fragment.pos],
                format!(
                    r#"Fragment cannot be spread here as objects of type "{}" can never be of type "{on}"."#,
                    parent.name
                ),
            );
        }
    }
}
