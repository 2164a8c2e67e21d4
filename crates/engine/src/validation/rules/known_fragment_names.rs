use async_graphql_parser::{types::FragmentSpread, Positioned};

use crate::validation::visitor::{Visitor, VisitorContext};

#[derive(Default)]
pub(crate) struct KnownFragmentNames;

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, fragment_spread: &'a Positioned<FragmentSpread>) {
        let name = &fragment_spread.node.fragment_name.node;
        if !ctx.fragments.contains_key(name) {
            ctx.report_error(
                vec![fragment_spread.pos],
                format!(r#"Unknown fragment "{name}"."#),
            );
        }
    }
}
