//! ### What it does
//!
//! Only `@skip` and `@include` exist, and they apply to fields, fragment spreads and inline
//! fragments.

use async_graphql_parser::{
    types::{Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment, OperationDefinition, OperationType},
    Positioned,
};
use async_graphql_value::Name;

use super::is_known_directive;
use crate::validation::visitor::{Visitor, VisitorContext};

#[derive(Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    FragmentDefinition,
    Field,
    FragmentSpread,
    InlineFragment,
}

#[derive(Default)]
pub(crate) struct KnownDirectives {
    location: Option<DirectiveLocation>,
}

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: Option<&'a Name>,
        operation_definition: &'a Positioned<OperationDefinition>,
    ) {
        self.location = Some(match operation_definition.node.ty {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        _fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        self.location = Some(DirectiveLocation::FragmentDefinition);
    }

    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.location = Some(DirectiveLocation::Field);
    }

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, _fragment_spread: &'a Positioned<FragmentSpread>) {
        self.location = Some(DirectiveLocation::FragmentSpread);
    }

    fn enter_inline_fragment(&mut self, _ctx: &mut VisitorContext<'a>, _inline_fragment: &'a Positioned<InlineFragment>) {
        self.location = Some(DirectiveLocation::InlineFragment);
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {
        let name = directive.node.name.node.as_str();
        if !is_known_directive(name) {
            ctx.report_error(vec![directive.pos], format!(r#"Unknown directive "@{name}"."#));
            return;
        }

        match self.location {
            Some(DirectiveLocation::Field | DirectiveLocation::FragmentSpread | DirectiveLocation::InlineFragment) | None => {}
            Some(location) => {
                ctx.report_error(
                    vec![directive.pos],
                    format!(r#"Directive "@{name}" may not be used on {location}."#),
                );
            }
        }
    }
}
