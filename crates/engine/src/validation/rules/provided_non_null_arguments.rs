use async_graphql_parser::{
    types::{Directive, Field},
    Positioned,
};

use super::{is_known_directive, CONDITION_ARGUMENT};
use crate::{
    registry::MetaType,
    validation::visitor::{Visitor, VisitorContext},
};

/// Arguments of a non-null type without a default value must be passed.
#[derive(Default)]
pub(crate) struct ProvidedNonNullArguments;

impl<'a> Visitor<'a> for ProvidedNonNullArguments {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(MetaType::Object(parent)) = ctx.current_type() else {
            return;
        };
        let Some(meta_field) = parent.field(field.node.name.node.as_str()) else {
            return;
        };

        for arg in meta_field.args.values() {
            if arg.ty.is_nullable() || arg.default_value.is_some() {
                continue;
            }
            if field.node.get_argument(&arg.name).is_none() {
                let ty = arg.ty.display(ctx.registry).to_string();
                ctx.report_error(
                    vec![field.pos],
                    format!(
                        r#"Field "{}" argument "{}" of type "{ty}" is required but not provided."#,
                        meta_field.name, arg.name
                    ),
                );
            }
        }
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {
        let name = directive.node.name.node.as_str();
        if is_known_directive(name) && directive.node.get_argument(CONDITION_ARGUMENT).is_none() {
            ctx.report_error(
                vec![directive.pos],
                format!(r#"Directive "@{name}" argument "{CONDITION_ARGUMENT}" of type "Boolean!" is required but not provided."#),
            );
        }
    }
}
