use async_graphql_parser::{
    types::{Directive, Field},
    Positioned,
};
use async_graphql_value::{Name, Value};

use super::{is_known_directive, CONDITION_ARGUMENT};
use crate::{
    registry::{MetaField, MetaType},
    validation::visitor::{Visitor, VisitorContext},
};

enum ArgsOwner<'a> {
    Field { parent: &'a str, field: &'a MetaField },
    Directive(&'a str),
}

#[derive(Default)]
pub(crate) struct KnownArgumentNames<'a> {
    current: Option<ArgsOwner<'a>>,
}

impl<'a> Visitor<'a> for KnownArgumentNames<'a> {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        self.current = match ctx.current_type() {
            Some(MetaType::Object(parent)) => parent
                .field(field.node.name.node.as_str())
                .map(|field| ArgsOwner::Field {
                    parent: &parent.name,
                    field,
                }),
            _ => None,
        };
    }

    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.current = None;
    }

    fn enter_directive(&mut self, _ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {
        let name = directive.node.name.node.as_str();
        self.current = is_known_directive(name).then_some(ArgsOwner::Directive(name));
    }

    fn exit_directive(&mut self, _ctx: &mut VisitorContext<'a>, _directive: &'a Positioned<Directive>) {
        self.current = None;
    }

    fn enter_argument(&mut self, ctx: &mut VisitorContext<'a>, name: &'a Positioned<Name>, _value: &'a Positioned<Value>) {
        let argument = name.node.as_str();
        match &self.current {
            Some(ArgsOwner::Field { parent, field }) if !field.args.contains_key(argument) => {
                ctx.report_error(
                    vec![name.pos],
                    format!(r#"Unknown argument "{argument}" on field "{parent}.{}"."#, field.name),
                );
            }
            Some(ArgsOwner::Directive(directive)) if argument != CONDITION_ARGUMENT => {
                ctx.report_error(
                    vec![name.pos],
                    format!(r#"Unknown argument "{argument}" on directive "@{directive}"."#),
                );
            }
            _ => {}
        }
    }
}
