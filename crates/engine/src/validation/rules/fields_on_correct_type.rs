//! ### What it does
//!
//! Every selected field must be defined on the object type it is selected on. `__typename` is
//! available on every object.

use async_graphql_parser::{types::Field, Positioned};

use crate::{
    registry::MetaType,
    validation::visitor::{Visitor, VisitorContext},
};

#[derive(Default)]
pub(crate) struct FieldsOnCorrectType;

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(MetaType::Object(parent)) = ctx.current_type() else {
            return;
        };

        let name = field.node.name.node.as_str();
        if name == "__typename" || parent.field(name).is_some() {
            return;
        }

        ctx.report_error(
            vec![field.pos],
            format!(r#"Unknown field "{name}" on type "{}"."#, parent.name),
        );
    }
}
