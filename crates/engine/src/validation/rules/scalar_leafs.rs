//! ### What it does
//!
//! Scalars and enums are leaves and take no selection set, objects always need one.

use async_graphql_parser::{types::Field, Positioned};

use crate::{
    registry::MetaType,
    validation::visitor::{Visitor, VisitorContext},
};

#[derive(Default)]
pub(crate) struct ScalarLeafs;

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(MetaType::Object(parent)) = ctx.current_type() else {
            return;
        };
        let name = field.node.name.node.as_str();
        let Some(meta_field) = parent.field(name) else {
            return;
        };

        let ty = meta_field.ty.display(ctx.registry).to_string();
        let has_selection = !field.node.selection_set.node.items.is_empty();
        let is_leaf = ctx.registry.concrete_type(&meta_field.ty).is_leaf();

        if is_leaf && has_selection {
            ctx.report_error(
                vec![field.pos],
                format!(r#"Field "{name}" must not have a selection since type "{ty}" has no subfields."#),
            );
        } else if !is_leaf && !has_selection {
            ctx.report_error(
                vec![field.pos],
                format!(r#"Field "{name}" of type "{ty}" must have a selection of subfields. Did you mean "{name} {{ ... }}"?"#),
            );
        }
    }
}
