//! ### What it does
//!
//! Rejects operations whose selections nest deeper than a fixed bound. Root fields sit at depth 0
//! and each nested selection set adds one level. Fragments count with the depth they are expanded
//! at, inline fragments add no level of their own.
//!
//! One error is reported per field crossing the bound, named by its response path. Nothing below
//! such a field is looked at.

use std::collections::HashMap;

use async_graphql_parser::{
    types::{FragmentDefinition, OperationDefinition, Selection, SelectionSet},
    Positioned,
};
use async_graphql_value::Name;

use crate::validation::visitor::{RuleError, Visitor, VisitorContext};

pub(crate) struct DepthLimit {
    max_depth: Option<usize>,
}

impl DepthLimit {
    pub(crate) fn new(max_depth: Option<usize>) -> Self {
        Self { max_depth }
    }
}

struct DepthWalker<'a> {
    max_depth: usize,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    path: Vec<&'a str>,
    visiting: Vec<&'a str>,
    errors: Vec<RuleError>,
}

impl<'a> DepthWalker<'a> {
    fn walk(&mut self, selection_set: &'a SelectionSet, depth: usize) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    self.path.push(field.node.response_key().node.as_str());
                    if depth > self.max_depth {
                        self.errors.push(RuleError::new(
                            vec![field.pos],
                            format!(
                                r#"Field "{}" exceeds the maximum query depth of {}."#,
                                self.path.join("."),
                                self.max_depth
                            ),
                        ));
                    } else {
                        self.walk(&field.node.selection_set.node, depth + 1);
                    }
                    self.path.pop();
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    // Cycles are reported by their own rule.
                    if self.visiting.contains(&name) {
                        continue;
                    }
                    let fragments = self.fragments;
                    let Some(fragment) = fragments.get(&spread.node.fragment_name.node) else {
                        continue;
                    };
                    self.visiting.push(name);
                    self.walk(&fragment.node.selection_set.node, depth);
                    self.visiting.pop();
                }
                Selection::InlineFragment(inline_fragment) => {
                    self.walk(&inline_fragment.node.selection_set.node, depth);
                }
            }
        }
    }
}

impl<'a> Visitor<'a> for DepthLimit {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        _name: Option<&'a Name>,
        operation_definition: &'a Positioned<OperationDefinition>,
    ) {
        let Some(max_depth) = self.max_depth else {
            return;
        };

        let mut walker = DepthWalker {
            max_depth,
            fragments: ctx.fragments,
            path: Vec::new(),
            visiting: Vec::new(),
            errors: Vec::new(),
        };
        walker.walk(&operation_definition.node.selection_set.node, 0);
        ctx.append_errors(walker.errors);
    }
}
