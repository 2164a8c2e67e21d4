use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{ExecutableDocument, FragmentDefinition, FragmentSpread},
    Pos, Positioned,
};
use async_graphql_value::Name;

use crate::validation::visitor::{RuleError, Visitor, VisitorContext};

/// A fragment may not spread itself, directly or through other fragments.
#[derive(Default)]
pub(crate) struct NoFragmentCycles<'a> {
    current_fragment: Option<&'a str>,
    spreads: HashMap<&'a str, Vec<(&'a str, Pos)>>,
    fragment_order: Vec<&'a str>,
}

struct CycleDetector<'a, 'b> {
    spreads: &'b HashMap<&'a str, Vec<(&'a str, Pos)>>,
    visited: HashSet<&'a str>,
    errors: Vec<RuleError>,
}

impl<'a> CycleDetector<'a, '_> {
    fn detect(&mut self, from: &'a str, stack: &mut Vec<&'a str>) {
        self.visited.insert(from);
        stack.push(from);

        let spreads = self.spreads;
        for &(to, pos) in spreads.get(from).into_iter().flatten() {
            if let Some(index) = stack.iter().position(|name| *name == to) {
                let via = &stack[index + 1..];
                let message = if via.is_empty() {
                    format!(r#"Cannot spread fragment "{to}" within itself."#)
                } else {
                    format!(r#"Cannot spread fragment "{to}" within itself via "{}"."#, via.join(r#"", ""#))
                };
                self.errors.push(RuleError::new(vec![pos], message));
            } else if !self.visited.contains(to) {
                self.detect(to, stack);
            }
        }

        stack.pop();
    }
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        _fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_fragment = Some(name.as_str());
        self.fragment_order.push(name.as_str());
    }

    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        _fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_fragment = None;
    }

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, fragment_spread: &'a Positioned<FragmentSpread>) {
        if let Some(current) = self.current_fragment {
            self.spreads
                .entry(current)
                .or_default()
                .push((fragment_spread.node.fragment_name.node.as_str(), fragment_spread.pos));
        }
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a ExecutableDocument) {
        let mut detector = CycleDetector {
            spreads: &self.spreads,
            visited: HashSet::new(),
            errors: Vec::new(),
        };

        for &name in &self.fragment_order {
            if !detector.visited.contains(name) {
                detector.detect(name, &mut Vec::new());
            }
        }

        ctx.append_errors(detector.errors);
    }
}
