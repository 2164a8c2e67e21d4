use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{ExecutableDocument, FragmentDefinition, FragmentSpread, OperationDefinition},
    Pos, Positioned,
};
use async_graphql_value::{Name, Value};

use crate::validation::{
    utils::referenced_variables,
    visitor::{Visitor, VisitorContext},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

struct OperationVariables<'a> {
    name: Option<&'a str>,
    defined: HashSet<&'a str>,
}

/// Every variable an operation uses, through the fragments it spreads as well, must be declared by it.
#[derive(Default)]
pub(crate) struct NoUndefinedVariables<'a> {
    operations: Vec<OperationVariables<'a>>,
    used: HashMap<Scope<'a>, Vec<(&'a str, Pos)>>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> NoUndefinedVariables<'a> {
    /// Variables used in `scope` and in all the fragments reachable from it.
    fn used_variables(&self, scope: Scope<'a>, visited: &mut HashSet<&'a str>, used: &mut Vec<(&'a str, Pos)>) {
        used.extend(self.used.get(&scope).into_iter().flatten().copied());

        for &fragment in self.spreads.get(&scope).into_iter().flatten() {
            if visited.insert(fragment) {
                self.used_variables(Scope::Fragment(fragment), visited, used);
            }
        }
    }
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation_definition: &'a Positioned<OperationDefinition>,
    ) {
        let name = name.map(Name::as_str);
        self.current_scope = Some(Scope::Operation(name));
        self.operations.push(OperationVariables {
            name,
            defined: operation_definition
                .node
                .variable_definitions
                .iter()
                .map(|variable| variable.node.name.node.as_str())
                .collect(),
        });
    }

    fn exit_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: Option<&'a Name>,
        _operation_definition: &'a Positioned<OperationDefinition>,
    ) {
        self.current_scope = None;
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        _fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_scope = Some(Scope::Fragment(name.as_str()));
    }

    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        _fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_scope = None;
    }

    fn enter_argument(&mut self, _ctx: &mut VisitorContext<'a>, _name: &'a Positioned<Name>, value: &'a Positioned<Value>) {
        let Some(scope) = self.current_scope else {
            return;
        };
        self.used.entry(scope).or_default().extend(
            referenced_variables(&value.node)
                .into_iter()
                .map(|variable| (variable.as_str(), value.pos)),
        );
    }

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, fragment_spread: &'a Positioned<FragmentSpread>) {
        if let Some(scope) = self.current_scope {
            self.spreads
                .entry(scope)
                .or_default()
                .push(fragment_spread.node.fragment_name.node.as_str());
        }
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a ExecutableDocument) {
        for operation in &self.operations {
            let mut used = Vec::new();
            self.used_variables(Scope::Operation(operation.name), &mut HashSet::new(), &mut used);

            let mut reported = HashSet::new();
            for (variable, pos) in used {
                if operation.defined.contains(variable) || !reported.insert(variable) {
                    continue;
                }
                let message = match operation.name {
                    Some(name) => format!(r#"Variable "${variable}" is not defined by operation "{name}"."#),
                    None => format!(r#"Variable "${variable}" is not defined."#),
                };
                ctx.report_error(vec![pos], message);
            }
        }
    }
}
