use std::{collections::HashMap, fmt};

use async_graphql_parser::{
    types::{
        Directive, ExecutableDocument, Field, FragmentDefinition, FragmentSpread, InlineFragment, OperationDefinition,
        OperationType, Selection, SelectionSet, VariableDefinition,
    },
    Pos, Positioned,
};
use async_graphql_value::{Name, Value};

use crate::{
    registry::{MetaType, Registry},
    ErrorCode, ServerError,
};

pub(crate) struct VisitorContext<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) errors: Vec<RuleError>,
    pub(crate) fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    type_stack: Vec<Option<&'a MetaType>>,
}

impl<'a> VisitorContext<'a> {
    pub(crate) fn new(registry: &'a Registry, doc: &'a ExecutableDocument) -> Self {
        Self {
            registry,
            errors: Vec::new(),
            fragments: &doc.fragments,
            type_stack: Vec::new(),
        }
    }

    pub(crate) fn report_error(&mut self, locations: Vec<Pos>, msg: impl Into<String>) {
        self.errors.push(RuleError::new(locations, msg));
    }

    pub(crate) fn append_errors(&mut self, errors: Vec<RuleError>) {
        self.errors.extend(errors);
    }

    pub(crate) fn with_type<F: FnMut(&mut VisitorContext<'a>)>(&mut self, ty: Option<&'a MetaType>, mut f: F) {
        self.type_stack.push(ty);
        f(self);
        self.type_stack.pop();
    }

    /// The type owning the selections being visited, `None` when it could not be determined.
    pub(crate) fn current_type(&self) -> Option<&'a MetaType> {
        self.type_stack.last().copied().flatten()
    }

    pub(crate) fn root_type(&self, operation_type: OperationType) -> Option<&'a MetaType> {
        let registry = self.registry;
        let root = match operation_type {
            OperationType::Query => Some(registry.query_type()),
            OperationType::Mutation => registry.mutation_type(),
            OperationType::Subscription => None,
        };
        root.and_then(|object| registry.lookup_type(&object.name))
    }
}

#[allow(unused_variables)]
pub(crate) trait Visitor<'a> {
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {}
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {}

    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation_definition: &'a Positioned<OperationDefinition>,
    ) {
    }
    fn exit_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation_definition: &'a Positioned<OperationDefinition>,
    ) {
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        fragment_definition: &'a Positioned<FragmentDefinition>,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {}
    fn exit_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {}

    fn enter_argument(&mut self, ctx: &mut VisitorContext<'a>, name: &'a Positioned<Name>, value: &'a Positioned<Value>) {
    }

    fn enter_selection_set(&mut self, ctx: &mut VisitorContext<'a>, selection_set: &'a Positioned<SelectionSet>) {}
    fn exit_selection_set(&mut self, ctx: &mut VisitorContext<'a>, selection_set: &'a Positioned<SelectionSet>) {}

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {}
    fn exit_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {}

    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, fragment_spread: &'a Positioned<FragmentSpread>) {}

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline_fragment: &'a Positioned<InlineFragment>) {
    }
    fn exit_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline_fragment: &'a Positioned<InlineFragment>) {
    }
}

/// Empty visitor, the start of a chain built with [`VisitorNil::with`].
pub(crate) struct VisitorNil;

impl VisitorNil {
    pub(crate) fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

impl<'a> Visitor<'a> for VisitorNil {}

/// Two visitors run one after the other on every node.
pub(crate) struct VisitorCons<A, B>(A, B);

impl<A, B> VisitorCons<A, B> {
    pub(crate) fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

macro_rules! forward {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, ctx: &mut VisitorContext<'a>, $($arg: $ty),*) {
                self.1.$name(ctx, $($arg),*);
                self.0.$name(ctx, $($arg),*);
            }
        )*
    };
}

impl<'a, A: Visitor<'a>, B: Visitor<'a>> Visitor<'a> for VisitorCons<A, B> {
    forward! {
        enter_document(doc: &'a ExecutableDocument);
        exit_document(doc: &'a ExecutableDocument);
        enter_operation_definition(name: Option<&'a Name>, operation_definition: &'a Positioned<OperationDefinition>);
        exit_operation_definition(name: Option<&'a Name>, operation_definition: &'a Positioned<OperationDefinition>);
        enter_fragment_definition(name: &'a Name, fragment_definition: &'a Positioned<FragmentDefinition>);
        exit_fragment_definition(name: &'a Name, fragment_definition: &'a Positioned<FragmentDefinition>);
        enter_variable_definition(variable_definition: &'a Positioned<VariableDefinition>);
        enter_directive(directive: &'a Positioned<Directive>);
        exit_directive(directive: &'a Positioned<Directive>);
        enter_argument(name: &'a Positioned<Name>, value: &'a Positioned<Value>);
        enter_selection_set(selection_set: &'a Positioned<SelectionSet>);
        exit_selection_set(selection_set: &'a Positioned<SelectionSet>);
        enter_field(field: &'a Positioned<Field>);
        exit_field(field: &'a Positioned<Field>);
        enter_fragment_spread(fragment_spread: &'a Positioned<FragmentSpread>);
        enter_inline_fragment(inline_fragment: &'a Positioned<InlineFragment>);
        exit_inline_fragment(inline_fragment: &'a Positioned<InlineFragment>);
    }
}

/// Walks `doc`, operations first and then fragments, each in document order.
pub(crate) fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
    v.enter_document(ctx, doc);

    let mut operations = doc.operations.iter().collect::<Vec<_>>();
    operations.sort_by_key(|(_, operation)| operation.pos);
    for (name, operation) in operations {
        visit_operation_definition(v, ctx, name, operation);
    }

    let mut fragments = doc.fragments.iter().collect::<Vec<_>>();
    fragments.sort_by_key(|(_, fragment)| fragment.pos);
    let registry = ctx.registry;
    for (name, fragment) in fragments {
        let ty = registry.lookup_type(fragment.node.type_condition.node.on.node.as_str());
        v.enter_fragment_definition(ctx, name, fragment);
        ctx.with_type(ty, |ctx| {
            visit_directives(v, ctx, &fragment.node.directives);
            visit_selection_set(v, ctx, &fragment.node.selection_set);
        });
        v.exit_fragment_definition(ctx, name, fragment);
    }

    v.exit_document(ctx, doc);
}

fn visit_operation_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    name: Option<&'a Name>,
    operation: &'a Positioned<OperationDefinition>,
) {
    let root = ctx.root_type(operation.node.ty);
    ctx.with_type(root, |ctx| {
        v.enter_operation_definition(ctx, name, operation);
        for variable_definition in &operation.node.variable_definitions {
            v.enter_variable_definition(ctx, variable_definition);
        }
        visit_directives(v, ctx, &operation.node.directives);
        // Without a root type there is nothing to check the selections against. Selecting the
        // operation reports it.
        if root.is_some() {
            visit_selection_set(v, ctx, &operation.node.selection_set);
        }
        v.exit_operation_definition(ctx, name, operation);
    });
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    selection_set: &'a Positioned<SelectionSet>,
) {
    if selection_set.node.items.is_empty() {
        return;
    }

    v.enter_selection_set(ctx, selection_set);
    for selection in &selection_set.node.items {
        match &selection.node {
            Selection::Field(field) => visit_field(v, ctx, field),
            Selection::FragmentSpread(fragment_spread) => {
                v.enter_fragment_spread(ctx, fragment_spread);
                visit_directives(v, ctx, &fragment_spread.node.directives);
            }
            Selection::InlineFragment(inline_fragment) => {
                let registry = ctx.registry;
                let ty = match &inline_fragment.node.type_condition {
                    Some(condition) => registry.lookup_type(condition.node.on.node.as_str()),
                    None => ctx.current_type(),
                };
                v.enter_inline_fragment(ctx, inline_fragment);
                ctx.with_type(ty, |ctx| {
                    visit_directives(v, ctx, &inline_fragment.node.directives);
                    visit_selection_set(v, ctx, &inline_fragment.node.selection_set);
                });
                v.exit_inline_fragment(ctx, inline_fragment);
            }
        }
    }
    v.exit_selection_set(ctx, selection_set);
}

fn visit_field<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
    v.enter_field(ctx, field);

    let registry = ctx.registry;
    let ty = ctx
        .current_type()
        .and_then(|parent| parent.field(field.node.name.node.as_str()))
        .map(|meta_field| registry.concrete_type(&meta_field.ty));

    ctx.with_type(ty, |ctx| {
        for (name, value) in &field.node.arguments {
            v.enter_argument(ctx, name, value);
        }
        visit_directives(v, ctx, &field.node.directives);
        visit_selection_set(v, ctx, &field.node.selection_set);
    });

    v.exit_field(ctx, field);
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    directives: &'a [Positioned<Directive>],
) {
    for directive in directives {
        v.enter_directive(ctx, directive);
        for (name, value) in &directive.node.arguments {
            v.enter_argument(ctx, name, value);
        }
        v.exit_directive(ctx, directive);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RuleError {
    pub(crate) locations: Vec<Pos>,
    pub(crate) message: String,
}

impl RuleError {
    pub(crate) fn new(locations: Vec<Pos>, msg: impl Into<String>) -> Self {
        Self {
            locations,
            message: msg.into(),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, loc) in self.locations.iter().enumerate() {
            if idx == 0 {
                write!(f, "[")?;
            } else {
                write!(f, ", ")?;
            }

            write!(f, "{}:{}", loc.line, loc.column)?;

            if idx == self.locations.len() - 1 {
                write!(f, "] ")?;
            }
        }

        write!(f, "{}", self.message)?;
        Ok(())
    }
}

impl From<RuleError> for ServerError {
    fn from(error: RuleError) -> Self {
        ServerError {
            message: error.message,
            locations: error.locations,
            path: Vec::new(),
            code: ErrorCode::OperationValidationError,
        }
    }
}
