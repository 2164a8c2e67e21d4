//! Checks run on a parsed document before anything executes.
//!
//! Each rule is a [`Visitor`](visitor::Visitor) looking at the nodes it cares about. The rules are
//! chained and driven by a single walk over the document, all the errors they find are returned
//! together.

mod rules;
mod utils;
mod visitor;

use async_graphql_parser::types::ExecutableDocument;

pub use self::visitor::RuleError;
use self::visitor::{visit, VisitorContext, VisitorNil};
use crate::registry::Registry;

pub(crate) use self::rules::{CONDITION_ARGUMENT, INCLUDE, SKIP};

pub(crate) fn check_rules(
    registry: &Registry,
    doc: &ExecutableDocument,
    max_depth: Option<usize>,
) -> Result<(), Vec<RuleError>> {
    let mut ctx = VisitorContext::new(registry, doc);
    let mut visitor = VisitorNil
        .with(rules::FieldsOnCorrectType)
        .with(rules::KnownArgumentNames::default())
        .with(rules::ProvidedNonNullArguments)
        .with(rules::ScalarLeafs)
        .with(rules::KnownFragmentNames)
        .with(rules::KnownTypeNames)
        .with(rules::FragmentsOnCompositeTypes)
        .with(rules::PossibleFragmentSpreads)
        .with(rules::NoFragmentCycles::default())
        .with(rules::NoUndefinedVariables::default())
        .with(rules::VariablesAreInputTypes)
        .with(rules::KnownDirectives::default())
        .with(rules::DepthLimit::new(max_depth));

    visit(&mut visitor, &mut ctx, doc);

    if ctx.errors.is_empty() {
        Ok(())
    } else {
        Err(ctx.errors)
    }
}
