mod depth_limit;
mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;
mod no_fragment_cycles;
mod no_undefined_variables;
mod possible_fragment_spreads;
mod provided_non_null_arguments;
mod scalar_leafs;
mod variables_are_input_types;

pub(crate) use self::{
    depth_limit::DepthLimit, fields_on_correct_type::FieldsOnCorrectType,
    fragments_on_composite_types::FragmentsOnCompositeTypes, known_argument_names::KnownArgumentNames,
    known_directives::KnownDirectives, known_fragment_names::KnownFragmentNames, known_type_names::KnownTypeNames,
    no_fragment_cycles::NoFragmentCycles, no_undefined_variables::NoUndefinedVariables,
    possible_fragment_spreads::PossibleFragmentSpreads, provided_non_null_arguments::ProvidedNonNullArguments,
    scalar_leafs::ScalarLeafs, variables_are_input_types::VariablesAreInputTypes,
};

/// Directives an executable document may use, with their single `if: Boolean!` argument.
pub(crate) const SKIP: &str = "skip";
pub(crate) const INCLUDE: &str = "include";
pub(crate) const CONDITION_ARGUMENT: &str = "if";

pub(crate) fn is_known_directive(name: &str) -> bool {
    name == SKIP || name == INCLUDE
}
