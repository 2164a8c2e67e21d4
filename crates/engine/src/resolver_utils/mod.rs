//! Utilities for implementing the resolve tree-walk.

mod container;
mod field;
mod list;

pub use container::{resolve_root_container, resolve_root_container_serial};
use container::resolve_container;
use field::complete_value;
use list::resolve_list;

/// A non-null field failed and the closest nullable ancestor has to become null.
///
/// The error itself is recorded in the request errors where it is detected, so the response
/// lists errors in the order they happened whatever the nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPropagation;

pub type ResolveResult<T> = Result<T, ErrorPropagation>;
