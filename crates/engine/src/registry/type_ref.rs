use std::fmt;

use super::{MetaTypeId, Registry};

/// Reference to a registered type, possibly wrapped in list and non-null modifiers.
///
/// Wrapping is composable: `[Post!]!` is `NonNull(List(NonNull(Named(post))))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(MetaTypeId),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(id: MetaTypeId) -> Self {
        TypeRef::Named(id)
    }

    #[must_use]
    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Wraps the type in a non-null modifier, a no-op if it already is one.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_non_null()
    }

    /// The innermost named type.
    pub fn named_type(&self) -> MetaTypeId {
        match self {
            TypeRef::Named(id) => *id,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    /// Renders the reference in SDL notation against the registry it belongs to.
    pub fn display<'a>(&'a self, registry: &'a Registry) -> impl fmt::Display + 'a {
        TypeRefDisplay { ty: self, registry }
    }
}

struct TypeRefDisplay<'a> {
    ty: &'a TypeRef,
    registry: &'a Registry,
}

impl fmt::Display for TypeRefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            TypeRef::Named(id) => f.write_str(self.registry.name_of(*id)),
            TypeRef::List(inner) => write!(f, "[{}]", inner.display(self.registry)),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner.display(self.registry)),
        }
    }
}
