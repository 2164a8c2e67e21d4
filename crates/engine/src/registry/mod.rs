//! The type graph a [`Schema`](crate::Schema) executes against.
//!
//! Types are referenced through [`MetaTypeId`] handles rather than owned pointers, so a type may
//! refer to itself or to types declared after it (`User.userSubscribedTo: [User!]`). A
//! [`RegistryBuilder`] hands out handles first and accepts definitions in a second pass.

use std::{collections::HashMap, num::NonZeroU32};

use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use strum::IntoEnumIterator;

pub mod resolvers;
pub mod scalars;
mod type_ref;

use self::{resolvers::Resolver, scalars::ScalarKind};
pub use self::type_ref::TypeRef;

/// Handle of a type inside a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaTypeId(NonZeroU32);

impl MetaTypeId {
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).ok().and_then(NonZeroU32::new);
        // A registry holds a handful of types, this only fails past u32::MAX of them.
        MetaTypeId(raw.unwrap_or(NonZeroU32::MAX))
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Type {0} is declared more than once")]
    DuplicateType(String),
    #[error("Type {0} was declared but never defined")]
    UndefinedType(String),
    #[error("Type {0} is already defined")]
    AlreadyDefined(String),
    #[error("Type {declared} cannot be defined with a definition named {defined}")]
    NameMismatch { declared: String, defined: String },
    #[error("Unknown type {0}")]
    UnknownType(String),
    #[error("{location} must be an output type but {ty} is an input object")]
    NotAnOutputType { location: String, ty: String },
    #[error("{location} must be an input type but {ty} is an object")]
    NotAnInputType { location: String, ty: String },
    #[error("The {root} root type {ty} must be an object type")]
    InvalidRoot { root: &'static str, ty: String },
    #[error("The schema has no query root type")]
    MissingQueryRoot,
}

#[derive(Debug)]
pub enum MetaType {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType),
    InputObject(InputObjectType),
}

impl MetaType {
    pub fn name(&self) -> &str {
        match self {
            MetaType::Scalar(scalar) => &scalar.name,
            MetaType::Enum(enum_type) => &enum_type.name,
            MetaType::Object(object) => &object.name,
            MetaType::InputObject(input_object) => &input_object.name,
        }
    }

    pub fn is_input(&self) -> bool {
        !matches!(self, MetaType::Object(_))
    }

    pub fn is_output(&self) -> bool {
        !matches!(self, MetaType::InputObject(_))
    }

    /// Scalars and enums, which must not have a selection set.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MetaType::Scalar(_) | MetaType::Enum(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            MetaType::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&MetaField> {
        self.as_object().and_then(|object| object.field(name))
    }
}

#[derive(Debug)]
pub struct ScalarType {
    pub name: String,
    pub kind: ScalarKind,
}

/// Symbolic names mapped to the internal values resolvers see and produce.
#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub values: IndexMap<String, serde_json::Value>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn value(mut self, name: impl Into<String>, internal: impl Into<serde_json::Value>) -> Self {
        self.values.insert(name.into(), internal.into());
        self
    }

    pub fn internal_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    pub fn name_of(&self, internal: &serde_json::Value) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, value)| *value == internal)
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, MetaField>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&MetaField> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn with_field(mut self, field: MetaField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

#[derive(Debug)]
pub struct InputObjectType {
    pub name: String,
    pub fields: IndexMap<String, MetaInputValue>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: MetaInputValue) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

#[derive(Debug)]
pub struct MetaField {
    pub name: String,
    pub ty: TypeRef,
    pub args: IndexMap<String, MetaInputValue>,
    pub resolver: Resolver,
}

impl MetaField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            args: IndexMap::new(),
            resolver: Resolver::Parent,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: MetaInputValue) -> Self {
        self.args.insert(arg.name.clone(), arg);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }
}

/// An argument or an input object field.
#[derive(Debug)]
pub struct MetaInputValue {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<ConstValue>,
}

impl MetaInputValue {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default_value: ConstValue) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

impl From<ScalarType> for MetaType {
    fn from(scalar: ScalarType) -> Self {
        MetaType::Scalar(scalar)
    }
}

impl From<EnumType> for MetaType {
    fn from(enum_type: EnumType) -> Self {
        MetaType::Enum(enum_type)
    }
}

impl From<ObjectType> for MetaType {
    fn from(object: ObjectType) -> Self {
        MetaType::Object(object)
    }
}

impl From<InputObjectType> for MetaType {
    fn from(input_object: InputObjectType) -> Self {
        MetaType::InputObject(input_object)
    }
}

/// The finished, immutable type graph.
#[derive(Debug)]
pub struct Registry {
    types: Vec<MetaType>,
    names: HashMap<String, MetaTypeId>,
    query_type: MetaTypeId,
    mutation_type: Option<MetaTypeId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, id: MetaTypeId) -> &MetaType {
        &self.types[id.index()]
    }

    pub fn id_of(&self, name: &str) -> Option<MetaTypeId> {
        self.names.get(name).copied()
    }

    pub fn lookup_type(&self, name: &str) -> Option<&MetaType> {
        self.id_of(name).map(|id| self.get(id))
    }

    pub fn name_of(&self, id: MetaTypeId) -> &str {
        self.get(id).name()
    }

    pub fn concrete_type(&self, ty: &TypeRef) -> &MetaType {
        self.get(ty.named_type())
    }

    pub fn query_type(&self) -> &ObjectType {
        self.object(self.query_type)
    }

    pub fn mutation_type(&self) -> Option<&ObjectType> {
        self.mutation_type.map(|id| self.object(id))
    }

    /// Converts a type written in a document (a variable definition) into a registry reference.
    pub fn resolve_type(&self, ty: &async_graphql_parser::types::Type) -> Option<TypeRef> {
        use async_graphql_parser::types::BaseType;

        let base = match &ty.base {
            BaseType::Named(name) => TypeRef::Named(self.id_of(name)?),
            BaseType::List(inner) => self.resolve_type(inner)?.list(),
        };
        Some(if ty.nullable { base } else { base.non_null() })
    }

    pub fn types(&self) -> impl Iterator<Item = &MetaType> {
        self.types.iter()
    }

    fn object(&self, id: MetaTypeId) -> &ObjectType {
        match self.get(id) {
            MetaType::Object(object) => object,
            // Checked in `RegistryBuilder::finish`.
            _ => unreachable!("root types are objects"),
        }
    }
}

/// Builds a [`Registry`] in two passes: `declare` every type, then `define` each handle.
///
/// Built-in scalars are declared and defined from the start.
pub struct RegistryBuilder {
    slots: Vec<(String, Option<MetaType>)>,
    names: HashMap<String, MetaTypeId>,
    query_type: Option<MetaTypeId>,
    mutation_type: Option<MetaTypeId>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            slots: Vec::new(),
            names: HashMap::new(),
            query_type: None,
            mutation_type: None,
        };

        for kind in ScalarKind::iter() {
            let id = MetaTypeId::from_index(builder.slots.len());
            let name = kind.name().to_string();
            builder.names.insert(name.clone(), id);
            builder.slots.push((name.clone(), Some(MetaType::Scalar(ScalarType { name, kind }))));
        }

        builder
    }

    /// Reserves a handle for the type `name`.
    pub fn declare(&mut self, name: impl Into<String>) -> Result<MetaTypeId, RegistryError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }
        let id = MetaTypeId::from_index(self.slots.len());
        self.names.insert(name.clone(), id);
        self.slots.push((name, None));
        Ok(id)
    }

    /// Attaches the definition of a declared type.
    pub fn define(&mut self, id: MetaTypeId, ty: impl Into<MetaType>) -> Result<(), RegistryError> {
        let ty = ty.into();
        let (declared, slot) = &mut self.slots[id.index()];
        if slot.is_some() {
            return Err(RegistryError::AlreadyDefined(declared.clone()));
        }
        if declared != ty.name() {
            return Err(RegistryError::NameMismatch {
                declared: declared.clone(),
                defined: ty.name().to_string(),
            });
        }
        *slot = Some(ty);
        Ok(())
    }

    /// Declares and defines in one go, for types nothing refers to before they exist.
    pub fn register(&mut self, ty: impl Into<MetaType>) -> Result<MetaTypeId, RegistryError> {
        let ty = ty.into();
        let id = self.declare(ty.name())?;
        self.define(id, ty)?;
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Result<MetaTypeId, RegistryError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    /// Shorthand for a reference to an already declared type.
    pub fn named(&self, name: &str) -> Result<TypeRef, RegistryError> {
        self.id_of(name).map(TypeRef::Named)
    }

    pub fn set_query_type(&mut self, id: MetaTypeId) {
        self.query_type = Some(id);
    }

    pub fn set_mutation_type(&mut self, id: MetaTypeId) {
        self.mutation_type = Some(id);
    }

    pub fn finish(self) -> Result<Registry, RegistryError> {
        let types = self
            .slots
            .into_iter()
            .map(|(name, ty)| ty.ok_or(RegistryError::UndefinedType(name)))
            .collect::<Result<Vec<_>, _>>()?;

        let registry = Registry {
            types,
            names: self.names,
            query_type: self.query_type.ok_or(RegistryError::MissingQueryRoot)?,
            mutation_type: self.mutation_type,
        };
        registry.check()?;
        Ok(registry)
    }
}

impl Registry {
    fn check(&self) -> Result<(), RegistryError> {
        let roots = std::iter::once(("query", self.query_type)).chain(self.mutation_type.map(|id| ("mutation", id)));
        for (root, id) in roots {
            if self.get(id).as_object().is_none() {
                return Err(RegistryError::InvalidRoot {
                    root,
                    ty: self.name_of(id).to_string(),
                });
            }
        }

        for ty in &self.types {
            match ty {
                MetaType::Object(object) => {
                    for field in object.fields.values() {
                        if !self.concrete_type(&field.ty).is_output() {
                            return Err(RegistryError::NotAnOutputType {
                                location: format!("{}.{}", object.name, field.name),
                                ty: self.name_of(field.ty.named_type()).to_string(),
                            });
                        }
                        for arg in field.args.values() {
                            self.check_input(&arg.ty, || format!("{}.{}({}:)", object.name, field.name, arg.name))?;
                        }
                    }
                }
                MetaType::InputObject(input_object) => {
                    for field in input_object.fields.values() {
                        self.check_input(&field.ty, || format!("{}.{}", input_object.name, field.name))?;
                    }
                }
                MetaType::Scalar(_) | MetaType::Enum(_) => {}
            }
        }

        Ok(())
    }

    fn check_input(&self, ty: &TypeRef, location: impl FnOnce() -> String) -> Result<(), RegistryError> {
        if self.concrete_type(ty).is_input() {
            Ok(())
        } else {
            Err(RegistryError::NotAnInputType {
                location: location(),
                ty: self.name_of(ty.named_type()).to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_referencing_types() {
        let mut builder = RegistryBuilder::new();
        let user = builder.declare("User").unwrap();
        let query = builder.declare("Query").unwrap();

        let users = TypeRef::named(user).non_null().list();
        builder
            .define(
                user,
                ObjectType::new("User")
                    .with_field(MetaField::new("name", builder.named("String").unwrap().non_null()))
                    .with_field(MetaField::new("friends", users.clone())),
            )
            .unwrap();
        builder
            .define(query, ObjectType::new("Query").with_field(MetaField::new("users", users)))
            .unwrap();
        builder.set_query_type(query);

        let registry = builder.finish().unwrap();
        let friends = registry.get(user).field("friends").unwrap();
        assert_eq!(friends.ty.display(&registry).to_string(), "[User!]");
        assert_eq!(friends.ty.named_type(), user);
        assert_eq!(registry.query_type().name, "Query");
        assert!(registry.mutation_type().is_none());
    }

    #[test]
    fn builtin_scalars_are_registered() {
        let mut builder = RegistryBuilder::new();
        let query = builder
            .register(ObjectType::new("Query").with_field(MetaField::new("ok", builder.named("Boolean").unwrap())))
            .unwrap();
        builder.set_query_type(query);
        let registry = builder.finish().unwrap();

        for name in ["String", "Int", "Float", "Boolean", "ID", "UUID"] {
            assert!(
                matches!(registry.lookup_type(name), Some(MetaType::Scalar(_))),
                "{name} is missing"
            );
        }
    }

    #[test]
    fn declared_types_must_be_defined() {
        let mut builder = RegistryBuilder::new();
        let query = builder.declare("Query").unwrap();
        builder.set_query_type(query);
        assert_eq!(
            builder.finish().unwrap_err(),
            RegistryError::UndefinedType("Query".to_string())
        );
    }

    #[test]
    fn declaration_errors() {
        let mut builder = RegistryBuilder::new();
        assert_eq!(
            builder.declare("String").unwrap_err(),
            RegistryError::DuplicateType("String".to_string())
        );

        let query = builder.declare("Query").unwrap();
        assert_eq!(
            builder.define(query, ObjectType::new("Mutation")).unwrap_err(),
            RegistryError::NameMismatch {
                declared: "Query".to_string(),
                defined: "Mutation".to_string()
            }
        );
        builder.define(query, ObjectType::new("Query")).unwrap();
        assert_eq!(
            builder.define(query, ObjectType::new("Query")).unwrap_err(),
            RegistryError::AlreadyDefined("Query".to_string())
        );

        assert_eq!(builder.finish().unwrap_err(), RegistryError::MissingQueryRoot);
    }

    #[test]
    fn inputs_and_outputs_are_checked() {
        let mut builder = RegistryBuilder::new();
        let input = builder
            .register(InputObjectType::new("UserInput").with_field(MetaInputValue::new(
                "name",
                builder.named("String").unwrap(),
            )))
            .unwrap();
        let query = builder
            .register(ObjectType::new("Query").with_field(MetaField::new("user", TypeRef::named(input))))
            .unwrap();
        builder.set_query_type(query);

        assert_eq!(
            builder.finish().unwrap_err(),
            RegistryError::NotAnOutputType {
                location: "Query.user".to_string(),
                ty: "UserInput".to_string()
            }
        );
    }
}
