use std::fmt;

/// A single row as seen by the engine: a JSON object keyed by field name.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize, strum::Display)]
pub enum EntityKind {
    MemberType,
    Post,
    Profile,
    User,
    /// Junction relation between a subscriber and the author it follows.
    /// Rows are `{ subscriberId, authorId }`.
    Subscription,
}

/// Identifies exactly one record of an entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(String),
    Subscription { subscriber_id: String, author_id: String },
}

impl RecordKey {
    pub fn id(id: impl Into<String>) -> Self {
        RecordKey::Id(id.into())
    }

    pub fn subscription(subscriber_id: impl Into<String>, author_id: impl Into<String>) -> Self {
        RecordKey::Subscription {
            subscriber_id: subscriber_id.into(),
            author_id: author_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => f.write_str(id),
            RecordKey::Subscription {
                subscriber_id,
                author_id,
            } => write!(f, "{subscriber_id}->{author_id}"),
        }
    }
}

/// Predicates relation resolvers use with `find_many`.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// `record[field] == value`
    Equals { field: &'static str, value: serde_json::Value },
    /// Records whose `id` appears as `target` in a `junction` row where `via == key`.
    Related {
        junction: EntityKind,
        via: &'static str,
        target: &'static str,
        key: String,
    },
}

impl Filter {
    pub fn equals(field: &'static str, value: impl Into<serde_json::Value>) -> Self {
        Filter::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn related(junction: EntityKind, via: &'static str, target: &'static str, key: impl Into<String>) -> Self {
        Filter::Related {
            junction,
            via,
            target,
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("{kind} with key {key} was not found")]
    NotFound { kind: EntityKind, key: RecordKey },
    #[error("{kind} with key {key} already exists")]
    Conflict { kind: EntityKind, key: RecordKey },
    #[error("{kind}.{field} cannot be null")]
    NullField { kind: EntityKind, field: String },
    #[error("Data access error: {0}")]
    Backend(String),
}

/// The persistence collaborator the field resolvers call into.
///
/// Implementations own whatever locking their storage needs, the engine never synchronises around it.
#[async_trait::async_trait]
pub trait DataAccess: Send + Sync {
    async fn find_many(&self, kind: EntityKind, filter: Option<Filter>) -> DataResult<Vec<Record>>;

    /// A missing record is `Ok(None)`, not an error.
    async fn find_unique(&self, kind: EntityKind, key: RecordKey) -> DataResult<Option<Record>>;

    async fn create(&self, kind: EntityKind, data: Record) -> DataResult<Record>;

    /// Merges `data` into the existing record and returns the result.
    async fn update(&self, kind: EntityKind, key: RecordKey, data: Record) -> DataResult<Record>;

    /// Returns the removed record.
    async fn delete(&self, kind: EntityKind, key: RecordKey) -> DataResult<Record>;
}
