use std::collections::HashMap;

use futures_util::lock::Mutex;
use indexmap::IndexMap;
use runtime::{DataAccess, DataError, DataResult, EntityKind, Filter, Record, RecordKey};
use serde_json::Value;

/// Keeps every entity kind in an insertion-ordered table behind a single async mutex.
///
/// Foreign keys and required columns are checked on write and deleting a user cascades to its
/// posts, profile and subscriptions. Identifiers are compared without regard to case.
pub struct InMemoryDataAccess {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<EntityKind, IndexMap<RecordKey, Record>>,
}

impl InMemoryDataAccess {
    /// An instance holding only the two member tiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// An instance with no rows at all, not even member tiers.
    pub fn empty() -> Self {
        InMemoryDataAccess {
            inner: Mutex::new(Tables::default()),
        }
    }
}

impl Default for InMemoryDataAccess {
    fn default() -> Self {
        let mut tables = Tables::default();
        for (id, discount, posts_limit_per_month) in [("basic", 2.3, 12), ("business", 7.7, 100)] {
            let mut record = Record::new();
            record.insert("id".into(), id.into());
            record.insert("discount".into(), discount.into());
            record.insert("postsLimitPerMonth".into(), posts_limit_per_month.into());
            tables.table_mut(EntityKind::MemberType).insert(RecordKey::id(id), record);
        }
        InMemoryDataAccess {
            inner: Mutex::new(tables),
        }
    }
}

fn foreign_keys(kind: EntityKind) -> &'static [(&'static str, EntityKind)] {
    match kind {
        EntityKind::MemberType | EntityKind::User => &[],
        EntityKind::Post => &[("authorId", EntityKind::User)],
        EntityKind::Profile => &[("userId", EntityKind::User), ("memberTypeId", EntityKind::MemberType)],
        EntityKind::Subscription => &[("subscriberId", EntityKind::User), ("authorId", EntityKind::User)],
    }
}

/// Columns that never hold null.
fn required_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::MemberType => &["id", "discount", "postsLimitPerMonth"],
        EntityKind::Post => &["title", "content", "authorId"],
        EntityKind::Profile => &["isMale", "yearOfBirth", "userId", "memberTypeId"],
        EntityKind::User => &["name", "balance"],
        EntityKind::Subscription => &["subscriberId", "authorId"],
    }
}

/// Stored identifiers are lowercase, whatever case the caller used.
fn normalize_key(key: RecordKey) -> RecordKey {
    match key {
        RecordKey::Id(id) => RecordKey::Id(id.to_lowercase()),
        RecordKey::Subscription {
            subscriber_id,
            author_id,
        } => RecordKey::subscription(subscriber_id.to_lowercase(), author_id.to_lowercase()),
    }
}

fn normalize_foreign_keys(kind: EntityKind, record: &mut Record) {
    for (field, _) in foreign_keys(kind) {
        if let Some(Value::String(id)) = record.get_mut(*field) {
            *id = id.to_lowercase();
        }
    }
}

/// With `partial`, only the columns present in `record` are checked.
fn check_required(kind: EntityKind, record: &Record, partial: bool) -> DataResult<()> {
    for &field in required_fields(kind) {
        let missing = match record.get(field) {
            Some(Value::Null) => true,
            Some(_) => false,
            None => !partial,
        };
        if missing {
            return Err(DataError::NullField {
                kind,
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn string_field(record: &Record, field: &str) -> DataResult<String> {
    match record.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(DataError::Backend(format!("field {field} must be a string"))),
    }
}

impl Tables {
    fn table(&self, kind: EntityKind) -> impl Iterator<Item = &Record> {
        self.rows.get(&kind).into_iter().flat_map(IndexMap::values)
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut IndexMap<RecordKey, Record> {
        self.rows.entry(kind).or_default()
    }

    fn contains(&self, kind: EntityKind, key: &RecordKey) -> bool {
        self.rows.get(&kind).is_some_and(|table| table.contains_key(key))
    }

    fn check_foreign_keys(&self, kind: EntityKind, record: &Record) -> DataResult<()> {
        for &(field, target) in foreign_keys(kind) {
            let Some(value) = record.get(field) else {
                continue;
            };
            let key = match value {
                Value::String(id) => RecordKey::id(id.as_str()),
                _ => return Err(DataError::Backend(format!("field {field} must be a string"))),
            };
            if !self.contains(target, &key) {
                return Err(DataError::NotFound { kind: target, key });
            }
        }
        Ok(())
    }

    fn matches(&self, record: &Record, filter: &Filter) -> bool {
        match filter {
            Filter::Equals { field, value } => record.get(*field) == Some(value),
            Filter::Related {
                junction,
                via,
                target,
                key,
            } => {
                let Some(Value::String(id)) = record.get("id") else {
                    return false;
                };
                self.table(*junction).any(|row| {
                    row.get(*via).and_then(Value::as_str) == Some(key.as_str())
                        && row.get(*target).and_then(Value::as_str) == Some(id.as_str())
                })
            }
        }
    }

    fn remove_where(&mut self, kind: EntityKind, predicate: impl Fn(&Record) -> bool) -> Vec<Record> {
        let table = self.table_mut(kind);
        let doomed = table
            .iter()
            .filter(|(_, record)| predicate(record))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        doomed.iter().filter_map(|key| table.shift_remove(key)).collect()
    }

    fn cascade_user(&mut self, user_id: &str) {
        let is_user = |field: &'static str| move |record: &Record| record.get(field).and_then(Value::as_str) == Some(user_id);

        let removed_subscriptions = self.remove_where(EntityKind::Subscription, |record| {
            is_user("subscriberId")(record) || is_user("authorId")(record)
        });
        let removed_posts = self.remove_where(EntityKind::Post, is_user("authorId"));
        let removed_profiles = self.remove_where(EntityKind::Profile, is_user("userId"));

        tracing::debug!(
            user_id,
            subscriptions = removed_subscriptions.len(),
            posts = removed_posts.len(),
            profiles = removed_profiles.len(),
            "cascaded user deletion"
        );
    }
}

#[async_trait::async_trait]
impl DataAccess for InMemoryDataAccess {
    async fn find_many(&self, kind: EntityKind, filter: Option<Filter>) -> DataResult<Vec<Record>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .table(kind)
            .filter(|record| match &filter {
                Some(filter) => inner.matches(record, filter),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn find_unique(&self, kind: EntityKind, key: RecordKey) -> DataResult<Option<Record>> {
        let key = normalize_key(key);
        let inner = self.inner.lock().await;
        Ok(inner.rows.get(&kind).and_then(|table| table.get(&key)).cloned())
    }

    async fn create(&self, kind: EntityKind, mut data: Record) -> DataResult<Record> {
        check_required(kind, &data, false)?;
        normalize_foreign_keys(kind, &mut data);

        let mut inner = self.inner.lock().await;
        inner.check_foreign_keys(kind, &data)?;

        let (key, record) = match kind {
            EntityKind::Subscription => {
                let key = RecordKey::subscription(
                    string_field(&data, "subscriberId")?,
                    string_field(&data, "authorId")?,
                );
                (key, data)
            }
            EntityKind::MemberType => (normalize_key(RecordKey::id(string_field(&data, "id")?)), data),
            EntityKind::Post | EntityKind::Profile | EntityKind::User => {
                let id = uuid::Uuid::new_v4().to_string();
                let mut record = Record::new();
                record.insert("id".into(), Value::String(id.clone()));
                record.extend(data.into_iter().filter(|(field, _)| field != "id"));
                (RecordKey::Id(id), record)
            }
        };

        if inner.contains(kind, &key) {
            return Err(DataError::Conflict { kind, key });
        }
        // One profile per user.
        if kind == EntityKind::Profile {
            let user_id = record.get("userId");
            if inner.table(kind).any(|existing| existing.get("userId") == user_id) {
                return Err(DataError::Conflict { kind, key });
            }
        }

        tracing::debug!(%kind, %key, "created record");
        inner.table_mut(kind).insert(key, record.clone());
        Ok(record)
    }

    async fn update(&self, kind: EntityKind, key: RecordKey, mut data: Record) -> DataResult<Record> {
        let key = normalize_key(key);
        check_required(kind, &data, true)?;
        normalize_foreign_keys(kind, &mut data);

        let mut inner = self.inner.lock().await;
        inner.check_foreign_keys(kind, &data)?;

        let Some(record) = inner.table_mut(kind).get_mut(&key) else {
            return Err(DataError::NotFound { kind, key });
        };
        record.extend(data.into_iter().filter(|(field, _)| field != "id"));
        let record = record.clone();

        tracing::debug!(%kind, %key, "updated record");
        Ok(record)
    }

    async fn delete(&self, kind: EntityKind, key: RecordKey) -> DataResult<Record> {
        let key = normalize_key(key);
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.table_mut(kind).shift_remove(&key) else {
            return Err(DataError::NotFound { kind, key });
        };

        if kind == EntityKind::User {
            if let RecordKey::Id(user_id) = &key {
                inner.cascade_user(user_id);
            }
        }

        tracing::debug!(%kind, %key, "deleted record");
        Ok(record)
    }
}
