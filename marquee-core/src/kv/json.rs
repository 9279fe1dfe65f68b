use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use super::KeyValueStore;
use crate::error::{Result, StoreError};

/// Parse the document at `key`, or `None` when absent or not JSON at all.
async fn load_value(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Value>> {
    let Some(raw) = kv.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(key, error = %err, "discarding malformed document");
            Ok(None)
        }
    }
}

/// Load the JSON document at `key` as `T`.
///
/// An absent key and text that is not JSON both yield `T::default()`. A
/// document that is valid JSON but does not fit `T` is an error, so a
/// mutation never replaces data it could not type.
pub(crate) async fn load_or_default<T>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match load_value(kv, key).await? {
        Some(value) => serde_json::from_value(value).map_err(|err| {
            StoreError::Corrupted(format!("unexpected shape at {key}: {err}"))
        }),
        None => Ok(T::default()),
    }
}

/// Like [`load_or_default`] but also swallows failures.
pub(crate) async fn read_or_default<T>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> T
where
    T: DeserializeOwned + Default,
{
    match load_or_default(kv, key).await {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "read failed, using empty value");
            T::default()
        }
    }
}

/// Load a JSON array with its elements left untyped, so elements in
/// shapes this crate does not model survive a rewrite.
pub(crate) async fn load_array(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<Value>> {
    match load_value(kv, key).await? {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(StoreError::Corrupted(format!(
            "expected an array at {key}, found {}",
            json_kind(&other)
        ))),
        None => Ok(Vec::new()),
    }
}

/// Elements of `items` that fit `T`; the rest are skipped.
pub(crate) fn typed<T: DeserializeOwned>(items: &[Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| T::deserialize(item).ok())
        .collect()
}

/// Array at `key` viewed as `T`, empty on any failure.
pub(crate) async fn read_items<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Vec<T> {
    match load_array(kv, key).await {
        Ok(items) => typed(&items),
        Err(err) => {
            warn!(key, error = %err, "read failed, using empty list");
            Vec::new()
        }
    }
}

pub(crate) async fn save<T>(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    kv.set(key, &raw).await
}

/// Turn a failed mutation into `None`, logging it under `op`.
pub(crate) fn logged<T>(
    op: &'static str,
    key: &str,
    result: Result<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(op, key, error = %err, "storage operation failed");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryStore, MockKeyValueStore};

    #[tokio::test]
    async fn unparseable_text_is_treated_as_absent() {
        let kv = MemoryStore::new();
        kv.set("favorites:a", "{not json").await.unwrap();

        let list: Vec<u64> =
            load_or_default(&kv, "favorites:a").await.unwrap();
        assert!(list.is_empty());
        assert!(load_array(&kv, "favorites:a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_json_of_another_shape_is_an_error() {
        let kv = MemoryStore::new();
        kv.set("ids", r#"[1, "two"]"#).await.unwrap();
        kv.set("obj", r#"{"id": 1}"#).await.unwrap();

        let typed_load: Result<Vec<u64>> = load_or_default(&kv, "ids").await;
        assert!(matches!(typed_load, Err(StoreError::Corrupted(_))));
        assert!(matches!(
            load_array(&kv, "obj").await,
            Err(StoreError::Corrupted(_))
        ));

        let raw = load_array(&kv, "ids").await.unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(typed::<u64>(&raw), vec![1]);
    }

    #[tokio::test]
    async fn backend_failure_propagates_from_load_only() {
        let mut kv = MockKeyValueStore::new();
        kv.expect_get()
            .returning(|_| Err(StoreError::Backend("disk gone".into())));

        let loaded: Result<Vec<u64>> = load_or_default(&kv, "k").await;
        assert!(loaded.is_err());
        assert!(load_array(&kv, "k").await.is_err());

        let read: Vec<u64> = read_or_default(&kv, "k").await;
        assert!(read.is_empty());
        assert!(read_items::<u64>(&kv, "k").await.is_empty());
    }
}
