//! `Storage` trait — the key-value capability shared by the assessment and
//! the dialogue.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

/// Backend-agnostic async key-value store.
///
/// Values are opaque text; callers encode structured data as JSON through
/// [`read_json`] and [`write_json`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn write(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
}

/// Read and decode a JSON value. A present but undecodable value is an error.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn Storage,
    key: &str,
) -> Result<Option<T>, DatabaseError> {
    match store.read(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DatabaseError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Encode a value as JSON and store it.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), DatabaseError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| DatabaseError::Serialization(format!("{key}: {e}")))?;
    store.write(key, &raw).await
}
