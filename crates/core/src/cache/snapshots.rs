//! Cached collection snapshots.
//!
//! A snapshot is one upstream collection response body. It may be a full
//! collection (written by the refresher) or a single page (written on a
//! request-time cache miss); the store does not record which.

use super::connection::CacheStore;
use crate::Error;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached collection response body.
///
/// The upstream object is kept as received: key order, absent envelope
/// fields and unknown fields all survive a round trip. `count`, `next`,
/// `previous` and `results` are checked for type on the way in and read
/// through accessors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Snapshot {
    body: Map<String, Value>,
}

/// A body whose envelope fields have the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid collection body: `{field}` {reason}")]
pub struct InvalidSnapshot {
    pub field: &'static str,
    pub reason: &'static str,
}

impl TryFrom<Map<String, Value>> for Snapshot {
    type Error = InvalidSnapshot;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        match body.get("results") {
            None | Some(Value::Array(_)) => {}
            Some(_) => return Err(InvalidSnapshot { field: "results", reason: "must be an array" }),
        }
        match body.get("count") {
            None | Some(Value::Null) => {}
            Some(count) if count.is_u64() => {}
            Some(_) => return Err(InvalidSnapshot { field: "count", reason: "must be a non-negative integer" }),
        }
        for field in ["next", "previous"] {
            match body.get(field) {
                None | Some(Value::Null | Value::String(_)) => {}
                Some(_) => return Err(InvalidSnapshot { field, reason: "must be a string or null" }),
            }
        }
        Ok(Self { body })
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

impl Snapshot {
    /// Build a snapshot from a parsed upstream body.
    ///
    /// Fails if the body is not an object or its envelope fields have the
    /// wrong type (e.g. `results` is not an array).
    pub fn from_value(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(body)
    }

    /// A body holding only `results`.
    pub fn from_results(results: Vec<Value>) -> Self {
        let mut body = Map::new();
        body.insert("results".into(), Value::Array(results));
        Self { body }
    }

    /// Set a top-level field, keeping its position if it already exists.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn count(&self) -> Option<u64> {
        self.body.get("count").and_then(Value::as_u64)
    }

    pub fn next(&self) -> Option<&str> {
        self.body.get("next").and_then(Value::as_str)
    }

    pub fn previous(&self) -> Option<&str> {
        self.body.get("previous").and_then(Value::as_str)
    }

    /// Any top-level field, envelope or not.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The cached items; empty if upstream sent none.
    pub fn results(&self) -> &[Value] {
        match self.body.get("results") {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Replace `results` in place with `f(results)`.
    ///
    /// A body without `results` is left untouched.
    pub fn map_results(&mut self, f: impl FnOnce(Vec<Value>) -> Vec<Value>) {
        if let Some(Value::Array(items)) = self.body.get_mut("results") {
            let taken = std::mem::take(items);
            *items = f(taken);
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

/// Key and last write time of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResource {
    pub resource: String,
    pub updated_at: String,
}

impl CacheStore {
    /// Look up the snapshot stored under `resource`.
    ///
    /// Every call decodes a fresh copy, so callers own what they get back.
    pub async fn get(&self, resource: &str) -> Result<Option<Snapshot>, Error> {
        let key = resource.to_string();
        let body = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result =
                    conn.query_row("SELECT body FROM collections WHERE resource = ?1", params![key], |row| row.get(0));

                match result {
                    Ok(body) => Ok(Some(body)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        body.map(|body| {
            serde_json::from_str(&body)
                .map_err(|e| Error::CorruptEntry { resource: resource.to_string(), reason: e.to_string() })
        })
        .transpose()
    }

    /// Insert or replace the snapshot stored under `resource`.
    ///
    /// A single statement replaces the whole entry; concurrent writers to the
    /// same key race and the last one to commit wins.
    pub async fn put(&self, resource: &str, snapshot: &Snapshot) -> Result<(), Error> {
        if resource.is_empty() {
            return Err(Error::InvalidInput("resource key cannot be empty".into()));
        }

        let body = serde_json::to_string(snapshot)
            .map_err(|e| Error::CorruptEntry { resource: resource.to_string(), reason: e.to_string() })?;
        let key = resource.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO collections (resource, body, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(resource) DO UPDATE SET
                        body = excluded.body,
                        updated_at = excluded.updated_at",
                    params![key, body, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached resources.
    pub async fn len(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// List cached resources, ordered by key.
    pub async fn resources(&self) -> Result<Vec<CachedResource>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<CachedResource>, Error> {
                let mut stmt = conn.prepare("SELECT resource, updated_at FROM collections ORDER BY resource")?;
                let rows = stmt
                    .query_map([], |row| Ok(CachedResource { resource: row.get(0)?, updated_at: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}
