//! Document store abstraction.
//!
//! The application only needs get/put/update/delete/query over a handful of
//! collections, with timestamps assigned by the store. Two implementations:
//! - [`MemoryStore`]: in-process maps
//! - [`JsonFileStore`]: one JSON file per collection with file locking

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Named document collections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Profiles,
    Drafts,
    Plans,
    Activities,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Profiles,
        Collection::Drafts,
        Collection::Plans,
        Collection::Activities,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::Drafts => "drafts",
            Collection::Plans => "plans",
            Collection::Activities => "activities",
        }
    }
}

/// A stored value plus store-assigned metadata
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Deserialize the document body
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Conjunction of top-level field equality tests
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, data: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }
}

/// Minimal document database interface
pub trait DocumentStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Create or replace a document; `created_at` survives replacement
    fn put(&mut self, collection: Collection, id: &str, data: Value) -> Result<Document>;

    /// Shallow-merge `patch` into an existing document; `null` removes a field
    fn update(&mut self, collection: Collection, id: &str, patch: Value) -> Result<Document>;

    /// Returns whether a document was removed
    fn delete(&mut self, collection: Collection, id: &str) -> Result<bool>;

    /// Matching documents in id order
    fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>>;
}

type Documents = BTreeMap<String, Document>;

fn put_document(docs: &mut Documents, id: &str, data: Value) -> Document {
    let now = Utc::now();
    let created_at = docs.get(id).map(|d| d.created_at).unwrap_or(now);
    let doc = Document {
        id: id.to_string(),
        data,
        created_at,
        updated_at: now,
    };
    docs.insert(id.to_string(), doc.clone());
    doc
}

fn update_document(
    docs: &mut Documents,
    collection: Collection,
    id: &str,
    patch: Value,
) -> Result<Document> {
    let Value::Object(patch) = patch else {
        return Err(Error::Store(format!(
            "patch for {} '{}' must be a JSON object",
            collection.name(),
            id
        )));
    };

    let doc = docs.get_mut(id).ok_or_else(|| Error::NotFound {
        collection: collection.name(),
        id: id.to_string(),
    })?;

    if !doc.data.is_object() {
        doc.data = Value::Object(Map::new());
    }
    if let Value::Object(fields) = &mut doc.data {
        for (key, value) in patch {
            if value.is_null() {
                fields.remove(&key);
            } else {
                fields.insert(key, value);
            }
        }
    }
    doc.updated_at = Utc::now();
    Ok(doc.clone())
}

fn query_documents(docs: &Documents, filter: &Filter) -> Vec<Document> {
    docs.values()
        .filter(|d| filter.matches(&d.data))
        .cloned()
        .collect()
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<Collection, Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn put(&mut self, collection: Collection, id: &str, data: Value) -> Result<Document> {
        let docs = self.collections.entry(collection).or_default();
        Ok(put_document(docs, id, data))
    }

    fn update(&mut self, collection: Collection, id: &str, patch: Value) -> Result<Document> {
        let docs = self.collections.entry(collection).or_default();
        update_document(docs, collection, id, patch)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get_mut(&collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }

    fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| query_documents(docs, filter))
            .unwrap_or_default())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Store keeping `<collection>.json` files under a directory
///
/// Every operation takes a lock on `<collection>.lock` (shared for reads,
/// exclusive for writes) and writes go through a temp file and rename, so
/// concurrent processes never observe a partial file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Opened document store at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn data_path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.name()))
    }

    fn lock_file(&self, collection: Collection) -> Result<File> {
        let path = self.dir.join(format!("{}.lock", collection.name()));
        Ok(OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?)
    }

    fn load(&self, collection: Collection) -> Result<Documents> {
        let path = self.data_path(collection);
        if !path.exists() {
            return Ok(Documents::new());
        }

        let mut contents = String::new();
        File::open(&path)?.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(Documents::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            Error::Store(format!(
                "{} collection at {:?} is corrupted: {}",
                collection.name(),
                path,
                e
            ))
        })
    }

    fn save(&self, collection: Collection, docs: &Documents) -> Result<()> {
        let path = self.data_path(collection);
        let temp = NamedTempFile::new_in(&self.dir)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(docs)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(
            "Saved {} {} documents to {:?}",
            docs.len(),
            collection.name(),
            path
        );
        Ok(())
    }

    fn read<T>(&self, collection: Collection, f: impl FnOnce(&Documents) -> T) -> Result<T> {
        let lock = self.lock_file(collection)?;
        lock.lock_shared()?;
        let result = self.load(collection).map(|docs| f(&docs));
        lock.unlock()?;
        result
    }

    fn write<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut Documents) -> Result<T>,
    ) -> Result<T> {
        let lock = self.lock_file(collection)?;
        lock.lock_exclusive()?;
        let result = self.load(collection).and_then(|mut docs| {
            let value = f(&mut docs)?;
            self.save(collection, &docs)?;
            Ok(value)
        });
        lock.unlock()?;
        result
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        self.read(collection, |docs| docs.get(id).cloned())
    }

    fn put(&mut self, collection: Collection, id: &str, data: Value) -> Result<Document> {
        self.write(collection, |docs| Ok(put_document(docs, id, data)))
    }

    fn update(&mut self, collection: Collection, id: &str, patch: Value) -> Result<Document> {
        self.write(collection, |docs| update_document(docs, collection, id, patch))
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<bool> {
        self.write(collection, |docs| Ok(docs.remove(id).is_some()))
    }

    fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        self.read(collection, |docs| query_documents(docs, filter))
    }
}
