use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One flat JSON-array file backing a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFile {
    Tasks,
    Sessions,
    Notes,
}

impl ResourceFile {
    /// Returns the file name the resource is persisted under.
    pub fn file_name(&self) -> &'static str {
        match self {
            ResourceFile::Tasks => "tasks.json",
            ResourceFile::Sessions => "sessions.json",
            ResourceFile::Notes => "notes.json",
        }
    }
}

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Represents a filesystem read or write failure.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Represents a file whose contents are not a JSON array of records.
    #[error("Malformed data in {0}: {1}")]
    Parse(&'static str, #[source] serde_json::Error),
    /// Represents a record that could not be converted to JSON.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Represents an in-memory store whose lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Persistence capability for whole resource collections.
///
/// Every mutation is a full read-modify-write: callers `load` the complete
/// array, change it, and `save` it back. No lock is held between the two
/// calls, so concurrent writers to the same file race and the last one wins.
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    /// Loads every record of the given resource file.
    fn load(&self, file: ResourceFile) -> Result<Vec<Value>, StorageError>;

    /// Replaces the contents of the given resource file.
    fn save(&self, file: ResourceFile, records: &[Value]) -> Result<(), StorageError>;
}

/// Stores each resource as a pretty-printed JSON array inside `data_dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    data_dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the directory the resource files live in.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_of(&self, file: ResourceFile) -> PathBuf {
        self.data_dir.join(file.file_name())
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, file: ResourceFile) -> Result<Vec<Value>, StorageError> {
        let path = self.path_of(file);
        if !path.exists() {
            self.save(file, &[])?;
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|e| StorageError::Parse(file.file_name(), e))
    }

    fn save(&self, file: ResourceFile, records: &[Value]) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| StorageError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let path = self.path_of(file);
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&path, contents).map_err(|source| StorageError::Io { path, source })
    }
}

/// Keeps every resource collection in memory. Used in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<ResourceFile, Vec<Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw records currently held for a resource file.
    pub fn snapshot(&self, file: ResourceFile) -> Vec<Value> {
        self.load(file).unwrap_or_default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, file: ResourceFile) -> Result<Vec<Value>, StorageError> {
        let files = self.files.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(files.get(&file).cloned().unwrap_or_default())
    }

    fn save(&self, file: ResourceFile, records: &[Value]) -> Result<(), StorageError> {
        let mut files = self.files.lock().map_err(|_| StorageError::Poisoned)?;
        files.insert(file, records.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Record(T),
    /// A stored value that does not have the shape of `T`. Written back untouched.
    Unrecognized(Value),
}

/// A resource collection loaded for one read-modify-write cycle.
///
/// A storage or parse failure of the whole file is logged and treated as an
/// empty collection so the request can still be answered. Single records that
/// do not match `T` are logged, hidden from callers and kept verbatim, so
/// saving the collection never drops them.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    file: ResourceFile,
    entries: Vec<Entry<T>>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    #[tracing::instrument(skip(storage))]
    pub fn load(storage: &dyn Storage, file: ResourceFile) -> Self {
        let values = storage.load(file).unwrap_or_else(|err| {
            tracing::error!("Error reading {}: {}", file.file_name(), err);
            Vec::new()
        });

        let entries = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match <T as Deserialize>::deserialize(&value) {
                Ok(record) => Entry::Record(record),
                Err(err) => {
                    tracing::warn!(
                        "Skipping unrecognized record {} in {}: {}",
                        index,
                        file.file_name(),
                        err
                    );
                    Entry::Unrecognized(value)
                }
            })
            .collect();

        Self { file, entries }
    }

    /// Iterates over the recognized records in stored order.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Record(record) => Some(record),
            Entry::Unrecognized(_) => None,
        })
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(|entry| match entry {
            Entry::Record(record) => Some(record),
            Entry::Unrecognized(_) => None,
        })
    }

    pub fn into_records(self) -> Vec<T> {
        self.entries
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Record(record) => Some(record),
                Entry::Unrecognized(_) => None,
            })
            .collect()
    }

    pub fn push(&mut self, record: T) {
        self.entries.push(Entry::Record(record));
    }

    /// Removes the first recognized record matching `predicate`.
    pub fn remove_first<P>(&mut self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        let index = self
            .entries
            .iter()
            .position(|entry| matches!(entry, Entry::Record(record) if predicate(record)))?;
        match self.entries.remove(index) {
            Entry::Record(record) => Some(record),
            Entry::Unrecognized(_) => None,
        }
    }

    /// Overwrites the resource file with this collection.
    ///
    /// Failures are logged and otherwise ignored: the caller has already built
    /// its response from the in-memory collection.
    #[tracing::instrument(skip(self, storage))]
    pub fn save(&self, storage: &dyn Storage) {
        let result = self
            .entries
            .iter()
            .map(|entry| match entry {
                Entry::Record(record) => serde_json::to_value(record),
                Entry::Unrecognized(value) => Ok(value.clone()),
            })
            .collect::<Result<Vec<Value>, _>>()
            .map_err(StorageError::from)
            .and_then(|values| storage.save(self.file, &values));

        if let Err(err) = result {
            tracing::error!("Error writing {}: {}", self.file.file_name(), err);
        }
    }
}

/// Reads the recognized records of a resource collection.
pub fn read_records<T>(storage: &dyn Storage, file: ResourceFile) -> Vec<T>
where
    T: Serialize + DeserializeOwned,
{
    Collection::load(storage, file).into_records()
}
