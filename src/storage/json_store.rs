//! JSON file storage implementation
//!
//! The whole URL -> record mapping lives in a single `articles.json` object.
//! Every upsert rewrites the file through a temporary sibling followed by an
//! atomic rename, so the primary file is always either the old or the new
//! mapping. Each stored record is also mirrored to a plain-text file.

use crate::crawler::make_preview;
use crate::output::write_article_file;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::ArticleRecord;
use chrono::Utc;
use serde::de::{MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// File name of the primary cache mapping inside the cache directory
pub const CACHE_FILE_NAME: &str = "articles.json";

/// Suffix given to a cache file that could not be read
pub const BACKUP_SUFFIX: &str = ".bak";

const TEMP_SUFFIX: &str = ".tmp";

/// Records in insertion order with a URL index
#[derive(Debug, Default, Clone)]
struct ArticleMap {
    records: Vec<ArticleRecord>,
    index: HashMap<String, usize>,
}

impl ArticleMap {
    fn get(&self, url: &str) -> Option<&ArticleRecord> {
        self.index.get(url).map(|&i| &self.records[i])
    }

    /// Inserts or replaces in place, returning the replaced record
    fn insert(&mut self, record: ArticleRecord) -> Option<ArticleRecord> {
        match self.index.get(&record.url) {
            Some(&i) => Some(std::mem::replace(&mut self.records[i], record)),
            None => {
                self.index.insert(record.url.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    /// Undoes an `insert` of `url` that returned `previous`
    fn rollback(&mut self, url: &str, previous: Option<ArticleRecord>) {
        match previous {
            Some(record) => {
                if let Some(&i) = self.index.get(url) {
                    self.records[i] = record;
                }
            }
            None => {
                // A fresh insert is always the last element
                if self.records.last().is_some_and(|r| r.url == url) {
                    self.records.pop();
                    self.index.remove(url);
                }
            }
        }
    }
}

impl Serialize for ArticleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.records.iter().map(|r| (r.url.as_str(), r)))
    }
}

/// Top-level JSON object read entry by entry, keeping file order
struct OrderedEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping URLs to article records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// JSON file backed article store
pub struct JsonArticleStore {
    cache_dir: PathBuf,
    inner: RwLock<ArticleMap>,
}

impl JsonArticleStore {
    /// Opens the store rooted at `cache_dir`, loading any existing cache file
    ///
    /// A missing directory is created. A corrupted cache file is moved aside
    /// and the store starts empty.
    pub fn open(cache_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;

        let mut map = ArticleMap::default();
        for record in load_all(&cache_dir) {
            map.insert(record);
        }

        tracing::info!(
            "Loaded {} cached articles from {}",
            map.records.len(),
            cache_dir.display()
        );

        Ok(Self {
            cache_dir,
            inner: RwLock::new(map),
        })
    }

    /// Directory holding the cache file and the text mirror
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the primary cache file
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    fn temp_file(&self) -> PathBuf {
        self.cache_dir
            .join(format!("{}{}", CACHE_FILE_NAME, TEMP_SUFFIX))
    }

    /// Writes `map` to the temp file and renames it over the cache file
    ///
    /// The temp file is removed if any step fails.
    fn persist(&self, map: &ArticleMap) -> StorageResult<()> {
        let temp = self.temp_file();
        let result = write_then_rename(map, &temp, &self.cache_file());

        if result.is_err() {
            if let Err(e) = fs::remove_file(&temp) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::debug!("Could not remove {}: {}", temp.display(), e);
                }
            }
        }

        result
    }
}

fn write_then_rename(map: &ArticleMap, temp: &Path, primary: &Path) -> StorageResult<()> {
    let persist_err = |source: std::io::Error| StorageError::Persist {
        path: primary.to_path_buf(),
        source,
    };

    let file = File::create(temp).map_err(persist_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, map)?;
    writer.flush().map_err(persist_err)?;
    writer.get_ref().sync_all().map_err(persist_err)?;
    drop(writer);

    fs::rename(temp, primary).map_err(persist_err)?;
    Ok(())
}

impl ArticleStore for JsonArticleStore {
    fn get(&self, url: &str) -> Option<ArticleRecord> {
        let map = self.inner.read().ok()?;
        map.get(url).cloned()
    }

    fn contains(&self, url: &str) -> bool {
        self.inner
            .read()
            .map(|map| map.index.contains_key(url))
            .unwrap_or(false)
    }

    fn upsert(&self, record: ArticleRecord) -> StorageResult<()> {
        let mut map = self.inner.write().map_err(|_| StorageError::LockPoisoned)?;

        let url = record.url.clone();
        let previous = map.insert(record);

        if let Err(e) = self.persist(&map) {
            map.rollback(&url, previous);
            return Err(e);
        }

        let stored = map.get(&url).cloned();
        drop(map);

        if let Some(stored) = stored {
            if let Err(e) = write_article_file(&self.cache_dir, &stored) {
                tracing::warn!("Failed to write article file for {}: {}", url, e);
            }
        }

        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().map(|map| map.records.len()).unwrap_or(0)
    }

    fn scan(&self, visit: &mut dyn FnMut(&ArticleRecord)) {
        if let Ok(map) = self.inner.read() {
            map.records.iter().for_each(|record| visit(record));
        }
    }
}

/// Reads every valid record from the cache file in `cache_dir`
///
/// - A missing file yields no records.
/// - Entries that are not valid article records (missing `url`, `title` or
///   `content`, wrong types) are skipped with a warning.
/// - A file that cannot be read or is not a JSON object is renamed to
///   `articles.json.<timestamp>.bak` and no records are returned.
pub fn load_all(cache_dir: &Path) -> Vec<ArticleRecord> {
    let path = cache_dir.join(CACHE_FILE_NAME);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("Cache file {} is unreadable: {}", path.display(), e);
            back_up_corrupt_file(&path);
            return Vec::new();
        }
    };

    let entries = match serde_json::from_slice::<OrderedEntries>(&bytes) {
        Ok(OrderedEntries(entries)) => entries,
        Err(e) => {
            tracing::warn!("Cache file {} is corrupted: {}", path.display(), e);
            back_up_corrupt_file(&path);
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match serde_json::from_value::<ArticleRecord>(value) {
            Ok(mut record) if !record.url.is_empty() => {
                if record.url != key {
                    tracing::debug!("Cache key {} differs from record url {}", key, record.url);
                }
                if record.preview.is_empty() && !record.content.is_empty() {
                    record.preview = make_preview(&record.content);
                }
                records.push(record);
            }
            Ok(_) => tracing::warn!("Dropping cached entry {} with empty url", key),
            Err(e) => tracing::warn!("Dropping malformed cached entry {}: {}", key, e),
        }
    }

    records
}

fn back_up_corrupt_file(path: &Path) {
    let backup = path.with_file_name(format!(
        "{}.{}{}",
        CACHE_FILE_NAME,
        Utc::now().format("%Y%m%dT%H%M%S%3f"),
        BACKUP_SUFFIX
    ));

    match fs::rename(path, &backup) {
        Ok(()) => tracing::warn!("Moved corrupted cache file to {}", backup.display()),
        Err(e) => tracing::warn!(
            "Could not move corrupted cache file {} aside: {}",
            path.display(),
            e
        ),
    }
}
