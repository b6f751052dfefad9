pub mod codec;
pub mod schema;
pub mod store;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::*;
use crate::error::{Error, Result};
use store::{Collection, Store, Txn};

const NEXT_MEDIA_ID: &str = "next_media_id";

/// Persistent catalog of media records and checksum groups.
///
/// Each method is one logical step and runs in its own transaction, so a crash
/// mid-pass keeps everything committed before it.
pub struct Catalog {
    store: Store,
}

impl Catalog {
    /// Open or create a catalog at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            store: Store::open(path)?,
        })
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
        })
    }

    // ── Media records ────────────────────────────────────────────────

    pub fn has_file(&mut self, path: &Path) -> Result<bool> {
        let key = MediaRecord::key_for(path);
        self.store
            .view(|tx| tx.contains(Collection::Media, key.as_bytes()))
    }

    /// Register a path, returning its key. A path that is already known is left
    /// untouched. Keys are built from the path text, so non-UTF-8 paths are
    /// refused with [`Error::NonUtf8Path`].
    pub fn add_file(&mut self, path: &Path) -> Result<String> {
        if path.to_str().is_none() {
            return Err(Error::NonUtf8Path(path.to_path_buf()));
        }
        self.store.update(|tx| {
            let key = MediaRecord::key_for(path);
            if tx.contains(Collection::Media, key.as_bytes())? {
                return Ok(key);
            }
            let id = next_media_id(tx)?;
            let record = MediaRecord::new(id, path);
            tx.put(Collection::Media, key.as_bytes(), &codec::encode(&record)?)?;
            Ok(key)
        })
    }

    pub fn get_file(&mut self, path: &Path) -> Result<Option<MediaRecord>> {
        let key = MediaRecord::key_for(path);
        self.store
            .view(|tx| load(tx, Collection::Media, key.as_bytes()))
    }

    /// Overwrite the stored record at `record.key`.
    pub fn save_media(&mut self, record: &MediaRecord) -> Result<()> {
        let value = codec::encode(record)?;
        self.store
            .update(|tx| tx.put(Collection::Media, record.key.as_bytes(), &value))
    }

    /// All records in key order.
    pub fn list_files(&mut self) -> Result<Vec<MediaRecord>> {
        self.store.view(|tx| load_all(tx, Collection::Media))
    }

    /// Records whose MIME type is one of `filter`.
    pub fn list_files_by_mimetype(&mut self, filter: &[&str]) -> Result<Vec<MediaRecord>> {
        let all = self.list_files()?;
        Ok(all
            .into_iter()
            .filter(|r| {
                r.mime_type
                    .as_deref()
                    .is_some_and(|mime| filter.contains(&mime))
            })
            .collect())
    }

    // ── Checksum groups ──────────────────────────────────────────────

    /// Persist a freshly hashed record and file its path under its checksum
    /// group, in one transaction.
    ///
    /// `previous` is the checksum the record carried before a forced re-hash.
    /// If it differs from the new one, the path leaves its old group (the group
    /// is dropped once empty), so a path never sits in two groups.
    pub fn record_checksum(&mut self, record: &MediaRecord, previous: Option<&str>) -> Result<()> {
        let value = codec::encode(record)?;
        self.store.update(|tx| {
            if let (Some(old), Some(new)) = (previous, record.checksum.as_deref()) {
                if old != new {
                    detach_from_group(tx, old, &record.path)?;
                }
            }

            tx.put(Collection::Media, record.key.as_bytes(), &value)?;

            let Some(checksum) = record.checksum.as_deref() else {
                return Ok(());
            };
            let key = ChecksumGroup::key_for(checksum);
            let group = match load::<ChecksumGroup>(tx, Collection::Checksums, key.as_bytes())? {
                None => ChecksumGroup::new(checksum, &record.path),
                Some(mut group) => {
                    if !group.contains(&record.path) {
                        group.sources.push(record.path.clone());
                    }
                    group
                }
            };
            tx.put(Collection::Checksums, key.as_bytes(), &codec::encode(&group)?)
        })
    }

    pub fn get_checksum_group(&mut self, checksum: &str) -> Result<Option<ChecksumGroup>> {
        let key = ChecksumGroup::key_for(checksum);
        self.store
            .view(|tx| load(tx, Collection::Checksums, key.as_bytes()))
    }

    /// All groups in key (checksum) order.
    pub fn list_checksum_groups(&mut self) -> Result<Vec<ChecksumGroup>> {
        self.store.view(|tx| load_all(tx, Collection::Checksums))
    }

    // ── Summary ──────────────────────────────────────────────────────

    pub fn stats(&mut self) -> Result<CatalogStats> {
        let files = self.list_files()?;
        let groups = self.list_checksum_groups()?;
        Ok(CatalogStats {
            files: files.len(),
            with_mimetype: files.iter().filter(|r| r.mime_type.is_some()).count(),
            with_checksum: files.iter().filter(|r| r.checksum.is_some()).count(),
            with_date: files.iter().filter(|r| r.creation_date.is_some()).count(),
            groups: groups.len(),
            duplicates: groups
                .iter()
                .map(|g| g.sources.len().saturating_sub(1))
                .sum(),
        })
    }

    // ── Config ───────────────────────────────────────────────────────

    pub fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.store.update(|tx| tx.set_config(key, value))
    }

    pub fn get_config(&mut self, key: &str) -> Result<Option<String>> {
        self.store.view(|tx| tx.get_config(key))
    }
}

fn load<T: DeserializeOwned>(tx: &Txn<'_>, collection: Collection, key: &[u8]) -> Result<Option<T>> {
    tx.get(collection, key)?
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

fn load_all<T: DeserializeOwned>(tx: &Txn<'_>, collection: Collection) -> Result<Vec<T>> {
    tx.scan(collection)?
        .iter()
        .map(|(_, value)| codec::decode(value))
        .collect()
}

fn next_media_id(tx: &Txn<'_>) -> Result<u64> {
    let id = tx
        .get_config(NEXT_MEDIA_ID)?
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    tx.set_config(NEXT_MEDIA_ID, &(id + 1).to_string())?;
    Ok(id)
}

fn detach_from_group(tx: &Txn<'_>, checksum: &str, path: &Path) -> Result<()> {
    let key = ChecksumGroup::key_for(checksum);
    let Some(mut group) = load::<ChecksumGroup>(tx, Collection::Checksums, key.as_bytes())? else {
        return Ok(());
    };
    group.sources.retain(|p| p != path);
    if group.sources.is_empty() {
        tx.delete(Collection::Checksums, key.as_bytes())?;
    } else {
        tx.put(Collection::Checksums, key.as_bytes(), &codec::encode(&group)?)?;
    }
    Ok(())
}
