//! Incremental classification cache.
//!
//! One index file per scanned directory, holding every verdict keyed by
//! category and then by path. The index is loaded (or created empty) when it
//! is opened and written back once with [`Index::persist`].

use crate::models::{Category, FileRecord, StatSignature};
use crate::{content_hash, index_file_id, Result, StorageError};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub type CategoryMap = BTreeMap<Category, BTreeMap<PathBuf, FileRecord>>;

#[derive(Debug)]
pub struct Index {
    file: PathBuf,
    entries: CategoryMap,
    loaded: bool,
}

impl Index {
    /// Load the index for `root` from `index_dir`, or start an empty one when
    /// none has been persisted yet.
    ///
    /// An index file that cannot be decoded is moved aside to
    /// `<id>.corrupt` and the run continues with an empty, unloaded index.
    pub fn open(index_dir: &Path, root: &Path) -> Result<Self> {
        let file = index_dir.join(index_file_id(root));
        if !file.exists() {
            debug!(path = %file.display(), "no index on disk, starting fresh");
            return Ok(Self::fresh(file));
        }

        match Self::read_entries(&file) {
            Ok(entries) => {
                info!(path = %file.display(), records = count(&entries), "loaded index");
                Ok(Self {
                    file,
                    entries,
                    loaded: true,
                })
            }
            Err(err @ StorageError::Decode { .. }) => {
                let aside = file.with_extension(format!("{}.corrupt", crate::INDEX_EXTENSION));
                warn!(error = %err, moved_to = %aside.display(), "index unreadable, starting fresh");
                fs::rename(&file, &aside).map_err(|e| StorageError::io(&file, e))?;
                Ok(Self::fresh(file))
            }
            Err(err) => Err(err),
        }
    }

    fn fresh(file: PathBuf) -> Self {
        Self {
            file,
            entries: CategoryMap::new(),
            loaded: false,
        }
    }

    fn read_entries(file: &Path) -> Result<CategoryMap> {
        let bytes = fs::read(file).map_err(|e| StorageError::io(file, e))?;
        let stored: BTreeMap<Category, Vec<FileRecord>> =
            rmp_serde::from_slice(&bytes).map_err(|source| StorageError::Decode {
                path: file.to_path_buf(),
                source,
            })?;
        Ok(stored
            .into_iter()
            .map(|(category, records)| {
                let by_path: BTreeMap<PathBuf, FileRecord> = records
                    .into_iter()
                    .map(|record| (record.path.clone(), record))
                    .collect();
                (category, by_path)
            })
            .collect())
    }

    /// Whether this index came from a previously persisted file.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Identifier recorded in the manifest.
    pub fn id(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Category of a cached verdict for `path`, if one exists with exactly
    /// the same stat signature.
    pub fn lookup(&self, path: &Path, stat: &StatSignature) -> Option<Category> {
        self.entries.iter().find_map(|(category, records)| {
            records
                .get(path)
                .filter(|record| record.stat == *stat)
                .map(|_| *category)
        })
    }

    /// Hash the file and record its verdict under `category`.
    ///
    /// Records for the same path in other categories are left in place.
    pub fn store(
        &mut self,
        category: Category,
        path: &Path,
        stat: StatSignature,
        detail: impl Into<String>,
        name_date: Option<String>,
    ) -> Result<&FileRecord> {
        let record = FileRecord {
            path: path.to_path_buf(),
            stat,
            content_hash: content_hash(path)?,
            category,
            detail: detail.into(),
            name_date,
        };
        info!(category = %category, path = %path.display(), detail = %record.detail, "added");

        let records = self.entries.entry(category).or_default();
        records.insert(path.to_path_buf(), record);
        Ok(&records[path])
    }

    /// Drop records whose file no longer exists. Only a loaded index is
    /// pruned; returns the number of removed records.
    pub fn prune(&mut self) -> usize {
        if !self.loaded {
            return 0;
        }

        let stale: Vec<(Category, PathBuf)> = self
            .entries
            .iter()
            .flat_map(|(category, records)| {
                records
                    .keys()
                    .filter(|path| is_missing(path))
                    .map(move |path| (*category, path.clone()))
            })
            .collect();

        for (category, path) in &stale {
            if let Some(records) = self.entries.get_mut(category) {
                records.remove(path);
            }
            info!(category = %category, path = %path.display(), "deleted entry");
        }
        stale.len()
    }

    /// Write the whole index to its file. Each category is stored as a list
    /// of records; the records carry their own paths.
    pub fn persist(&self) -> Result<&Path> {
        let stored: BTreeMap<Category, Vec<&FileRecord>> = self
            .entries
            .iter()
            .map(|(category, records)| (*category, records.values().collect()))
            .collect();
        let bytes = rmp_serde::to_vec_named(&stored).map_err(|source| {
            StorageError::Encode {
                path: self.file.clone(),
                source,
            }
        })?;
        if let Some(parent) = self.file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }
        fs::write(&self.file, bytes).map_err(|e| StorageError::io(&self.file, e))?;
        info!(path = %self.file.display(), records = self.len(), "persisted index");
        Ok(&self.file)
    }

    pub fn records(&self, category: Category) -> impl Iterator<Item = &FileRecord> {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|records| records.values())
    }

    pub fn get(&self, category: Category, path: &Path) -> Option<&FileRecord> {
        self.entries.get(&category).and_then(|r| r.get(path))
    }

    /// Categories holding at least one record.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(category, _)| *category)
    }

    pub fn count(&self, category: Category) -> usize {
        self.entries.get(&category).map_or(0, BTreeMap::len)
    }

    pub fn len(&self) -> usize {
        count(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> &CategoryMap {
        &self.entries
    }
}

fn is_missing(path: &Path) -> bool {
    matches!(fs::symlink_metadata(path), Err(e) if e.kind() == ErrorKind::NotFound)
}

fn count(entries: &CategoryMap) -> usize {
    entries.values().map(BTreeMap::len).sum()
}
