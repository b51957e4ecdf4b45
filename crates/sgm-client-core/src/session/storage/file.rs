use std::{collections::HashMap, fs, io::ErrorKind, path::PathBuf};

use anyhow::Context as _;
use sgm_shared::const_config::storage::STORAGE_FILE_EXTENSION;
use tracing::debug;

use super::{KeyValueStorage, StorageEvent};

/// Storage with one file per key inside a folder
///
/// Separate processes pointed at the same folder share their values. A write
/// by another process is detected by comparing the file with what this handle
/// last read or wrote.
#[derive(Debug)]
pub struct FileStorage {
    folder: PathBuf,
    last_known: HashMap<String, Option<String>>,
}

impl FileStorage {
    /// Creates the folder if it does not exist yet
    pub fn new(folder: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let folder = folder.into();
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed to create storage folder: {folder:?}"))?;
        Ok(Self {
            folder,
            last_known: HashMap::new(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.folder.join(format!("{key}.{STORAGE_FILE_EXTENSION}"))
    }

    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {path:?}")),
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        let result = self.read(key)?;
        self.last_known.insert(key.to_string(), result.clone());
        Ok(result)
    }

    /// Writes to a temporary file then renames it so readers never see a
    /// partial value
    #[tracing::instrument(skip(value))]
    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let tmp_path = self
            .folder
            .join(format!(".{key}.{}.tmp", std::process::id()));
        fs::write(&tmp_path, value).with_context(|| format!("failed to write {tmp_path:?}"))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to move {tmp_path:?} to {path:?}"))?;
        self.last_known
            .insert(key.to_string(), Some(value.to_string()));
        Ok(())
    }

    #[tracing::instrument]
    fn remove_item(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("failed to remove {path:?}")),
        }
        self.last_known.insert(key.to_string(), None);
        Ok(())
    }

    fn take_foreign_changes(&mut self, key: &str) -> anyhow::Result<Vec<StorageEvent>> {
        let current = self.read(key)?;
        let previous = self.last_known.insert(key.to_string(), current.clone());
        match previous {
            // Not observed before so there is nothing to compare against
            None => Ok(Vec::new()),
            Some(previous) if previous == current => Ok(Vec::new()),
            Some(_) => {
                debug!(key, "foreign change detected");
                Ok(vec![StorageEvent {
                    key: key.to_string(),
                    new_value: current,
                }])
            }
        }
    }
}
