use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::constants::BUNDLE_FILE_NAME;
use crate::domain::Bundle;
use crate::error::{CardsError, Result};

/// What to do with a pre-existing output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Remove and recreate the directory; the run fully owns the output.
    Reset,
    /// Leave existing files in place and write new objects alongside them.
    Merge,
}

/// File-system object store: one JSON file per object at
/// `{root}/{type}/{id}.json`, plus an in-memory map keyed by id. The map is
/// a BTreeMap so iteration is already in lexicographic id order, which is
/// the order the bundle assembler needs.
pub struct FileSystemStore {
    root: PathBuf,
    objects: BTreeMap<String, Value>,
}

impl FileSystemStore {
    pub fn open(root: &Path, mode: OutputMode) -> Result<Self> {
        if mode == OutputMode::Reset && root.exists() {
            fs::remove_dir_all(root)?;
        }
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            objects: BTreeMap::new(),
        })
    }

    /// Adds one object, keyed by its `id`. Duplicate ids (the same issuer
    /// identity reused across many cards) are kept once; the first copy
    /// wins and later copies are skipped.
    pub fn add(&mut self, object: Value) -> Result<()> {
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| CardsError::InvalidObject("object has no id".to_string()))?
            .to_string();
        let object_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CardsError::InvalidObject(format!("object {} has no type", id)))?
            .to_string();

        if self.objects.contains_key(&id) {
            debug!(id = %id, "duplicate object skipped");
            return Ok(());
        }

        let dir = self.root.join(&object_type);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", id));
        fs::write(&path, serde_json::to_string_pretty(&object)?)?;

        self.objects.insert(id, object);
        Ok(())
    }

    pub fn add_serializable<T: serde::Serialize>(&mut self, object: &T) -> Result<()> {
        self.add(serde_json::to_value(object)?)
    }

    /// All objects added this run, in lexicographic id order.
    pub fn objects(&self) -> &BTreeMap<String, Value> {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn write_bundle(&self, bundle: &Bundle) -> Result<PathBuf> {
        let path = self.root.join(BUNDLE_FILE_NAME);
        fs::write(&path, serde_json::to_string_pretty(bundle)?)?;
        Ok(path)
    }
}
