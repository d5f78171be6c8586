use std::collections::HashSet;

use tracing::trace;

use crate::{error::Result, file::DependencyFile, path};

/// Pending file changes, deduplicated by value and kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct FileChanges {
    files: Vec<DependencyFile>,
    seen: HashSet<DependencyFile>,
}

impl FileChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file unless an equal one is already pending
    ///
    /// Returns `false` when the file was a duplicate. Files differing only
    /// in `support_file` are duplicates; the first one wins.
    pub fn insert(&mut self, file: DependencyFile) -> bool {
        if self.seen.contains(&file) {
            trace!(path = %file.path(), "dropping duplicate file change");
            return false;
        }
        self.seen.insert(file.clone());
        self.files.push(file);
        true
    }

    /// Add a file, overwriting everything pending for the same path
    ///
    /// Returns the files that were replaced. The new file takes the place
    /// of the first one; later entries for that path are dropped.
    pub fn replace(&mut self, file: DependencyFile) -> Vec<DependencyFile> {
        let target = file.path();
        let position = self.files.iter().position(|f| f.path() == target);

        let (replaced, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.path() == target);
        self.files = kept;
        for old in &replaced {
            self.seen.remove(old);
        }

        self.seen.insert(file.clone());
        match position {
            Some(index) => self.files.insert(index, file),
            None => self.files.push(file),
        }
        replaced
    }

    /// Look up a pending file by path; relative paths are taken from `/`
    pub fn get(&self, file_path: &str) -> Option<&DependencyFile> {
        let target = path::join("/", file_path);
        self.files.iter().find(|f| f.path() == target)
    }

    pub fn contains(&self, file: &DependencyFile) -> bool {
        self.seen.contains(file)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DependencyFile> {
        self.files.iter()
    }

    /// Files that are themselves the target of the update
    pub fn updated_files(&self) -> impl Iterator<Item = &DependencyFile> {
        self.files.iter().filter(|f| !f.is_support_file())
    }

    /// Files included for context only
    pub fn support_files(&self) -> impl Iterator<Item = &DependencyFile> {
        self.files.iter().filter(|f| f.is_support_file())
    }

    /// JSON array of canonical maps
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.files)?)
    }

    /// Parse a JSON array of canonical maps, dropping duplicates
    pub fn from_json(json: &str) -> Result<Self> {
        let files: Vec<DependencyFile> = serde_json::from_str(json)?;
        Ok(files.into_iter().collect())
    }
}

impl Extend<DependencyFile> for FileChanges {
    fn extend<I: IntoIterator<Item = DependencyFile>>(&mut self, iter: I) {
        for file in iter {
            self.insert(file);
        }
    }
}

impl FromIterator<DependencyFile> for FileChanges {
    fn from_iter<I: IntoIterator<Item = DependencyFile>>(iter: I) -> Self {
        let mut changes = Self::new();
        changes.extend(iter);
        changes
    }
}

impl IntoIterator for FileChanges {
    type Item = DependencyFile;
    type IntoIter = std::vec::IntoIter<DependencyFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileChanges {
    type Item = &'a DependencyFile;
    type IntoIter = std::slice::Iter<'a, DependencyFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
