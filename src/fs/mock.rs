use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct MockEntry {
    content: Option<String>,
    file_type: FileType,
}

/// In-memory filesystem used to drive the locator and classifier in tests.
pub struct MockFileSystem {
    entries: RwLock<BTreeMap<PathBuf, MockEntry>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut entries, parent);
        }

        entries.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.write().unwrap();
        Self::ensure_parents(&mut entries, path.as_ref());
    }

    fn ensure_parents(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            entries.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entries.read().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.entries
            .read()
            .unwrap()
            .get(path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entries
            .read()
            .unwrap()
            .get(path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(path)
            .ok_or_else(|| anyhow!("No such file: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = self.entries.read().unwrap();

        if !entries
            .get(path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
        {
            return Err(anyhow!("No such directory: {:?}", path));
        }

        let mut result = Vec::new();
        for (entry_path, entry) in entries.iter() {
            if entry_path.parent() == Some(path) {
                result.push(DirEntry {
                    path: entry_path.clone(),
                    name: entry_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    file_type: entry.file_type,
                });
            }
        }

        Ok(result)
    }
}
