//! Script and resource loading
//!
//! Scripts are stored as `<id>.json` next to an optional `resources.json`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::resources::AssetCatalog;
use crate::types::Script;

const CATALOG_FILE: &str = "resources.json";

/// Source of scripts and the resource table they are played with
#[async_trait]
pub trait ScriptRepository: Send + Sync {
    /// Load a script by id
    async fn load_script(&self, id: &str) -> Result<Script, RepositoryError>;

    /// Load the resource table; a repository without one yields an empty table
    async fn load_catalog(&self) -> Result<AssetCatalog, RepositoryError>;

    /// List all available script ids, sorted
    async fn list_scripts(&self) -> Result<Vec<String>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Script not found: {id}")]
    NotFound { id: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

/// Reads scripts from a directory with `tokio::fs`
pub struct FileSystemRepository {
    base_path: PathBuf,
    catalog_path: PathBuf,
}

impl FileSystemRepository {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        let base_path = base_path.into();
        let catalog_path = base_path.join(CATALOG_FILE);
        Self {
            base_path,
            catalog_path,
        }
    }

    /// Use a resource table other than `<base>/resources.json`
    pub fn with_catalog_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.catalog_path = path.into();
        self
    }

    /// Repository rooted at the directory of `script_path`, plus the id
    /// that loads that script from it
    pub fn for_script(script_path: &Path) -> Result<(Self, String), RepositoryError> {
        let id = script_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| RepositoryError::InvalidFormat {
                message: format!("Not a script path: {}", script_path.display()),
            })?
            .to_string();
        let base = script_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok((Self::new(base), id))
    }

    fn script_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{id}.json"))
    }
}

#[async_trait]
impl ScriptRepository for FileSystemRepository {
    async fn load_script(&self, id: &str) -> Result<Script, RepositoryError> {
        let path = self.script_path(id);
        if !path.exists() {
            return Err(RepositoryError::NotFound { id: id.to_string() });
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RepositoryError::Io {
                message: format!("Failed to read script file {}: {}", path.display(), e),
            })?;

        let script = Script::from_json(&content).map_err(|e| RepositoryError::InvalidFormat {
            message: format!("Failed to parse script {id}: {e}"),
        })?;
        log::debug!(target: "resources", "loaded script '{id}' ({} instructions)", script.len());
        Ok(script)
    }

    async fn load_catalog(&self) -> Result<AssetCatalog, RepositoryError> {
        if !self.catalog_path.exists() {
            log::debug!(
                target: "resources",
                "no resource table at {}, ids will be used as-is",
                self.catalog_path.display()
            );
            return Ok(AssetCatalog::default());
        }

        let content = tokio::fs::read_to_string(&self.catalog_path)
            .await
            .map_err(|e| RepositoryError::Io {
                message: format!(
                    "Failed to read resource table {}: {}",
                    self.catalog_path.display(),
                    e
                ),
            })?;

        AssetCatalog::from_json(&content).map_err(|e| RepositoryError::InvalidFormat {
            message: format!("Failed to parse resource table: {e}"),
        })
    }

    async fn list_scripts(&self) -> Result<Vec<String>, RepositoryError> {
        let mut entries =
            tokio::fs::read_dir(&self.base_path)
                .await
                .map_err(|e| RepositoryError::Io {
                    message: format!(
                        "Failed to read directory {}: {}",
                        self.base_path.display(),
                        e
                    ),
                })?;

        let mut scripts = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::Io {
                message: format!("Failed to read directory entry: {e}"),
            })?
        {
            let path = entry.path();
            if path == self.catalog_path {
                continue;
            }
            if let Some(extension) = path.extension().and_then(|ext| ext.to_str())
                && extension == "json"
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                scripts.push(stem.to_string());
            }
        }

        scripts.sort();
        Ok(scripts)
    }
}

/// In-memory implementation for testing
#[derive(Default)]
pub struct InMemoryRepository {
    scripts: HashMap<String, Script>,
    catalog: AssetCatalog,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: AssetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn add_script(&mut self, id: impl Into<String>, script: Script) {
        self.scripts.insert(id.into(), script);
    }
}

#[async_trait]
impl ScriptRepository for InMemoryRepository {
    async fn load_script(&self, id: &str) -> Result<Script, RepositoryError> {
        self.scripts
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    async fn load_catalog(&self) -> Result<AssetCatalog, RepositoryError> {
        Ok(self.catalog.clone())
    }

    async fn list_scripts(&self) -> Result<Vec<String>, RepositoryError> {
        let mut ids: Vec<String> = self.scripts.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
