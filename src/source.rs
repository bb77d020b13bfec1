use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies raw conversation records by identifier.
pub trait ConversationSource: Sync {
    /// Every identifier this source can fetch, in export order.
    fn ids(&self) -> Result<Vec<String>>;
    fn fetch(&self, id: &str) -> Result<Value>;
}

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A directory of `<id>.json` / `<id>.yaml` / `<id>.yml` record files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(eyre!("Source directory not found: {}", root.display()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, id: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", id, ext)))
            .find(|p| p.is_file())
    }
}

impl ConversationSource for DirectorySource {
    /// Record files in the directory, sorted by identifier.
    fn ids(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .wrap_err_with(|| format!("Failed to read source directory: {}", self.root.display()))?;

        let mut ids: Vec<String> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && has_record_extension(p))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn fetch(&self, id: &str) -> Result<Value> {
        let path = self
            .locate(id)
            .ok_or_else(|| eyre!("Conversation {:?} not found in {}", id, self.root.display()))?;
        let text = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read conversation {:?}: {}", id, path.display()))?;
        parse_record(&path, &text)
            .wrap_err_with(|| format!("Failed to parse conversation {:?}: {}", id, path.display()))
    }
}

fn has_record_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.contains(&e))
}

fn parse_record(path: &Path, text: &str) -> Result<Value> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str::<Value>(text).wrap_err("Invalid YAML")
        }
        _ => serde_json::from_str::<Value>(text).wrap_err("Invalid JSON"),
    }
}
