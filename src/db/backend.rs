use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{Result, StoreError};
use crate::models::Projects;

/// Persistence interface for the project collection
///
/// Implementations read and write the whole collection at once. `load`
/// returns `Ok(None)` when nothing has been stored yet.
pub trait StorageBackend {
    fn load(&self) -> Result<Option<Projects>>;
    fn save(&self, projects: &Projects) -> Result<()>;
    /// Human-readable location used in log messages
    fn describe(&self) -> String;
}

/// Render the collection as 4-space indented JSON with a trailing newline
pub fn to_pretty_json(projects: &Projects) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    projects.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Single JSON file, rewritten in full on every save
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<Projects>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let projects = serde_json::from_str(&contents)?;
        Ok(Some(projects))
    }

    fn save(&self, projects: &Projects) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }
        let json = to_pretty_json(projects)?;
        fs::write(&self.path, json).map_err(|e| StoreError::io(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory backend holding the serialized text, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: RefCell<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing raw contents (which may be invalid JSON)
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Projects>> {
        match self.contents.borrow().as_deref() {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn save(&self, projects: &Projects) -> Result<()> {
        let json = to_pretty_json(projects)?;
        *self.contents.borrow_mut() = Some(json);
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
