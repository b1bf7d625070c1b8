//! Local file storage: a JSON catalog document plus image files.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/data/<name>     JSON array, appended to by save_data
//! <root>/images/<name>   raw image bytes written by save_image
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use super::Storage;
use crate::Error;
use crate::locks::KeyLocks;

pub const DATA_DIR: &str = "data";
pub const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    name: String,
    locks: KeyLocks,
}

impl FileStorage {
    /// File storage for `name` under `root`.
    ///
    /// `locks` must be shared by every `FileStorage` that may touch the same
    /// catalog, otherwise concurrent appends can lose records.
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, locks: KeyLocks) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidInput("file storage name cannot be empty".into()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::InvalidInput(format!("file storage name must be a bare file name: {name}")));
        }
        Ok(Self { root: root.into(), name, locks })
    }

    pub fn data_path(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(&self.name)
    }

    pub fn image_path(&self) -> PathBuf {
        self.root.join(IMAGES_DIR).join(&self.name)
    }

    /// Existing catalog entries. Missing, unreadable-as-JSON and non-array
    /// documents all read as empty so a corrupt file never blocks writes.
    async fn read_catalog(&self) -> Result<Vec<Value>, Error> {
        let path = self.data_path();
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => {
                tracing::warn!(path = %path.display(), "catalog is not a JSON array; treating as empty");
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "catalog is not valid JSON; treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

/// Pretty JSON with the 4-space indent used by the catalog document.
fn to_catalog_json(items: &[Value]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    items.serialize(&mut ser)?;
    Ok(out)
}

/// Replace `path` with `contents` via a sibling temp file and rename.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    fn technique(&self) -> &'static str {
        super::LOCAL
    }

    async fn get_data(&self) -> Result<Value, Error> {
        Ok(Value::Array(self.read_catalog().await?))
    }

    /// Append `data` (a JSON array) to the catalog, preserving order.
    async fn save_data(&self, data: &Value) -> Result<(), Error> {
        let Value::Array(new_items) = data else {
            return Err(Error::InvalidInput("file storage expects a JSON array".into()));
        };

        let path = self.data_path();
        let _guard = self.locks.lock(&path.to_string_lossy()).await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut items = self.read_catalog().await?;
        let existing = items.len();
        items.extend(new_items.iter().cloned());

        write_atomic(&path, &to_catalog_json(&items)?).await?;

        tracing::debug!(
            path = %path.display(),
            existing,
            appended = new_items.len(),
            "catalog updated"
        );

        Ok(())
    }

    async fn save_image(&self, bytes: &[u8]) -> Result<PathBuf, Error> {
        let path = self.image_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "image saved");

        Ok(path)
    }
}
