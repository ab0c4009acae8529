use std::{marker::PhantomData, path::{Path, PathBuf}};
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;

use crate::errors::ServiceError;

/// JSON file holding a whole-state snapshot of type `T`.
///
/// Writes go to a sibling temp file first and are then renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct JsonSnapshotFile<T> {
    file_path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSnapshotFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Open the snapshot at `path`, creating it from `T::default()` if missing.
    /// A file that exists but does not parse is an error, never silently reset.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<(Self, T), ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
            }
        }

        let file = Self { file_path, _marker: PhantomData };
        let value = match fs::read(&file.file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("corrupt snapshot {}: {e}", file.file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = T::default();
                file.save(&empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::Storage(e.to_string())),
        };
        Ok((file, value))
    }

    pub async fn save(&self, value: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(value).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let tmp = self.tmp_path();
        fs::write(&tmp, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.file_path).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path { &self.file_path }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}
