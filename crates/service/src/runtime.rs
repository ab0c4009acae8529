//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can prepare data
//! locations through `service::runtime` without depending on `common`.

use std::path::Path;

/// Ensure the directory that will hold `file` exists.
pub async fn ensure_data_dir(file: &Path) -> anyhow::Result<()> {
    common::env::ensure_parent_dir(file).await
}
