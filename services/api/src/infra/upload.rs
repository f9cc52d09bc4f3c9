use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;

use crate::domain::repository::FileStore;
use crate::error::ApiError;

/// Writes uploads into a local directory served under the uploads prefix.
#[derive(Clone)]
pub struct DiskFileStore {
    pub dir: PathBuf,
}

/// Image extensions kept on stored uploads. Anything else is stored without
/// an extension and served as `application/octet-stream`.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// `<32 random hex chars><unix millis>.<ext>`, where `ext` is one of
/// [`IMAGE_EXTENSIONS`] in lowercase.
pub fn generate_file_name(original_name: Option<&str>) -> String {
    let raw: [u8; 16] = rand::random();
    let mut name: String = raw.iter().map(|b| format!("{b:02x}")).collect();
    name.push_str(&Utc::now().timestamp_millis().to_string());

    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()));
    if let Some(ext) = ext {
        name.push('.');
        name.push_str(&ext);
    }
    name
}

impl FileStore for DiskFileStore {
    async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, ApiError> {
        let name = generate_file_name(original_name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context("create uploads folder")?;
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .context("write upload")?;
        tracing::debug!(file = %name, size = bytes.len(), "upload stored");
        Ok(name)
    }
}
