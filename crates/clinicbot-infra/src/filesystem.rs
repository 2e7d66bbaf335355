//! Local filesystem helpers: data directory and documents queued for upload.

use std::path::{Path, PathBuf};

use clinicbot_types::session::FileRef;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CLINICBOT_DATA_DIR` environment variable
/// 2. `~/.clinicbot`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLINICBOT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".clinicbot");
    }

    PathBuf::from(".clinicbot")
}

/// Infer the MIME type sent with an upload from the file extension.
pub fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Build a [`FileRef`] for a local document.
///
/// # Errors
///
/// Fails if the path does not exist or is not a regular file.
pub async fn file_ref_from_path(path: &Path) -> std::io::Result<FileRef> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileRef {
        path: path.to_path_buf(),
        name,
        mime_type: infer_mime_type(path),
    })
}
