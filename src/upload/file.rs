//! Picked logo files

use std::path::Path;

use super::error::{UploadError, UploadResult};

/// An image picked for upload
#[derive(Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for LogoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl LogoFile {
    /// Build from in-memory content; the content type is guessed from `name`
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: &Path) -> UploadResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| UploadError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "logo".to_string());

        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type by extension
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("logo.PNG"), "image/png");
        assert_eq!(content_type_for("a.b.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("vector.svg"), "image/svg+xml");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let logo = LogoFile::from_path(file.path()).await.unwrap();
        assert_eq!(logo.content_type, "image/png");
        assert_eq!(logo.len(), 4);
        assert!(logo.name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_from_missing_path() {
        let err = LogoFile::from_path(Path::new("/nonexistent/logo.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Io { .. }));
    }
}
