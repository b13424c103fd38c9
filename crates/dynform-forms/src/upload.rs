//! Reading files into controls and the attachment upload contract.
//!
//! A selected photo or file is read asynchronously and stored in its control
//! as a `data:` URL. The network upload itself belongs to the owner of the
//! form: the engine only describes it as an [`UploadRequest`] handed to an
//! [`AttachmentUploader`].
//!
//! All file operations use async I/O via `tokio::fs`.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;

use dynform_core::{FormError, FormResult};

/// A file read from disk, ready to be stored or uploaded.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// The file name, without directories.
    pub name: String,
    /// The MIME type guessed from the extension.
    pub content_type: String,
    /// The size of the content in bytes.
    pub size: usize,
    /// The raw file content.
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Reads a file, refusing anything larger than `max_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Io`] if the file cannot be read and
    /// [`FormError::Upload`] if it exceeds `max_size`.
    pub async fn from_path(path: impl AsRef<Path>, max_size: usize) -> FormResult<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let len = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if len > max_size {
            return Err(FormError::Upload(format!(
                "{} is {len} bytes, the limit is {max_size}",
                path.display()
            )));
        }

        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::debug!(file = %path.display(), size = content.len(), "read file");
        Ok(Self {
            name,
            content_type: mime_for_path(path).to_string(),
            size: content.len(),
            content,
        })
    }

    /// Encodes the content as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        encode_data_url(&self.content_type, &self.content)
    }
}

/// Guesses a MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Builds a base64 `data:` URL.
pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{content_type};base64,{encoded}")
}

/// Reads a file into a `data:` URL.
///
/// # Errors
///
/// See [`UploadedFile::from_path`].
pub async fn read_as_data_url(path: impl AsRef<Path>, max_size: usize) -> FormResult<String> {
    Ok(UploadedFile::from_path(path, max_size).await?.to_data_url())
}

/// What the owner of a form sends to its attachment service.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name of the control the file belongs to.
    pub control: String,
    /// The file name.
    pub file_name: String,
    /// The MIME type.
    pub content_type: String,
    /// The file content.
    pub bytes: Vec<u8>,
    /// Pre-signed destination URL obtained by the owner.
    pub destination_url: String,
}

impl UploadRequest {
    /// Describes the upload of `file` for `control` to `destination_url`.
    pub fn new(control: impl Into<String>, file: UploadedFile, destination_url: impl Into<String>) -> Self {
        Self {
            control: control.into(),
            file_name: file.name,
            content_type: file.content_type,
            bytes: file.content,
            destination_url: destination_url.into(),
        }
    }
}

/// An external service that stores attachments.
///
/// Implementations perform the network transfer; the engine never calls
/// one itself.
#[async_trait]
pub trait AttachmentUploader: Send + Sync {
    /// Uploads the file and returns the URL it can be fetched from.
    async fn upload(&self, request: UploadRequest) -> FormResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/photo.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("cv.pdf")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_encode_data_url() {
        assert_eq!(encode_data_url("text/plain", b"hi"), "data:text/plain;base64,aGk=");
    }

    #[tokio::test]
    async fn test_read_as_data_url() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();
        let url = read_as_data_url(file.path(), 1024).await.unwrap();
        assert_eq!(url, "data:text/plain;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let err = read_as_data_url(file.path(), 10).await.unwrap_err();
        assert!(matches!(err, FormError::Upload(_)));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let err = read_as_data_url("/definitely/not/here.png", 1024).await.unwrap_err();
        assert!(matches!(err, FormError::Io(_)));
    }

    struct RecordingUploader {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AttachmentUploader for RecordingUploader {
        async fn upload(&self, request: UploadRequest) -> FormResult<String> {
            self.seen.lock().unwrap().push(request.control.clone());
            Ok(format!("{}/{}", request.destination_url, request.file_name))
        }
    }

    #[tokio::test]
    async fn test_uploader_receives_request() {
        let file = UploadedFile {
            name: "me.jpg".into(),
            content_type: "image/jpeg".into(),
            size: 3,
            content: vec![1, 2, 3],
        };
        let uploader = RecordingUploader {
            seen: Mutex::new(Vec::new()),
        };
        let url = uploader
            .upload(UploadRequest::new("photo", file, "https://store.test/bucket"))
            .await
            .unwrap();
        assert_eq!(url, "https://store.test/bucket/me.jpg");
        assert_eq!(*uploader.seen.lock().unwrap(), vec!["photo".to_string()]);
    }
}
