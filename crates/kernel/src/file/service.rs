//! Image upload service.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::file::storage::FileStorage;

/// Maximum upload size (10 MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Why an upload was refused before reaching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("file ফিল্ডে একটি ইমেজ ফাইল দিন")]
    MissingFile,

    #[error("শুধু ইমেজ ফাইল আপলোড করা যাবে")]
    NotAnImage,

    #[error("ফাইল সাইজ 10MB এর বেশি")]
    TooLarge,
}

/// Stored image as reported to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Public delivery URL.
    pub url: String,
    /// Storage identifier.
    pub public_id: String,
    /// Size in bytes.
    pub bytes: usize,
    /// Image format, e.g. `png`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Check an upload against the image rules.
///
/// `content_type` is the type the client declared. When the bytes can be
/// sniffed they must also be an image. Returns the detected format.
pub fn validate_image(
    content_type: Option<&str>,
    data: &[u8],
) -> Result<Option<String>, UploadRejection> {
    let declared = content_type.unwrap_or_default();
    if !declared.starts_with("image/") {
        return Err(UploadRejection::NotAnImage);
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(UploadRejection::TooLarge);
    }

    match infer::get(data) {
        Some(kind) if kind.matcher_type() != infer::MatcherType::Image => {
            Err(UploadRejection::NotAnImage)
        }
        Some(kind) => Ok(Some(kind.extension().to_string())),
        None => Ok(declared
            .strip_prefix("image/")
            .map(|subtype| subtype.split(['+', ';']).next().unwrap_or(subtype).to_string())
            .filter(|s| !s.is_empty())),
    }
}

/// Image upload service over a storage backend.
#[derive(Clone)]
pub struct FileService {
    storage: Arc<dyn FileStorage>,
}

impl FileService {
    /// Create a new file service.
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Store a validated image.
    pub async fn upload(
        &self,
        filename: &str,
        format: Option<String>,
        data: &[u8],
    ) -> Result<UploadedImage> {
        let uri = self.storage.generate_uri(filename);
        self.storage.write(&uri, data).await?;

        let public_id = strip_extension(uri.split_once("://").map_or(uri.as_str(), |(_, p)| p));
        let image = UploadedImage {
            url: self.storage.public_url(&uri),
            public_id: public_id.to_string(),
            bytes: data.len(),
            format,
        };

        info!(uri = %uri, bytes = image.bytes, "image uploaded");
        Ok(image)
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("scheme", &self.storage.scheme())
            .finish()
    }
}

fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => stem,
        _ => path,
    }
}

/// Sanitize a filename for storage: ASCII letters, digits, `.`, `-`, `_`.
pub(crate) fn sanitize_filename(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let safe: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .take(200)
        .collect();

    if safe.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        safe
    }
}
