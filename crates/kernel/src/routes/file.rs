//! Image upload route.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::Response,
    routing::post,
};
use tracing::warn;

use crate::error::AppResult;
use crate::file::{MAX_FILE_SIZE, UploadRejection, validate_image};
use crate::state::AppState;

use super::helpers::no_store;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the upload router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/upload", post(upload_image))
        // Slightly above the file limit so oversized files reach validation
        // and get a proper message; anything larger is cut off by axum.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD))
}

/// A file field pulled out of the form.
struct FilePart {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Read the `file` field, ignoring every other field.
async fn read_file_field(multipart: &mut Multipart) -> Result<FilePart, UploadRejection> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadRejection::MissingFile),
            Err(e) => return Err(read_failure(&e)),
        };

        if field.name() != Some("file") {
            continue;
        }
        // Plain text fields named `file` are not files.
        let Some(filename) = field.file_name().map(str::to_string) else {
            return Err(UploadRejection::MissingFile);
        };
        let content_type = field.content_type().map(str::to_string);

        let data = field.bytes().await.map_err(|e| read_failure(&e))?;
        return Ok(FilePart {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }
}

fn read_failure(error: &axum::extract::multipart::MultipartError) -> UploadRejection {
    warn!(error = %error, "failed to read upload data");
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadRejection::TooLarge
    } else {
        UploadRejection::MissingFile
    }
}

/// Upload an image.
///
/// POST /api/admin/upload
/// Content-Type: multipart/form-data
///
/// Form fields:
/// - file: The image to upload
async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    // Non-multipart bodies are reported like a missing file.
    let mut multipart = multipart.map_err(|_| UploadRejection::MissingFile)?;
    let part = read_file_field(&mut multipart).await?;
    let format = validate_image(part.content_type.as_deref(), &part.data)?;

    let image = state
        .files()
        .upload(&part.filename, format, &part.data)
        .await?;

    Ok(no_store(Json(image)))
}
