//! Image upload, storage, and delivery URLs.

pub mod delivery;
pub mod service;
pub mod storage;

pub use delivery::optimized_image_url;
pub use service::{FileService, MAX_FILE_SIZE, UploadRejection, UploadedImage, validate_image};
pub use storage::{FileStorage, LocalFileStorage, resolve_relative};
