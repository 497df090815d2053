//! Attachments Module
//!
//! Multipart file upload. Files are written to the configured upload
//! directory and served back under `/uploads`.

/// HTTP handler for `/attachments/fileupload`
pub mod handlers;

pub use handlers::{upload_file, MAX_UPLOAD_BYTES};
