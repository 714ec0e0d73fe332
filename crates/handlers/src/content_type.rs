use std::path::Path;

/// Content type used when nothing more specific is known.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type assumed for images with an unrecognised extension.
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Guesses a document content type from a file extension.
#[must_use]
pub fn content_type_for_path(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("html") => "text/html",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Guesses an image content type from a file extension.
#[must_use]
pub fn image_content_type_for_path(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => DEFAULT_IMAGE_CONTENT_TYPE,
    }
}

/// File extension (with the dot) for a saved payload of `content_type`.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/gif" => Some(".gif"),
        "image/webp" => Some(".webp"),
        "text/plain" => Some(".txt"),
        "application/json" => Some(".json"),
        "application/xml" => Some(".xml"),
        "application/pdf" => Some(".pdf"),
        "application/octet-stream" => Some(".bin"),
        _ => None,
    }
}

/// File extension (with the dot) for a saved image of `content_type`.
#[must_use]
pub fn image_extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/gif" => Some(".gif"),
        "image/webp" => Some(".webp"),
        "image/bmp" => Some(".bmp"),
        "image/svg+xml" => Some(".svg"),
        _ => None,
    }
}
