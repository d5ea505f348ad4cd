//! MIME type detection module
//!
//! Returns the Content-Type for a file extension. Lookup only, file contents
//! are never inspected.

/// Served for any extension not in the table
pub const FALLBACK_CONTENT_TYPE: &str = "text/plain";

/// Get MIME Content-Type based on file extension (case-insensitive)
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return FALLBACK_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" => "text/html",
        "js" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" => "image/jpeg",
        "gif" => "image/gif",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
