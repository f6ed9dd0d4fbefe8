/// Guess a MIME type from a file name's extension (case-insensitive).
/// Returns `None` for unknown or missing extensions.
pub fn guess_type(filename: &str) -> Option<&'static str> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" | "text" | "conf" | "log" | "asc" => "text/plain",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "xml" | "xsl" => "text/xml",
        "js" => "text/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "ps" | "eps" => "application/postscript",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "sh" => "application/x-sh",
        "py" => "text/x-python",
        "sql" => "application/sql",
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/vnd.microsoft.icon",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}
