use anyhow::{Result, anyhow};
use std::path::Path;

/// Extensions an uploaded admission document may carry.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// MIME types matching the allowed extensions, used when the content is
/// recognizable by magic bytes.
const ALLOWED_MIMES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Sanitizes an uploaded filename to prevent path traversal.
/// Returns the bare filename component or an error if nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() || name == "." || name == ".." {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: format!("Invalid filename '{}'.", filename),
        }));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename contains control characters.".to_string(),
        }));
    }

    Ok(name.to_string())
}

/// Validates the extension of an uploaded document against the allowlist.
pub fn validate_extension(filename: &str) -> Result<()> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(());
    }

    Err(anyhow!(ValidationError {
        code: "INVALID_EXTENSION",
        message: format!(
            "File '{}' has a disallowed extension. Allowed: jpg, jpeg, png, pdf.",
            filename
        ),
    }))
}

/// Full validation of one uploaded document: filename, extension, and a
/// magic-byte check when the content is recognizable. Unrecognizable content
/// passes; the extension allowlist remains the gate.
pub fn validate_document(filename: &str, data: &[u8]) -> Result<String> {
    let sanitized = sanitize_filename(filename)?;
    validate_extension(&sanitized)?;

    if let Some(kind) = infer::get(data) {
        if !ALLOWED_MIMES.contains(&kind.mime_type()) {
            return Err(anyhow!(ValidationError {
                code: "CONTENT_MISMATCH",
                message: format!(
                    "File '{}' does not look like an allowed document type (detected {}).",
                    sanitized,
                    kind.mime_type()
                ),
            }));
        }
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(validate_extension("photo.jpg").is_ok());
        assert!(validate_extension("photo.JPEG").is_ok());
        assert!(validate_extension("scan.png").is_ok());
        assert!(validate_extension("transcript.pdf").is_ok());
    }

    #[test]
    fn test_disallowed_extensions() {
        assert!(validate_extension("malware.exe").is_err());
        assert!(validate_extension("notes.txt").is_err());
        assert!(validate_extension("noextension").is_err());
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(
            sanitize_filename("../../etc/passwd.png").unwrap(),
            "passwd.png"
        );
        assert_eq!(sanitize_filename("dir/photo.jpg").unwrap(), "photo.jpg");
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn test_validate_document_magic_bytes() {
        // PNG header with a .png name passes
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert!(validate_document("photo.png", &png).is_ok());

        // An executable header behind an allowed extension is rejected
        let elf = [0x7F, 0x45, 0x4C, 0x46, 2, 1, 1, 0, 0, 0, 0, 0];
        assert!(validate_document("photo.png", &elf).is_err());

        // Unrecognizable content passes on extension alone
        assert!(validate_document("scan.pdf", b"tiny").is_ok());
    }
}
