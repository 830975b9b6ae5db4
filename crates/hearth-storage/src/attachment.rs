//! Attachment upload handling: base64 decode, filename sanitization, asset
//! persistence under a session's `.assets/` sibling directory.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hearth_core::AttachmentRef;
use std::path::Path;

use crate::error::{StorageError, StorageResult};

/// A caller-supplied attachment upload, prior to persistence.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// Stable attachment id.
    pub id: String,
    /// Original filename.
    pub name: String,
    /// MIME type as supplied by the caller.
    pub mime_type: String,
    /// Base64-encoded content. Empty means metadata-only (no bytes to store).
    pub content_base64: String,
}

/// Sanitize a filename: keep `[A-Za-z0-9_.-]`, replace everything else with
/// `-`, collapse runs of `--`, and strip leading/trailing `-` or `.`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
            out.push(c);
        } else {
            out.push('-');
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    let mut prev_dash = false;
    for c in out.chars() {
        if c == '-' {
            if prev_dash {
                continue;
            }
            prev_dash = true;
        } else {
            prev_dash = false;
        }
        collapsed.push(c);
    }

    collapsed
        .trim_matches(|c| c == '-' || c == '.')
        .to_string()
}

/// Decode and persist one attachment upload under `assets_dir`.
///
/// Returns an [`AttachmentRef`] with `relative_path` unset when `upload`
/// carries no content (a metadata-only attachment).
///
/// # Errors
///
/// Returns [`StorageError::InvalidPayload`] if the base64 content cannot be
/// decoded, or [`StorageError::StorageFailure`] if the asset cannot be
/// written.
pub fn persist_attachment(
    assets_dir: &Path,
    session_id: &str,
    upload: &AttachmentUpload,
) -> StorageResult<AttachmentRef> {
    if upload.content_base64.trim().is_empty() {
        return Ok(AttachmentRef {
            id: upload.id.clone(),
            name: upload.name.clone(),
            mime_type: upload.mime_type.clone(),
            size_bytes: 0,
            relative_path: String::new(),
        });
    }

    let bytes = BASE64
        .decode(upload.content_base64.trim())
        .map_err(|e| StorageError::InvalidPayload(format!("invalid attachment base64: {e}")))?;

    std::fs::create_dir_all(assets_dir)?;

    let sanitized = sanitize_filename(&upload.name);
    let filename = format!("{}-{sanitized}", upload.id);
    let path = assets_dir.join(&filename);
    std::fs::write(&path, &bytes)?;

    let relative_path = format!("{session_id}.assets/{filename}");

    Ok(AttachmentRef {
        id: upload.id.clone(),
        name: upload.name.clone(),
        mime_type: upload.mime_type.clone(),
        size_bytes: bytes.len() as u64,
        relative_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_allowed_chars() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
    }

    #[test]
    fn sanitize_replaces_disallowed_chars() {
        assert_eq!(sanitize_filename("my file (final)!.txt"), "my-file-final-.txt");
    }

    #[test]
    fn sanitize_collapses_dash_runs() {
        assert_eq!(sanitize_filename("a   b"), "a-b");
    }

    #[test]
    fn sanitize_strips_leading_trailing_dash_and_dot() {
        assert_eq!(sanitize_filename("-.weird-name-.-"), "weird-name");
    }

    #[test]
    fn sanitize_output_matches_expected_alphabet() {
        for input in ["héllo.txt", "../../etc/passwd", "😀emoji.png", ""] {
            let out = sanitize_filename(input);
            assert!(out
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'));
            assert!(!out.contains("--"));
            assert!(!out.starts_with('-') && !out.starts_with('.'));
            assert!(!out.ends_with('-') && !out.ends_with('.'));
        }
    }

    #[test]
    fn metadata_only_upload_has_no_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let upload = AttachmentUpload {
            id: "att-1".to_string(),
            name: "x.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content_base64: String::new(),
        };
        let attachment = persist_attachment(dir.path(), "session-1", &upload).unwrap();
        assert_eq!(attachment.relative_path, "");
        assert_eq!(attachment.size_bytes, 0);
    }

    #[test]
    fn upload_with_content_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let upload = AttachmentUpload {
            id: "att-1".to_string(),
            name: "hello world.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content_base64: BASE64.encode(b"hello"),
        };
        let attachment = persist_attachment(dir.path(), "session-1", &upload).unwrap();
        assert_eq!(attachment.size_bytes, 5);
        assert_eq!(
            attachment.relative_path,
            "session-1.assets/att-1-hello-world.txt"
        );
        assert!(dir.path().join("att-1-hello-world.txt").exists());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let upload = AttachmentUpload {
            id: "att-1".to_string(),
            name: "x.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content_base64: "not valid base64!!".to_string(),
        };
        assert!(persist_attachment(dir.path(), "session-1", &upload).is_err());
    }
}
