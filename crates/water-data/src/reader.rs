//! Export file loading.
//!
//! Accepts either a raw `.json` export or a `.zip` archive and hands back the
//! conversation JSON as text for [`crate::normalizer`].

use std::path::Path;

use tracing::debug;
use water_core::error::{ImpactError, Result};

use crate::archive::{decode_text, extract_conversation_entry, is_zip_archive};

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the conversation JSON text out of the export at `path`.
///
/// Zip archives are recognised by extension or by their magic number; any
/// other file must carry a `.json` extension.
pub fn load_export_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| ImpactError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    match extension_of(path).as_deref() {
        Some("zip") => extract_conversation_entry(&bytes),
        _ if is_zip_archive(&bytes) => {
            debug!("{} looks like a zip archive", path.display());
            extract_conversation_entry(&bytes)
        }
        Some("json") => Ok(decode_text(&bytes)),
        _ => Err(ImpactError::UnsupportedFile(path.to_path_buf())),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Lower-cased file extension, if any.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use water_core::error::ErrorKind;
    use zip::write::SimpleFileOptions;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).expect("write fixture");
        path
    }

    fn zip_bytes(name: &str, content: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(name, SimpleFileOptions::default())
            .expect("start file");
        zip.write_all(content.as_bytes()).expect("write entry");
        zip.finish().expect("finish zip").into_inner()
    }

    #[test]
    fn test_load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "export.JSON", b"\xEF\xBB\xBF[{\"text\":\"hi\"}]");
        assert_eq!(load_export_text(&path).unwrap(), r#"[{"text":"hi"}]"#);
    }

    #[test]
    fn test_load_zip_file() {
        let dir = TempDir::new().unwrap();
        let bytes = zip_bytes("conversations.json", r#"{"messages":[]}"#);
        let path = write_file(&dir, "export.zip", &bytes);
        assert_eq!(load_export_text(&path).unwrap(), r#"{"messages":[]}"#);
    }

    #[test]
    fn test_load_zip_detected_by_magic() {
        let dir = TempDir::new().unwrap();
        let bytes = zip_bytes("chat.json", "[]");
        let path = write_file(&dir, "download.bin", &bytes);
        assert_eq!(load_export_text(&path).unwrap(), "[]");
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", b"[]");
        let err = load_export_text(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFile);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_export_text(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileRead);
    }
}
