//! Archive extractor: picks the conversation JSON entry out of an export zip.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};
use water_core::error::{ImpactError, Result};

/// Leading bytes of a zip local file header.
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// A file literally named `conversations.json`, optionally nested.
fn conversations_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(^|/)conversations\.json$").expect("conversations pattern is valid")
    })
}

/// Returns `true` when `bytes` start with the zip magic number.
pub fn is_zip_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Choose the entry the normaliser should consume from `names`.
///
/// Prefers the first `conversations.json` (any directory, any case), then the
/// first `*.json`. Directory entries (trailing `/`) are never chosen.
pub fn select_conversation_entry<S: AsRef<str>>(names: &[S]) -> Option<usize> {
    let files = || {
        names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.as_ref().ends_with('/'))
    };

    files()
        .find(|(_, name)| conversations_pattern().is_match(name.as_ref()))
        .or_else(|| files().find(|(_, name)| name.as_ref().to_lowercase().ends_with(".json")))
        .map(|(index, _)| index)
}

/// Locate the conversation entry in a zip archive and return its text.
///
/// The entry bytes are decoded as UTF-8 (invalid sequences replaced, a leading
/// byte-order mark removed) and are not validated as JSON here.
pub fn extract_conversation_entry(archive_bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| ImpactError::Archive(format!("zip open failed: {e}")))?;

    // Entry names in central-directory order.
    let mut ordered: Vec<(usize, String)> = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| ImpactError::Archive(format!("cannot read entry {index}: {e}")))?;
        ordered.push((index, entry.name().to_string()));
    }
    debug!("Archive holds {} entries", ordered.len());

    let ordered_names: Vec<&str> = ordered.iter().map(|(_, name)| name.as_str()).collect();
    let position =
        select_conversation_entry(&ordered_names).ok_or(ImpactError::NoConversationFileInArchive)?;
    let (index, name) = &ordered[position];
    info!("Using archive entry {}", name);

    let mut entry = archive
        .by_index(*index)
        .map_err(|e| ImpactError::Archive(format!("cannot open {name}: {e}")))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ImpactError::Archive(format!("cannot read {name}: {e}")))?;

    Ok(decode_text(&bytes))
}

/// Decode bytes as UTF-8, replacing invalid sequences and dropping a BOM.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
