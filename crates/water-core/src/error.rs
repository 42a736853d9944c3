use std::path::PathBuf;
use thiserror::Error;

/// Hint shown alongside any error caused by the user-supplied export.
pub const EXPORT_FORMAT_HINT: &str =
    "Please check that you uploaded the conversations.json file (or the .zip archive) from your chat export.";

/// All errors produced while loading and analysing a conversation export.
#[derive(Error, Debug)]
pub enum ImpactError {
    /// The export text is not syntactically valid JSON.
    #[error("Invalid JSON file. Please ensure you uploaded a valid conversation.json file ({0})")]
    InvalidJson(#[from] serde_json::Error),

    /// The JSON root is a scalar or null instead of an object or array.
    #[error("Invalid JSON structure: expected an object or array at the root, found {0}")]
    InvalidStructure(&'static str),

    /// No message-bearing collection could be located, or it was empty.
    #[error("No messages found in the conversation file. Supported formats: messages array, mapping object, or direct array.")]
    NoMessagesFound,

    /// A collection was located but every entry had empty text.
    #[error("No valid messages with content found in the conversation file. Please check the file format.")]
    NoValidContent,

    /// The archive holds neither a `conversations.json` nor any `.json` entry.
    #[error("No conversations.json or other .json file found in the archive")]
    NoConversationFileInArchive,

    /// The archive itself could not be opened or an entry could not be read.
    #[error("Failed to read archive: {0}")]
    Archive(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is neither a `.json` file nor a zip archive.
    #[error("Unsupported file {0}: please upload a JSON file or a .zip export")]
    UnsupportedFile(PathBuf),
}

/// Payload-free discriminant of [`ImpactError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidJson,
    InvalidStructure,
    NoMessagesFound,
    NoValidContent,
    NoConversationFileInArchive,
    Archive,
    FileRead,
    UnsupportedFile,
}

impl ImpactError {
    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImpactError::InvalidJson(_) => ErrorKind::InvalidJson,
            ImpactError::InvalidStructure(_) => ErrorKind::InvalidStructure,
            ImpactError::NoMessagesFound => ErrorKind::NoMessagesFound,
            ImpactError::NoValidContent => ErrorKind::NoValidContent,
            ImpactError::NoConversationFileInArchive => ErrorKind::NoConversationFileInArchive,
            ImpactError::Archive(_) => ErrorKind::Archive,
            ImpactError::FileRead { .. } => ErrorKind::FileRead,
            ImpactError::UnsupportedFile(_) => ErrorKind::UnsupportedFile,
        }
    }

    /// Returns the export-format hint for errors caused by the input itself.
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::InvalidJson
            | ErrorKind::InvalidStructure
            | ErrorKind::NoMessagesFound
            | ErrorKind::NoValidContent
            | ErrorKind::NoConversationFileInArchive
            | ErrorKind::Archive
            | ErrorKind::UnsupportedFile => Some(EXPORT_FORMAT_HINT),
            ErrorKind::FileRead => None,
        }
    }
}

/// Convenience alias used throughout the water-impact crates.
pub type Result<T> = std::result::Result<T, ImpactError>;
