use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Extensions the backend can ingest.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".pdf", ".ppt", ".pptx"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("Unsupported file type. Allowed: .pdf, .ppt, .pptx")]
    UnsupportedType { name: String },

    #[error("The selected file is empty")]
    EmptyFile,
}

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Ppt,
    Pptx,
}

impl DocumentKind {
    /// Classify a file by its extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::UnsupportedType` for anything outside the allow-list.
    pub fn from_file_name(name: &str) -> Result<Self, DocumentError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("ppt") => Ok(Self::Ppt),
            Some("pptx") => Ok(Self::Pptx),
            _ => Err(DocumentError::UnsupportedType {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Ppt => "application/vnd.ms-powerpoint",
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }
}

/// A file staged for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    name: String,
    bytes: Vec<u8>,
}

impl DocumentFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Check the file against the upload allow-list.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` for a disallowed extension or an empty file.
    pub fn validate(&self) -> Result<DocumentKind, DocumentError> {
        let kind = DocumentKind::from_file_name(&self.name)?;
        if self.bytes.is_empty() {
            return Err(DocumentError::EmptyFile);
        }
        Ok(kind)
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}
