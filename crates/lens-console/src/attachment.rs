//! File attachments on user-authored entries

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Extensions accepted besides `image/*`
const ACCEPTED_EXTENSIONS: [&str; 4] = [".pdf", ".doc", ".docx", ".txt"];

/// Coarse attachment category, used to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// `image/*`
    Image,
    /// PDFs and word-processor documents
    Document,
    /// Anything else
    Other,
}

/// A file attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique id
    pub id: Ulid,
    /// File name as picked
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type as reported by the picker (may be empty)
    pub mime: String,
}

impl Attachment {
    /// Create an attachment with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }

    /// Category by MIME type
    #[must_use]
    pub fn kind(&self) -> AttachmentKind {
        if self.mime.starts_with("image/") {
            AttachmentKind::Image
        } else if self.mime.contains("pdf") || self.mime.contains("document") {
            AttachmentKind::Document
        } else {
            AttachmentKind::Other
        }
    }

    /// Whether the file picker would have offered this file
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        if self.mime.starts_with("image/") {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    }

    /// Human-readable size
    #[must_use]
    pub fn display_size(&self) -> String {
        format_size(self.size)
    }
}

/// Format a byte count as `B`, `KB` or `MB` with one decimal
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn kinds_follow_mime() {
        assert_eq!(Attachment::new("a.png", 1, "image/png").kind(), AttachmentKind::Image);
        assert_eq!(Attachment::new("a.pdf", 1, "application/pdf").kind(), AttachmentKind::Document);
        assert_eq!(
            Attachment::new("a.docx", 1, "application/vnd.openxmlformats-officedocument.wordprocessingml.document").kind(),
            AttachmentKind::Document
        );
        assert_eq!(Attachment::new("a.txt", 1, "text/plain").kind(), AttachmentKind::Other);
    }

    #[test]
    fn accepted_types() {
        assert!(Attachment::new("shot.jpeg", 1, "image/jpeg").is_accepted());
        assert!(Attachment::new("Notes.TXT", 1, "").is_accepted());
        assert!(Attachment::new("notes.docx", 1, "").is_accepted());
        assert!(!Attachment::new("run.exe", 1, "application/octet-stream").is_accepted());
    }
}
