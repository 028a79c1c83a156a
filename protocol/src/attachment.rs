use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Identifier of a staged attachment. Unique within one staging area and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub u64);

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "att-{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileRefError {
    #[error("failed to read metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
}

/// Opaque handle to a file picked by the user.
///
/// Only metadata is captured; the bytes are never read by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.map(str::to_string),
            path: None,
        }
    }

    /// Builds a handle from filesystem metadata. The MIME type is guessed from the extension.
    pub fn from_path(path: &Path) -> Result<Self, FileRefError> {
        let metadata = std::fs::metadata(path).map_err(|source| FileRefError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(FileRefError::NotAFile(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            mime_type: mime_type_for_extension(&name).map(str::to_string),
            name,
            size_bytes: metadata.len(),
            path: Some(path.to_path_buf()),
        })
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Coarse file classification used to pick an icon. Never used for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
    Video,
    Text,
    Code,
    Archive,
    Document,
    Other,
}

impl AttachmentKind {
    /// Classifies by MIME prefix first and falls back to the file extension.
    pub fn classify(file: &FileRef) -> Self {
        if let Some(mime) = file.mime_type.as_deref() {
            if mime.starts_with("image/") {
                return AttachmentKind::Image;
            }
            if mime.starts_with("audio/") {
                return AttachmentKind::Audio;
            }
            if mime.starts_with("video/") {
                return AttachmentKind::Video;
            }
        }

        match file.extension().as_deref() {
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "bmp") => AttachmentKind::Image,
            Some("mp3" | "wav" | "flac" | "ogg" | "m4a") => AttachmentKind::Audio,
            Some("mp4" | "mov" | "mkv" | "webm" | "avi") => AttachmentKind::Video,
            Some("rs" | "py" | "js" | "ts" | "tsx" | "go" | "c" | "h" | "cpp" | "java" | "rb") => {
                AttachmentKind::Code
            }
            Some("zip" | "tar" | "gz" | "tgz" | "7z" | "rar") => AttachmentKind::Archive,
            Some("pdf" | "doc" | "docx" | "odt" | "rtf" | "xls" | "xlsx" | "ppt" | "pptx") => {
                AttachmentKind::Document
            }
            Some("txt" | "md" | "csv" | "json" | "toml" | "yaml" | "yml" | "log") => {
                AttachmentKind::Text
            }
            _ if file
                .mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("text/")) =>
            {
                AttachmentKind::Text
            }
            _ => AttachmentKind::Other,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            AttachmentKind::Image => "🖼",
            AttachmentKind::Audio => "♪",
            AttachmentKind::Video => "▶",
            AttachmentKind::Code => "</>",
            AttachmentKind::Archive => "▤",
            AttachmentKind::Text | AttachmentKind::Document | AttachmentKind::Other => "📄",
        }
    }
}

/// A file staged on a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file: FileRef,
    pub display_size: String,
    pub kind: AttachmentKind,
}

impl Attachment {
    pub fn new(id: AttachmentId, file: FileRef) -> Self {
        Self {
            display_size: format_file_size(file.size_bytes),
            kind: AttachmentKind::classify(&file),
            id,
            file,
        }
    }
}

/// Formats a byte count as `B`, `KB` or `MB` with one decimal place above bytes.
pub fn format_file_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let value = bytes as f64;
    if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / (KIB * KIB))
    }
}

fn mime_type_for_extension(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_sizes_across_thresholds() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(3_145_728), "3.0 MB");
    }

    #[test]
    fn mime_prefix_wins_over_extension() {
        let file = FileRef::new("clip.bin", 10, Some("video/mp4"));
        assert_eq!(AttachmentKind::classify(&file), AttachmentKind::Video);
    }

    #[test]
    fn extension_classifies_when_mime_is_missing() {
        assert_eq!(
            AttachmentKind::classify(&FileRef::new("Photo.JPG", 10, None)),
            AttachmentKind::Image
        );
        assert_eq!(
            AttachmentKind::classify(&FileRef::new("main.rs", 10, None)),
            AttachmentKind::Code
        );
        assert_eq!(
            AttachmentKind::classify(&FileRef::new("notes", 10, Some("text/plain"))),
            AttachmentKind::Text
        );
        assert_eq!(
            AttachmentKind::classify(&FileRef::new("blob", 10, None)),
            AttachmentKind::Other
        );
    }

    #[test]
    fn from_path_reads_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, vec![0u8; 2048]).expect("write file");

        let file = FileRef::from_path(&path).expect("file ref");
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.size_bytes, 2048);
        assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.path.as_deref(), Some(path.as_path()));

        let attachment = Attachment::new(AttachmentId(1), file);
        assert_eq!(attachment.display_size, "2.0 KB");
        assert_eq!(attachment.kind, AttachmentKind::Document);
    }

    #[test]
    fn from_path_rejects_directories_and_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            FileRef::from_path(dir.path()),
            Err(FileRefError::NotAFile(_))
        ));
        assert!(matches!(
            FileRef::from_path(&dir.path().join("missing.txt")),
            Err(FileRefError::Metadata { .. })
        ));
    }
}
