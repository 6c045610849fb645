use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use crate::utils::StampError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    JPEG,
    TIFF,
    PNG,
    PDF,
    MOV,
    MP4,
}

/// Broad family a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Document,
    Video,
}

lazy_static! {
    static ref EXTENSION_MAP: HashMap<&'static str, MediaFormat> = {
        let mut map = HashMap::new();
        for format in MediaFormat::ALL {
            for ext in format.extensions() {
                map.insert(*ext, format);
            }
        }
        map
    };
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 6] = [
        Self::JPEG,
        Self::TIFF,
        Self::PNG,
        Self::PDF,
        Self::MOV,
        Self::MP4,
    ];

    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::TIFF => &["tif", "tiff"],
            Self::PNG => &["png"],
            Self::PDF => &["pdf"],
            Self::MOV => &["mov"],
            Self::MP4 => &["mp4"],
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::JPEG | Self::TIFF | Self::PNG => MediaKind::Image,
            Self::PDF => MediaKind::Document,
            Self::MOV | Self::MP4 => MediaKind::Video,
        }
    }

    /// Whether a resize limit applies to this format.
    ///
    /// Fixed-layout documents keep their page geometry.
    pub fn is_resizable(&self) -> bool {
        self.kind() != MediaKind::Document
    }
}

impl FromStr for MediaFormat {
    type Err = StampError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        EXTENSION_MAP
            .get(ext.as_str())
            .copied()
            .ok_or_else(|| StampError::format(format!("Unsupported media format: {}", ext)))
    }
}

/// Get format from file extension
pub fn format_from_path(path: impl AsRef<Path>) -> Result<MediaFormat, StampError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| StampError::format(
            format!("File has no extension: {}", path.display())
        ))?;

    MediaFormat::from_str(ext)
}

/// Returns `true` when the file at `path` has a supported extension.
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    format_from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(format_from_path("a/B.JPG").unwrap(), MediaFormat::JPEG);
        assert_eq!(format_from_path("clip.Mp4").unwrap(), MediaFormat::MP4);
        assert_eq!(MediaFormat::from_str(".tiff").unwrap(), MediaFormat::TIFF);
    }

    #[test]
    fn unknown_or_missing_extension_is_rejected() {
        assert!(matches!(format_from_path("notes.txt"), Err(StampError::Format(_))));
        assert!(matches!(format_from_path("README"), Err(StampError::Format(_))));
        assert!(!is_supported("archive.zip"));
    }

    #[test]
    fn only_documents_skip_resizing() {
        for format in MediaFormat::ALL {
            assert_eq!(format.is_resizable(), format != MediaFormat::PDF, "{format:?}");
        }
        assert_eq!("MOV".parse::<MediaFormat>().unwrap(), MediaFormat::MOV);
    }
}
