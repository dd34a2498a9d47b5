// src/fs/detection.rs
//! File type detection using magic numbers and extension-based fallback.

use std::path::Path;

use anyhow::Result;
use infer::{Infer, MatcherType};
use mime_guess::MimeGuess;

/// High-level file categories. Only audio is playable.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileCategory {
    Audio,
    Other,
}

/// Holds a detected MIME type + category.
#[derive(Debug)]
pub struct FileType {
    pub mime: String,
    pub category: FileCategory,
}

/// Detect MIME type & category for a given file path.
pub fn detect_file_type(path: &Path) -> Result<FileType> {
    // 1. Try magic-number sniffing
    if let Some(kind) = Infer::new().get_from_path(path)? {
        let category = match kind.matcher_type() {
            MatcherType::Audio => FileCategory::Audio,
            _ => FileCategory::Other,
        };
        return Ok(FileType {
            mime: kind.mime_type().to_string(),
            category,
        });
    }

    // 2. Fallback to extension-based lookup
    let mime = MimeGuess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let category = match mime.split('/').next().unwrap_or("application") {
        "audio" => FileCategory::Audio,
        _ => FileCategory::Other,
    };

    Ok(FileType { mime, category })
}
