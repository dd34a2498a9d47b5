// src/fs/scan.rs
//! Expanding command-line inputs into a play list.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use super::detection::{FileCategory, detect_file_type};

/// Audio files directly inside `dir`, sorted by name (case-insensitive).
pub fn audio_files_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            detect_file_type(p)
                .map(|ft| ft.category == FileCategory::Audio)
                .unwrap_or(false)
        })
        .collect();
    files.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    files
}

/// Directories are replaced by their audio files; anything else is kept
/// as given so the bridge can judge it.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    inputs
        .iter()
        .flat_map(|input| {
            if input.is_dir() {
                audio_files_in(input)
            } else {
                vec![input.clone()]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_expand_to_sorted_audio_files() {
        let dir = std::env::temp_dir().join(format!("fftsounds-scan-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.mp3"), b"\x01\x02").unwrap();
        fs::write(dir.join("A.wav"), b"\x01\x02").unwrap();
        fs::write(dir.join("cover.txt"), b"text").unwrap();

        let files = audio_files_in(&dir);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.wav", "b.mp3"]);

        let single = PathBuf::from("/does/not/exist.mp3");
        let expanded = expand_inputs(&[single.clone(), dir.clone()]);
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[0], single);
    }
}
