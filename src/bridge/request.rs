// src/bridge/request.rs
//! Turning host-supplied file paths into a playable start command.

use std::path::Path;

use log::warn;
use url::Url;

use crate::session::StartCommand;

/// One resolved entry of a [`PlaybackRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestItem {
    pub uri: Url,
    pub display_name: String,
}

/// Existing files from a play call, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    items: Vec<RequestItem>,
}

impl PlaybackRequest {
    /// Resolve `paths`, skipping blank entries and files that do not exist.
    /// `None` when nothing playable is left.
    pub fn resolve<P: AsRef<Path>>(paths: &[P]) -> Option<Self> {
        let items: Vec<RequestItem> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path: &&Path| !path.as_os_str().is_empty())
            .filter_map(resolve_one)
            .collect();
        (!items.is_empty()).then_some(Self { items })
    }

    /// Split a delimited list and resolve it like [`PlaybackRequest::resolve`].
    pub fn from_delimited(list: &str, delimiter: &str) -> Option<Self> {
        let paths: Vec<&str> = list
            .split(delimiter)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        Self::resolve(paths.as_slice())
    }

    pub fn items(&self) -> &[RequestItem] {
        &self.items
    }

    pub fn into_start_command(self) -> StartCommand {
        let (uris, display_names) = self
            .items
            .into_iter()
            .map(|item| (item.uri, item.display_name))
            .unzip();
        StartCommand {
            uris,
            display_names,
        }
    }
}

fn resolve_one(path: &Path) -> Option<RequestItem> {
    if !path.exists() {
        warn!("Skipping missing file {}", path.display());
        return None;
    }
    // Links stay unresolved so the name matches what the caller passed
    let absolute = match std::path::absolute(path) {
        Ok(p) => p,
        Err(e) => {
            warn!("Skipping {}: {e}", path.display());
            return None;
        }
    };
    let uri = match Url::from_file_path(&absolute) {
        Ok(uri) => uri,
        Err(()) => {
            warn!("Skipping {}: cannot form a file URI", absolute.display());
            return None;
        }
    };
    let display_name = path
        .file_name()
        .or_else(|| absolute.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| absolute.display().to_string());
    Some(RequestItem { uri, display_name })
}
