//! Turns user gestures (a folder dialog or a drag-and-drop) into a folder path.
use std::path::{Path, PathBuf};

use url::Url;

/// Candidate paths carried by a drag-and-drop gesture, in drop order.
///
/// Items are either plain filesystem paths or `file://` URIs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropPayload {
    items: Vec<String>,
}

impl DropPayload {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropRejected {
    #[error("nothing was dropped")]
    Empty,
    #[error("please drop a folder, not a file: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("dropped item is not a local path: {0}")]
    Unreadable(String),
}

/// Interactive folder chooser supplied by the shell.
pub trait FolderPicker {
    /// Returns `None` when the user cancelled.
    fn pick_folder(&self, title: &str) -> Option<PathBuf>;
}

/// Asks `picker` for a folder; anything that is not an existing directory is discarded.
pub fn resolve_via_dialog(picker: &dyn FolderPicker, title: &str) -> Option<PathBuf> {
    picker.pick_folder(title).filter(|path| path.is_dir())
}

/// Extracts a directory from a drop payload. Only the first item is considered.
pub fn resolve_via_drop(payload: &DropPayload) -> Result<PathBuf, DropRejected> {
    let raw = payload.items.first().ok_or(DropRejected::Empty)?;
    let path = parse_drop_item(raw)?;
    if is_directory(&path) {
        Ok(path)
    } else {
        Err(DropRejected::NotADirectory(path))
    }
}

fn parse_drop_item(raw: &str) -> Result<PathBuf, DropRejected> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DropRejected::Empty);
    }
    let is_file_uri = trimmed
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://"));
    if is_file_uri {
        let url = Url::parse(trimmed).map_err(|_| DropRejected::Unreadable(trimmed.to_string()))?;
        return url
            .to_file_path()
            .map_err(|_| DropRejected::Unreadable(trimmed.to_string()));
    }
    Ok(PathBuf::from(trimmed))
}

fn is_directory(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
