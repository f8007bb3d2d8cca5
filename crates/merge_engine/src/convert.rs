use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::decode::{decode_html, declare_utf8};
use crate::filename::output_file_name;
use crate::inline::{InlineStats, ResourceInliner};
use crate::inspect::{summarize_page, ResourceKind};
use crate::mhtml::build_mhtml;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::EngineFormat;

const MAIN_PAGE_NAMES: &[&str] = &["index.html", "index.htm"];

/// Knobs shared by every conversion run by one backend.
#[derive(Clone)]
pub struct MergeSettings {
    /// RFC 2822 timestamp written into MHTML headers.
    pub clock: Arc<dyn Fn() -> String + Send + Sync>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            clock: Arc::new(|| chrono::Local::now().to_rfc2822()),
        }
    }
}

impl fmt::Debug for MergeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeSettings").finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("not a folder: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("no HTML file found in {}", .0.display())]
    NoHtmlFile(PathBuf),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Persist(#[from] PersistError),
}

/// Result of converting one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOutcome {
    pub folder: PathBuf,
    pub main_page: PathBuf,
    pub output_path: PathBuf,
    pub bytes_written: u64,
    pub stats: InlineStats,
}

/// Picks the page to convert: `index.html` when present, otherwise the first
/// `.html`/`.htm` file in name order.
pub fn find_main_page(folder: &Path) -> Result<PathBuf, ConvertError> {
    find_main_page_excluding(folder, None)
}

/// Like [`find_main_page`], ignoring a file named `skip` (case-insensitively).
pub(crate) fn find_main_page_excluding(
    folder: &Path,
    skip: Option<&str>,
) -> Result<PathBuf, ConvertError> {
    let read_err = |source| ConvertError::Read {
        path: folder.to_path_buf(),
        source,
    };
    let mut pages: Vec<PathBuf> = fs::read_dir(folder)
        .map_err(read_err)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| is_html_file(p))
        .filter(|p| match (skip, p.file_name().and_then(|n| n.to_str())) {
            (Some(skip), Some(name)) => !name.eq_ignore_ascii_case(skip),
            _ => true,
        })
        .collect();
    pages.sort();

    for name in MAIN_PAGE_NAMES {
        if let Some(page) = pages.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        }) {
            return Ok(page.clone());
        }
    }
    pages
        .into_iter()
        .next()
        .ok_or_else(|| ConvertError::NoHtmlFile(folder.to_path_buf()))
}

pub(crate) fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Converts one folder into `{output_dir}/{folder_name}.{ext}`.
///
/// Without an output directory the file lands next to the folder.
pub fn convert_folder(
    folder: &Path,
    format: EngineFormat,
    output_dir: Option<&Path>,
    settings: &MergeSettings,
) -> Result<FolderOutcome, ConvertError> {
    let file_name = output_file_name(&folder_name(folder), format.extension());
    convert_folder_as(folder, format, output_dir, &file_name, settings)
}

/// [`convert_folder`] with the output file name chosen by the caller.
pub(crate) fn convert_folder_as(
    folder: &Path,
    format: EngineFormat,
    output_dir: Option<&Path>,
    file_name: &str,
    settings: &MergeSettings,
) -> Result<FolderOutcome, ConvertError> {
    if !folder.is_dir() {
        return Err(ConvertError::NotADirectory(folder.to_path_buf()));
    }
    let folder_name = folder_name(folder);
    let target_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => folder
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| folder.to_path_buf()),
    };
    engine_info!(
        "converting {} to {}",
        folder.display(),
        target_dir.join(file_name).display()
    );

    // An earlier run may have written this folder's output into the folder itself.
    let skip = same_dir(folder, &target_dir).then_some(file_name);
    let main_page = find_main_page_excluding(folder, skip)?;
    engine_debug!("main page: {}", main_page.display());
    let bytes = fs::read(&main_page).map_err(|source| ConvertError::Read {
        path: main_page.clone(),
        source,
    })?;
    let decoded = decode_html(&bytes);
    if decoded.had_errors {
        engine_warn!(
            "{} is not valid {}; malformed bytes were replaced",
            main_page.display(),
            decoded.encoding_label
        );
    }

    let source_html = declare_utf8(&decoded.html);
    let summary = summarize_page(&source_html);
    engine_debug!(
        "page references {} images, {} stylesheets, {} scripts",
        summary.count(ResourceKind::Image),
        summary.count(ResourceKind::Stylesheet),
        summary.count(ResourceKind::Script)
    );

    let page_dir = main_page.parent().unwrap_or(folder);
    let (html, stats) = ResourceInliner::new(page_dir).inline_all(&source_html);

    let content = match format {
        EngineFormat::Html => html,
        EngineFormat::Mhtml => {
            let subject = summary.title.as_deref().unwrap_or(&folder_name);
            build_mhtml(&html, subject, &(settings.clock)())
        }
    };

    let written = AtomicFileWriter::new(target_dir).write(file_name, content)?;
    engine_info!(
        "wrote {} ({} bytes, {} resources inlined)",
        written.path.display(),
        written.bytes,
        stats.inlined()
    );

    Ok(FolderOutcome {
        folder: folder.to_path_buf(),
        main_page,
        output_path: written.path,
        bytes_written: written.bytes,
        stats,
    })
}

fn same_dir(a: &Path, b: &Path) -> bool {
    a == b
        || matches!(
            (fs::canonicalize(a), fs::canonicalize(b)),
            (Ok(a), Ok(b)) if a == b
        )
}

pub(crate) fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            fs::canonicalize(folder)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "untitled".to_string())
}
