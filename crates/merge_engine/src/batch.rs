use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};

use crate::convert::{
    convert_folder_as, folder_name, is_html_file, ConvertError, FolderOutcome, MergeSettings,
};
use crate::filename::sanitize_stem;
use crate::EngineFormat;

/// Receives percent-complete updates while a conversion runs.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, percent: u8);
}

#[derive(Debug)]
pub struct BatchItem {
    pub folder: PathBuf,
    pub result: Result<FolderOutcome, ConvertError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn converted(&self) -> impl Iterator<Item = &FolderOutcome> {
        self.items.iter().filter_map(|item| item.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ConvertError)> {
        self.items
            .iter()
            .filter_map(|item| item.result.as_ref().err().map(|e| (item.folder.as_path(), e)))
    }
}

/// Folders a batch run over `folder` converts.
///
/// When `folder` holds subfolders but no HTML page of its own, each visible
/// subfolder is converted (in name order); otherwise `folder` itself is.
/// Pages that a previous batch over the same subfolders wrote into `folder`
/// do not count as its own.
pub fn plan_batch(folder: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    if !folder.is_dir() {
        return Err(ConvertError::NotADirectory(folder.to_path_buf()));
    }
    let mut subfolders = Vec::new();
    let mut pages = Vec::new();
    let entries = fs::read_dir(folder).map_err(|source| ConvertError::Read {
        path: folder.to_path_buf(),
        source,
    })?;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden {
                subfolders.push(path);
            }
        } else if file_type.is_file() && is_html_file(&path) {
            pages.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    if subfolders.is_empty() {
        return Ok(vec![folder.to_path_buf()]);
    }
    subfolders.sort();
    let earlier_outputs: HashSet<String> = output_names(&subfolders, EngineFormat::Html)
        .into_iter()
        .map(|name| name.to_lowercase())
        .collect();
    let has_page = pages
        .iter()
        .any(|page| !earlier_outputs.contains(&page.to_lowercase()));
    if has_page {
        return Ok(vec![folder.to_path_buf()]);
    }
    Ok(subfolders)
}

/// Output file names for `folders`, in order. A name already taken
/// (case-insensitively) gets a `-2`, `-3`, ... suffix.
pub fn output_names(folders: &[PathBuf], format: EngineFormat) -> Vec<String> {
    let mut taken = HashSet::new();
    folders
        .iter()
        .map(|folder| {
            let stem = sanitize_stem(&folder_name(folder));
            let mut name = format!("{stem}.{}", format.extension());
            let mut n = 2;
            while !taken.insert(name.to_lowercase()) {
                name = format!("{stem}-{n}.{}", format.extension());
                n += 1;
            }
            if n > 2 {
                engine_warn!("{} clashes with an earlier output, writing {}", folder.display(), name);
            }
            name
        })
        .collect()
}

/// Converts every folder from [`plan_batch`], reporting `(i + 1) * 100 / total` after
/// each one. A failing folder is recorded and the batch moves on.
pub fn batch_convert(
    folder: &Path,
    format: EngineFormat,
    output_dir: Option<&Path>,
    settings: &MergeSettings,
    sink: &dyn ProgressSink,
) -> Result<BatchReport, ConvertError> {
    let plan = plan_batch(folder)?;
    let total = plan.len();
    engine_info!("batch over {}: {} folder(s)", folder.display(), total);

    let names = output_names(&plan, format);
    let mut report = BatchReport::default();
    for (index, (item, file_name)) in plan.into_iter().zip(names).enumerate() {
        let result = convert_folder_as(&item, format, output_dir, &file_name, settings);
        if let Err(err) = &result {
            engine_warn!("skipping {}: {}", item.display(), err);
        }
        report.items.push(BatchItem {
            folder: item,
            result,
        });
        sink.progress(((index + 1) * 100 / total) as u8);
    }
    Ok(report)
}
