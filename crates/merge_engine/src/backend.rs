use std::path::Path;

use engine_logging::engine_info;
use merge_core::{ConversionMode, ConversionRequest, ConversionResult};

use crate::batch::{batch_convert, BatchReport, ProgressSink};
use crate::convert::{convert_folder, ConvertError, MergeSettings};
use crate::EngineFormat;

/// The engine behind a [`crate::ConversionClient`].
///
/// Runs one request to completion on the worker thread, reporting progress
/// through `sink`, and returns the single terminal result.
pub trait ConversionBackend: Send + Sync {
    fn run(&self, request: &ConversionRequest, sink: &dyn ProgressSink) -> ConversionResult;
}

/// Merges HTML folders into single files on disk.
#[derive(Debug, Clone, Default)]
pub struct FolderMergeBackend {
    settings: MergeSettings,
}

impl FolderMergeBackend {
    pub fn new(settings: MergeSettings) -> Self {
        Self { settings }
    }
}

impl ConversionBackend for FolderMergeBackend {
    fn run(&self, request: &ConversionRequest, sink: &dyn ProgressSink) -> ConversionResult {
        sink.progress(0);
        let Some(format) = EngineFormat::from_output(&request.output_format) else {
            return ConversionResult::failure(
                ConvertError::UnsupportedFormat(request.output_format.to_string()).to_string(),
            );
        };
        let output_dir = Some(request.output_dir.as_path());

        match request.mode {
            ConversionMode::Single => {
                sink.progress(50);
                match convert_folder(&request.input_path, format, output_dir, &self.settings) {
                    Ok(outcome) => {
                        sink.progress(100);
                        ConversionResult::success(format!(
                            "Converted {} into {}",
                            request.input_path.display(),
                            outcome.output_path.display()
                        ))
                    }
                    Err(err) => ConversionResult::failure(err.to_string()),
                }
            }
            ConversionMode::Batch => match batch_convert(
                &request.input_path,
                format,
                output_dir,
                &self.settings,
                sink,
            ) {
                Ok(report) => summarize(&report, &request.output_dir),
                Err(err) => ConversionResult::failure(err.to_string()),
            },
        }
    }
}

/// Success as soon as one folder converted; the message names what failed.
pub fn summarize(report: &BatchReport, output_dir: &Path) -> ConversionResult {
    let total = report.total();
    let converted: Vec<_> = report.converted().collect();
    let failures: Vec<_> = report.failures().collect();
    engine_info!(
        "batch finished: {} converted, {} failed",
        converted.len(),
        failures.len()
    );

    match (converted.len(), failures.first()) {
        (0, Some((folder, err))) if total == 1 => {
            ConversionResult::failure(format!("{}: {err}", folder.display()))
        }
        (0, Some((folder, err))) => ConversionResult::failure(format!(
            "No folder could be converted ({total} failed); first error: {}: {err}",
            folder.display()
        )),
        (0, None) => ConversionResult::failure("Nothing to convert"),
        (1, None) => ConversionResult::success(format!(
            "Converted into {}",
            converted[0].output_path.display()
        )),
        (n, None) => {
            ConversionResult::success(format!("Converted {n} folders into {}", output_dir.display()))
        }
        (n, Some(_)) => ConversionResult::success(format!(
            "Converted {n} of {total} folders into {}; {} failed",
            output_dir.display(),
            failures.len()
        )),
    }
}
