use std::path::PathBuf;

use crate::{ConversionMode, OutputFormat};

/// A conversion ready to be handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_format: OutputFormat,
    pub output_dir: PathBuf,
    pub mode: ConversionMode,
}

impl ConversionRequest {
    pub fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please select a valid input folder")]
    EmptyInput,
}

/// Assembles a request from the current field values.
///
/// A blank output directory falls back to the input path. Paths are trimmed
/// but not otherwise normalized.
pub fn build(
    input_path: &str,
    output_format: &OutputFormat,
    output_dir: &str,
) -> Result<ConversionRequest, ValidationError> {
    let input = input_path.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    let output = match output_dir.trim() {
        "" => input,
        dir => dir,
    };
    Ok(ConversionRequest {
        input_path: PathBuf::from(input),
        output_format: output_format.clone(),
        output_dir: PathBuf::from(output),
        mode: ConversionMode::default(),
    })
}

/// Percent complete of the running conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionProgress {
    percent: u8,
}

impl ConversionProgress {
    /// Values above 100 are clamped.
    pub fn new(percent: u8) -> Self {
        Self {
            percent: percent.min(100),
        }
    }

    pub fn percent(self) -> u8 {
        self.percent
    }
}

/// Terminal outcome of one submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub success: bool,
    pub message: String,
}

impl ConversionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_rejected_whatever_the_rest() {
        for format in [OutputFormat::html(), OutputFormat::new("pdf").unwrap()] {
            for output in ["", "/out", "  "] {
                assert_eq!(build("", &format, output), Err(ValidationError::EmptyInput));
                assert_eq!(build(" \t", &format, output), Err(ValidationError::EmptyInput));
            }
        }
    }

    #[test]
    fn blank_output_defaults_to_input() {
        let request = build("/a", &OutputFormat::html(), "").unwrap();
        assert_eq!(request.input_path, PathBuf::from("/a"));
        assert_eq!(request.output_dir, PathBuf::from("/a"));
        assert_eq!(request.mode, ConversionMode::Batch);

        let request = build(" /a ", &OutputFormat::html(), "   ").unwrap();
        assert_eq!(request.output_dir, PathBuf::from("/a"));
    }

    #[test]
    fn explicit_output_is_kept() {
        let request = build("/a", &OutputFormat::mhtml(), "/b").unwrap();
        assert_eq!(request.output_dir, PathBuf::from("/b"));
        assert_eq!(request.output_format, OutputFormat::mhtml());
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(ConversionProgress::new(250).percent(), 100);
        assert_eq!(ConversionProgress::new(42).percent(), 42);
    }
}
