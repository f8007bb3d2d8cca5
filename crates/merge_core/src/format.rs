use std::fmt;
use std::str::FromStr;

/// Name of an output format, e.g. `html`.
///
/// The set of formats is open: which ones a user may select is decided by a
/// [`FormatCatalog`], and which ones can actually be written is decided by the
/// conversion backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputFormat(String);

impl OutputFormat {
    /// Normalizes `name` (trimmed, lower-case, leading dot removed).
    /// Returns `None` for a blank name.
    pub fn new(name: &str) -> Option<Self> {
        let normalized = name.trim().trim_start_matches('.').trim().to_ascii_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn html() -> Self {
        Self("html".to_string())
    }

    pub fn mhtml() -> Self {
        Self("mhtml".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension used for the output file.
    pub fn extension(&self) -> &str {
        &self.0
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::html()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("output format name is empty")]
pub struct EmptyFormatName;

impl FromStr for OutputFormat {
    type Err = EmptyFormatName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or(EmptyFormatName)
    }
}

/// The fixed, externally configured set of formats offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCatalog {
    formats: Vec<OutputFormat>,
}

impl FormatCatalog {
    /// Builds a catalog, dropping duplicates while keeping the given order.
    /// Falls back to the default catalog when `formats` is empty.
    pub fn new(formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        let mut unique: Vec<OutputFormat> = Vec::new();
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        if unique.is_empty() {
            return Self::default();
        }
        Self { formats: unique }
    }

    pub fn contains(&self, format: &OutputFormat) -> bool {
        self.formats.contains(format)
    }

    /// First entry; the format selected when nothing else was chosen.
    pub fn first(&self) -> &OutputFormat {
        &self.formats[0]
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::html(), OutputFormat::mhtml()],
        }
    }
}

/// How the input folder is treated by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Convert each subfolder when the folder holds only subfolders,
    /// otherwise convert the folder itself.
    #[default]
    Batch,
    /// Convert the folder itself.
    Single,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_normalized() {
        assert_eq!(OutputFormat::new(" .MHTML ").unwrap(), OutputFormat::mhtml());
        assert_eq!("Pdf".parse::<OutputFormat>().unwrap().as_str(), "pdf");
        assert!(OutputFormat::new("  ").is_none());
        assert!(OutputFormat::new(".").is_none());
    }

    #[test]
    fn catalog_dedupes_and_never_empty() {
        let catalog = FormatCatalog::new(vec![
            OutputFormat::mhtml(),
            OutputFormat::html(),
            OutputFormat::mhtml(),
        ]);
        assert_eq!(catalog.formats(), &[OutputFormat::mhtml(), OutputFormat::html()]);
        assert_eq!(catalog.first(), &OutputFormat::mhtml());

        let empty = FormatCatalog::new(Vec::new());
        assert_eq!(empty, FormatCatalog::default());
    }
}
