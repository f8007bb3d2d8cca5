use merge_core::{ConversionProgress, ConversionResult, OutputFormat};

pub type RequestId = u64;

/// Formats the folder merger knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFormat {
    /// A single HTML file with every local resource inlined.
    Html,
    /// The inlined page wrapped in a `multipart/related` MIME envelope.
    Mhtml,
}

impl EngineFormat {
    pub fn from_output(format: &OutputFormat) -> Option<Self> {
        match format.as_str() {
            "html" | "htm" => Some(Self::Html),
            "mhtml" | "mht" => Some(Self::Mhtml),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Mhtml => "mhtml",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        request_id: RequestId,
        progress: ConversionProgress,
    },
    Finished {
        request_id: RequestId,
        result: ConversionResult,
    },
}
