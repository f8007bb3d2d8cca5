use crate::{ConversionMode, NotificationId, NotificationKind, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input_path: String,
    pub output_dir: String,
    pub format: OutputFormat,
    pub formats: Vec<OutputFormat>,
    pub mode: ConversionMode,
    pub drop_zone_active: bool,
    pub convert_enabled: bool,
    pub browse_enabled: bool,
    /// `Some` while a conversion runs.
    pub progress: Option<u8>,
    pub notification: Option<NotificationView>,
    pub log: Vec<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}
