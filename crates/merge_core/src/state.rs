use std::path::Path;

use crate::view_model::{AppViewModel, NotificationView};
use crate::{
    ConversionMode, ConversionProgress, ConversionRequest, ConversionResult, FormatCatalog,
    OutputFormat,
};

pub type NotificationId = u64;

const MAX_LOG_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input_path: String,
    output_dir: String,
    format: OutputFormat,
    catalog: FormatCatalog,
    mode: ConversionMode,
    drop_zone_active: bool,
    in_flight: Option<ConversionRequest>,
    progress: Option<ConversionProgress>,
    notification: Option<Notification>,
    next_notification_id: NotificationId,
    last_result: Option<ConversionResult>,
    log: Vec<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the catalog's first format selected.
    pub fn with_catalog(catalog: FormatCatalog) -> Self {
        Self {
            format: catalog.first().clone(),
            catalog,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            input_path: self.input_path.clone(),
            output_dir: self.output_dir.clone(),
            format: self.format.clone(),
            formats: self.catalog.formats().to_vec(),
            mode: self.mode,
            drop_zone_active: self.drop_zone_active,
            convert_enabled: self.in_flight.is_none(),
            browse_enabled: self.in_flight.is_none(),
            progress: self.progress.map(ConversionProgress::percent),
            notification: self.notification.as_ref().map(|n| NotificationView {
                id: n.id,
                message: n.message.clone(),
                kind: n.kind,
            }),
            log: self.log.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&ConversionRequest> {
        self.in_flight.as_ref()
    }

    /// Result of the most recently finished conversion.
    pub fn last_result(&self) -> Option<&ConversionResult> {
        self.last_result.as_ref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn input_path(&self) -> &str {
        &self.input_path
    }

    pub(crate) fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub(crate) fn format(&self) -> &OutputFormat {
        &self.format
    }

    pub(crate) fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub(crate) fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// Input field takes the folder; an unset output field mirrors it.
    pub(crate) fn apply_input_folder(&mut self, folder: &Path) {
        let text = folder.display().to_string();
        if self.output_dir.trim().is_empty() {
            self.output_dir = text.clone();
        }
        self.push_log(format!("Selected folder: {text}"));
        self.input_path = text;
        self.mark_dirty();
    }

    pub(crate) fn set_input_text(&mut self, text: String) {
        if self.input_path != text {
            self.input_path = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_output_text(&mut self, text: String) {
        if self.output_dir != text {
            self.output_dir = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_format(&mut self, format: OutputFormat) {
        if self.format != format {
            self.format = format;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_mode(&mut self, mode: ConversionMode) {
        if self.mode != mode {
            self.mode = mode;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_drop_zone_active(&mut self, active: bool) {
        if self.drop_zone_active != active {
            self.drop_zone_active = active;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_conversion(&mut self, request: ConversionRequest) {
        self.push_log(format!(
            "Starting conversion of {} to {} in {}",
            request.input_path.display(),
            request.output_format,
            request.output_dir.display()
        ));
        self.in_flight = Some(request);
        self.progress = Some(ConversionProgress::new(0));
        self.mark_dirty();
    }

    pub(crate) fn apply_progress(&mut self, percent: u8) {
        if self.in_flight.is_none() {
            return;
        }
        let progress = ConversionProgress::new(percent);
        if self.progress != Some(progress) {
            self.progress = Some(progress);
            self.mark_dirty();
        }
    }

    /// Retires the in-flight request. Returns false when nothing was in flight.
    pub(crate) fn finish_conversion(&mut self, result: ConversionResult) -> bool {
        if self.in_flight.take().is_none() {
            return false;
        }
        self.progress = None;
        let marker = if result.success { "OK" } else { "FAILED" };
        self.push_log(format!("{marker}: {}", result.message));
        self.last_result = Some(result);
        self.mark_dirty();
        true
    }

    /// Replaces any visible notification and returns the new one's id.
    pub(crate) fn notify(&mut self, kind: NotificationKind, message: String) -> NotificationId {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notification = Some(Notification { id, message, kind });
        self.mark_dirty();
        id
    }

    pub(crate) fn expire_notification(&mut self, id: NotificationId) {
        if self.notification.as_ref().map(|n| n.id) == Some(id) {
            self.notification = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
        self.mark_dirty();
    }
}
