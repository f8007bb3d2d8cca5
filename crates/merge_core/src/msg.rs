use std::path::PathBuf;

use crate::{ConversionMode, DropRejected, NotificationId, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to browse for the input folder.
    BrowseInputClicked,
    /// User asked to browse for the output directory.
    BrowseOutputClicked,
    /// The input folder dialog returned a directory.
    FolderResolved(PathBuf),
    /// The output folder dialog returned a directory.
    OutputDirResolved(PathBuf),
    /// A drag entered the drop zone.
    DragEntered,
    /// A drag left the drop zone without dropping.
    DragLeft,
    /// Something was dropped; the shell already ran the path resolver on it.
    FolderDropped(Result<PathBuf, DropRejected>),
    /// User edited the input path field.
    InputEdited(String),
    /// User edited the output directory field.
    OutputEdited(String),
    /// User picked an output format.
    FormatSelected(OutputFormat),
    /// User picked batch or single-folder conversion.
    ModeSelected(ConversionMode),
    /// User clicked Convert.
    ConvertClicked,
    /// The client refused the submission before any work started.
    SubmitRejected(String),
    /// Backend progress for the in-flight conversion.
    Progress(u8),
    /// Backend completion for the in-flight conversion.
    ConversionFinished { success: bool, message: String },
    /// The auto-hide timer of a notification fired.
    NotificationExpired { id: NotificationId },
    /// UI/render tick.
    Tick,
}
