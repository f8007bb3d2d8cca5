//! html_merge core: pure state machine, conversion requests and path resolution.
mod effect;
mod format;
mod msg;
mod request;
mod resolver;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, NOTIFICATION_TIMEOUT};
pub use format::{ConversionMode, EmptyFormatName, FormatCatalog, OutputFormat};
pub use msg::Msg;
pub use request::{
    build, ConversionProgress, ConversionRequest, ConversionResult, ValidationError,
};
pub use resolver::{resolve_via_dialog, resolve_via_drop, DropPayload, DropRejected, FolderPicker};
pub use state::{AppState, Notification, NotificationId, NotificationKind};
pub use update::update;
pub use view_model::{AppViewModel, NotificationView};
