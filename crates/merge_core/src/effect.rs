use std::time::Duration;

use crate::{ConversionRequest, NotificationId};

/// How long a notification stays visible.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the input folder dialog; answer with `Msg::FolderResolved`.
    PickInputFolder,
    /// Open the output folder dialog; answer with `Msg::OutputDirResolved`.
    PickOutputFolder,
    /// Hand the request to the conversion client.
    SubmitConversion(ConversionRequest),
    /// Send `Msg::NotificationExpired { id }` after `after`.
    ScheduleNotificationExpiry { id: NotificationId, after: Duration },
}
