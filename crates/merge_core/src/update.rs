use crate::effect::NOTIFICATION_TIMEOUT;
use crate::{build, AppState, ConversionResult, Effect, Msg, NotificationKind};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::BrowseInputClicked | Msg::BrowseOutputClicked if state.is_busy() => Vec::new(),
        Msg::BrowseInputClicked => vec![Effect::PickInputFolder],
        Msg::BrowseOutputClicked => vec![Effect::PickOutputFolder],
        Msg::FolderResolved(folder) => {
            state.apply_input_folder(&folder);
            Vec::new()
        }
        Msg::OutputDirResolved(dir) => {
            state.set_output_text(dir.display().to_string());
            Vec::new()
        }
        Msg::DragEntered => {
            state.set_drop_zone_active(true);
            Vec::new()
        }
        Msg::DragLeft => {
            state.set_drop_zone_active(false);
            Vec::new()
        }
        Msg::FolderDropped(resolved) => {
            state.set_drop_zone_active(false);
            match resolved {
                Ok(folder) => {
                    state.apply_input_folder(&folder);
                    Vec::new()
                }
                Err(rejected) => notify(&mut state, NotificationKind::Error, rejected.to_string()),
            }
        }
        Msg::InputEdited(text) => {
            state.set_input_text(text);
            Vec::new()
        }
        Msg::OutputEdited(text) => {
            state.set_output_text(text);
            Vec::new()
        }
        Msg::FormatSelected(format) => {
            if state.catalog().contains(&format) {
                state.set_format(format);
                Vec::new()
            } else {
                notify(
                    &mut state,
                    NotificationKind::Error,
                    format!("unsupported output format: {format}"),
                )
            }
        }
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::ConvertClicked => {
            if state.is_busy() {
                return (state, Vec::new());
            }
            match build(state.input_path(), state.format(), state.output_dir()) {
                Ok(request) => {
                    let request = request.with_mode(state.mode());
                    // Reflect the defaulted output directory back into the field.
                    state.set_output_text(request.output_dir.display().to_string());
                    state.begin_conversion(request.clone());
                    vec![Effect::SubmitConversion(request)]
                }
                Err(err) => notify(&mut state, NotificationKind::Error, err.to_string()),
            }
        }
        Msg::SubmitRejected(message) => {
            if state.finish_conversion(ConversionResult::failure(message.clone())) {
                notify(&mut state, NotificationKind::Error, message)
            } else {
                Vec::new()
            }
        }
        Msg::Progress(percent) => {
            state.apply_progress(percent);
            Vec::new()
        }
        Msg::ConversionFinished { success, message } => {
            let result = ConversionResult {
                success,
                message: message.clone(),
            };
            if !state.finish_conversion(result) {
                return (state, Vec::new());
            }
            let kind = if success {
                NotificationKind::Success
            } else {
                NotificationKind::Error
            };
            notify(&mut state, kind, message)
        }
        Msg::NotificationExpired { id } => {
            state.expire_notification(id);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn notify(state: &mut AppState, kind: NotificationKind, message: String) -> Vec<Effect> {
    let id = state.notify(kind, message);
    vec![Effect::ScheduleNotificationExpiry {
        id,
        after: NOTIFICATION_TIMEOUT,
    }]
}
