use std::io::Write;

use merge_core::{AppViewModel, NotificationKind};

use super::constants::*;

/// One thing the terminal shows for a view change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Log(String),
    Progress(u8),
    Notification(NotificationKind, String),
    DropZone,
}

/// Lines to print to move the terminal from `previous` to `view`.
pub fn render(previous: Option<&AppViewModel>, view: &AppViewModel) -> Vec<Line> {
    let mut lines = Vec::new();

    let was_active = previous.is_some_and(|p| p.drop_zone_active);
    if view.drop_zone_active && !was_active {
        lines.push(Line::DropZone);
    }

    let old_log = previous.map(|p| p.log.as_slice()).unwrap_or_default();
    lines.extend(new_log_lines(old_log, &view.log).iter().cloned().map(Line::Log));

    let old_progress = previous.and_then(|p| p.progress);
    if let Some(percent) = view.progress {
        if old_progress != Some(percent) {
            lines.push(Line::Progress(percent));
        }
    }

    let old_id = previous.and_then(|p| p.notification.as_ref().map(|n| n.id));
    if let Some(notification) = &view.notification {
        if old_id != Some(notification.id) {
            lines.push(Line::Notification(
                notification.kind,
                notification.message.clone(),
            ));
        }
    }

    lines
}

/// The log is capped, so old lines fall off the front; whatever follows the
/// longest overlap with the previous tail is new.
fn new_log_lines<'a>(old: &[String], new: &'a [String]) -> &'a [String] {
    let max_overlap = old.len().min(new.len());
    let overlap = (0..=max_overlap)
        .rev()
        .find(|&k| old[old.len() - k..] == new[..k])
        .unwrap_or(0);
    &new[overlap..]
}

pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * BAR_WIDTH / 100;
    let bar: String = std::iter::repeat(BAR_FILLED)
        .take(filled)
        .chain(std::iter::repeat(BAR_EMPTY).take(BAR_WIDTH - filled))
        .collect();
    format!("[{bar}] {percent:>3}%")
}

pub fn format_line(line: &Line, timestamp: &str) -> String {
    match line {
        Line::Log(text) => format!("{timestamp} {text}"),
        Line::Progress(percent) => progress_bar(*percent),
        Line::Notification(NotificationKind::Success, message) => {
            format!("{SUCCESS_TAG} {message}")
        }
        Line::Notification(NotificationKind::Error, message) => format!("{ERROR_TAG} {message}"),
        Line::DropZone => DROP_ZONE_HINT.to_string(),
    }
}

/// Prints view changes to a writer, remembering what it already showed.
pub struct Terminal<W: Write> {
    out: W,
    previous: Option<AppViewModel>,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
        }
    }

    pub fn draw(&mut self, view: &AppViewModel) {
        let timestamp = chrono::Local::now().format(TIME_FORMAT).to_string();
        for line in render(self.previous.as_ref(), view) {
            let _ = writeln!(self.out, "{}", format_line(&line, &timestamp));
        }
        let _ = self.out.flush();
        self.previous = Some(view.clone());
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
