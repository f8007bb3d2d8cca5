/// Cells in the progress bar.
pub const BAR_WIDTH: usize = 30;
pub const BAR_FILLED: char = '#';
pub const BAR_EMPTY: char = '-';

pub const TIME_FORMAT: &str = "%H:%M:%S";

pub const DROP_ZONE_HINT: &str = "Drop zone active: reading dropped item";
pub const SUCCESS_TAG: &str = "[ok]";
pub const ERROR_TAG: &str = "[error]";
