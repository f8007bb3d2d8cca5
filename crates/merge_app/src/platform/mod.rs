mod app;
mod cli;
mod effects;
mod logging;
mod picker;
mod settings;
mod ui;

pub use app::run_app;
