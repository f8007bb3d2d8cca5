use std::path::PathBuf;

use clap::{ArgAction, Parser};

use super::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "html_merge")]
#[command(
    version,
    about = "Merge saved web page folders into single HTML or MHTML files"
)]
pub struct Args {
    /// Folder to convert, as a path or file:// URI. Like a drop, only the first is used
    pub inputs: Vec<String>,

    /// Output format (html, mhtml, or any enabled in the settings file)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output directory; defaults to the input folder
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Convert the input folder itself instead of each of its subfolders
    #[arg(long)]
    pub single: bool,

    /// Prompt for the input and output folders
    #[arg(long)]
    pub pick: bool,

    /// Settings file (default: ./.html_merge.ron)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    /// Prompt when asked to, or when no folder was given.
    pub fn interactive(&self) -> bool {
        self.pick || self.inputs.is_empty()
    }
}
