use std::io::{self, Write};
use std::path::PathBuf;

use merge_core::FolderPicker;

type ReadAnswer = Box<dyn Fn() -> Option<String>>;

/// Asks for a folder on the terminal. A blank answer takes the default, if any.
pub struct PromptPicker {
    read_answer: ReadAnswer,
    default: Option<PathBuf>,
}

impl PromptPicker {
    pub fn stdin(default: Option<PathBuf>) -> Self {
        Self::new(Box::new(read_stdin_line), default)
    }

    pub fn new(read_answer: ReadAnswer, default: Option<PathBuf>) -> Self {
        Self {
            read_answer,
            default,
        }
    }
}

/// `None` once stdin is closed.
fn read_stdin_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

impl FolderPicker for PromptPicker {
    fn pick_folder(&self, title: &str) -> Option<PathBuf> {
        match &self.default {
            Some(default) => eprint!("{title} [{}]: ", default.display()),
            None => eprint!("{title}: "),
        }
        let _ = io::stderr().flush();

        let line = (self.read_answer)()?;
        match line.trim() {
            "" => self.default.clone(),
            answer => Some(PathBuf::from(answer)),
        }
    }
}
