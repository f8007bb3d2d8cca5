use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use engine_logging::engine_info;
use merge_core::{
    resolve_via_drop, update, AppState, ConversionMode, ConversionResult, DropPayload,
    FormatCatalog, Msg, OutputFormat,
};
use merge_engine::FolderMergeBackend;

use super::cli::Args;
use super::effects::{EffectRunner, Pickers};
use super::logging;
use super::picker::PromptPicker;
use super::settings::{self, Settings};
use super::ui::render::Terminal;

const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logging::initialize(args.log_destination(), logging::level_for(args.verbose));

    let settings_path = args.settings.clone().unwrap_or_else(settings::default_path);
    let mut settings = settings::load(&settings_path);
    let catalog = settings.catalog();
    let script = initial_messages(&args, &settings, &catalog)?;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let pickers = Pickers {
        input: Box::new(PromptPicker::stdin(settings.last_input.clone())),
        output: Box::new(PromptPicker::stdin(None)),
    };
    let runner = EffectRunner::new(
        msg_tx,
        Arc::new(FolderMergeBackend::default()),
        pickers,
    );
    let mut app = App::new(
        AppState::with_catalog(catalog),
        runner,
        msg_rx,
        Terminal::new(io::stdout()),
    );

    let result = app.run(script);
    match result {
        Some(result) if result.success => {
            if let Some(request) = app.runner.last_submitted() {
                settings.last_input = Some(request.input_path.clone());
                settings::save(&settings_path, &settings);
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

/// The gestures a command line stands for, in the order a user would make them.
fn initial_messages(
    args: &Args,
    settings: &Settings,
    catalog: &FormatCatalog,
) -> anyhow::Result<Vec<Msg>> {
    let format = match &args.format {
        Some(name) => name
            .parse::<OutputFormat>()
            .with_context(|| format!("invalid --format {name:?}"))?,
        None => settings.default_format(),
    };
    if !catalog.contains(&format) {
        let enabled: Vec<&str> = catalog.formats().iter().map(OutputFormat::as_str).collect();
        bail!(
            "unsupported output format: {format} (enabled: {})",
            enabled.join(", ")
        );
    }
    let mode = if args.single {
        ConversionMode::Single
    } else {
        settings.default_mode()
    };

    let mut script = vec![Msg::ModeSelected(mode), Msg::FormatSelected(format)];
    // Set before the input so an explicit output is not overwritten by the mirror.
    if let Some(dir) = &args.output_dir {
        script.push(Msg::OutputEdited(dir.clone()));
    }
    if args.interactive() {
        script.push(Msg::BrowseInputClicked);
        if args.pick && args.output_dir.is_none() {
            script.push(Msg::BrowseOutputClicked);
        }
    } else {
        let payload = DropPayload::new(args.inputs.iter().cloned());
        script.push(Msg::DragEntered);
        script.push(Msg::FolderDropped(resolve_via_drop(&payload)));
    }
    script.push(Msg::ConvertClicked);
    Ok(script)
}

/// The update loop: messages in, effects out, view changes to the terminal.
struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    terminal: Terminal<W>,
}

impl<W: Write> App<W> {
    fn new(
        state: AppState,
        runner: EffectRunner,
        msg_rx: mpsc::Receiver<Msg>,
        terminal: Terminal<W>,
    ) -> Self {
        Self {
            state,
            runner,
            msg_rx,
            terminal,
        }
    }

    /// Feeds `script` one message at a time, letting each settle, then waits
    /// for the conversion to finish. Returns the last conversion result.
    fn run(&mut self, script: Vec<Msg>) -> Option<ConversionResult> {
        for msg in script {
            self.dispatch_msg(msg);
            self.process_pending_messages();
        }
        while self.state.is_busy() {
            self.runner.poll(POLL_INTERVAL);
            self.process_pending_messages();
        }
        engine_info!("update loop idle");
        self.state.last_result().cloned()
    }

    fn process_pending_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch_msg(msg);
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.terminal.draw(&state.view());
        }
        self.state = state;
        self.runner.run(effects);
    }
}
