use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use merge_core::{
    resolve_via_dialog, ConversionProgress, ConversionRequest, ConversionResult, Effect,
    FolderPicker, Msg,
};
use merge_engine::{ConversionBackend, ConversionClient, ProgressListener, ResultListener};

const INPUT_DIALOG_TITLE: &str = "Input folder";
const OUTPUT_DIALOG_TITLE: &str = "Output folder (blank keeps the current one)";

/// Turns client callbacks back into messages for the update loop.
#[derive(Clone)]
struct ChannelListener {
    msg_tx: mpsc::Sender<Msg>,
}

impl ProgressListener for ChannelListener {
    fn on_progress(&self, progress: ConversionProgress) {
        let _ = self.msg_tx.send(Msg::Progress(progress.percent()));
    }
}

impl ResultListener for ChannelListener {
    fn on_conversion_finished(&self, result: &ConversionResult) {
        let _ = self.msg_tx.send(Msg::ConversionFinished {
            success: result.success,
            message: result.message.clone(),
        });
    }
}

/// Dialog implementations for the two folder effects.
pub struct Pickers {
    pub input: Box<dyn FolderPicker>,
    pub output: Box<dyn FolderPicker>,
}

/// Executes effects; every outcome comes back as a message on `msg_tx`.
pub struct EffectRunner {
    client: ConversionClient,
    pickers: Pickers,
    msg_tx: mpsc::Sender<Msg>,
    last_submitted: Option<ConversionRequest>,
}

impl EffectRunner {
    pub fn new(
        msg_tx: mpsc::Sender<Msg>,
        backend: Arc<dyn ConversionBackend>,
        pickers: Pickers,
    ) -> Self {
        let listener = ChannelListener {
            msg_tx: msg_tx.clone(),
        };
        let client = ConversionClient::new(backend, Box::new(listener.clone()), Box::new(listener));
        Self {
            client,
            pickers,
            msg_tx,
            last_submitted: None,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PickInputFolder => {
                    if let Some(folder) =
                        resolve_via_dialog(self.pickers.input.as_ref(), INPUT_DIALOG_TITLE)
                    {
                        let _ = self.msg_tx.send(Msg::FolderResolved(folder));
                    }
                }
                Effect::PickOutputFolder => {
                    if let Some(dir) =
                        resolve_via_dialog(self.pickers.output.as_ref(), OUTPUT_DIALOG_TITLE)
                    {
                        let _ = self.msg_tx.send(Msg::OutputDirResolved(dir));
                    }
                }
                Effect::SubmitConversion(request) => self.submit(request),
                Effect::ScheduleNotificationExpiry { id, after } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = msg_tx.send(Msg::NotificationExpired { id });
                    });
                }
            }
        }
    }

    fn submit(&mut self, request: ConversionRequest) {
        match self.client.submit(request.clone()) {
            Ok(request_id) => {
                engine_info!("SubmitConversion request_id={}", request_id);
                self.last_submitted = Some(request);
            }
            Err(err) => {
                engine_warn!("Submission refused: {}", err);
                let _ = self.msg_tx.send(Msg::SubmitRejected(err.to_string()));
            }
        }
    }

    /// Waits up to `timeout` for client events and dispatches them to the listeners.
    pub fn poll(&mut self, timeout: Duration) {
        let dispatched = self.client.poll_timeout(timeout);
        if dispatched > 0 {
            engine_debug!("dispatched {} client event(s)", dispatched);
        }
    }

    /// The request most recently accepted by the client.
    pub fn last_submitted(&self) -> Option<&ConversionRequest> {
        self.last_submitted.as_ref()
    }
}
