use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, set_current_request};
use merge_core::{ConversionProgress, ConversionRequest, ConversionResult};

use crate::batch::ProgressSink;
use crate::{ConversionBackend, EngineEvent, RequestId};

enum EngineCommand {
    Run {
        request_id: RequestId,
        request: ConversionRequest,
    },
}

/// Owns the worker thread that runs conversions one at a time.
///
/// The worker stops once the handle is dropped.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn ConversionBackend>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                handle_command(backend.as_ref(), command, &event_tx);
            }
        });

        Self { cmd_tx, event_rx }
    }

    /// Returns false when the worker is gone.
    pub fn enqueue(&self, request_id: RequestId, request: ConversionRequest) -> bool {
        self.cmd_tx
            .send(EngineCommand::Run {
                request_id,
                request,
            })
            .is_ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

struct ChannelProgressSink {
    request_id: RequestId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ProgressSink for ChannelProgressSink {
    fn progress(&self, percent: u8) {
        let _ = self.tx.send(EngineEvent::Progress {
            request_id: self.request_id,
            progress: ConversionProgress::new(percent),
        });
    }
}

fn handle_command(
    backend: &dyn ConversionBackend,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Run {
            request_id,
            request,
        } => {
            set_current_request(request_id);
            let sink = ChannelProgressSink {
                request_id,
                tx: event_tx.clone(),
            };
            // A panicking backend must still produce the terminal result.
            let result = panic::catch_unwind(AssertUnwindSafe(|| backend.run(&request, &sink)))
                .unwrap_or_else(|_| {
                    engine_error!("conversion backend panicked");
                    ConversionResult::failure("conversion backend panicked")
                });
            let _ = event_tx.send(EngineEvent::Finished { request_id, result });
            set_current_request(0);
        }
    }
}
