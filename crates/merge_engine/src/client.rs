//! Front-end side of a conversion: submission guard and listener dispatch.
use std::path::PathBuf;
use std::sync::{mpsc::RecvTimeoutError, Arc};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use merge_core::{ConversionProgress, ConversionRequest, ConversionResult};

use crate::engine::EngineHandle;
use crate::{ConversionBackend, EngineEvent, RequestId};

const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Observer for progress of the in-flight conversion.
pub trait ProgressListener {
    fn on_progress(&self, progress: ConversionProgress);
}

/// Observer for the terminal result of a conversion.
pub trait ResultListener {
    fn on_conversion_finished(&self, result: &ConversionResult);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a conversion is already running")]
    Busy,
    #[error("input is not a folder: {}", .0.display())]
    InputNotADirectory(PathBuf),
    #[error("conversion worker is not running")]
    WorkerGone,
}

/// Sends requests to the backend worker, one at a time.
///
/// Events are only delivered from [`ConversionClient::poll`] and friends, so the
/// listeners run on the thread that owns the client, in the order the backend
/// emitted them.
pub struct ConversionClient {
    engine: EngineHandle,
    in_flight: Option<RequestId>,
    next_request_id: RequestId,
    progress_listener: Box<dyn ProgressListener>,
    result_listener: Box<dyn ResultListener>,
}

impl ConversionClient {
    pub fn new(
        backend: Arc<dyn ConversionBackend>,
        progress_listener: Box<dyn ProgressListener>,
        result_listener: Box<dyn ResultListener>,
    ) -> Self {
        Self {
            engine: EngineHandle::new(backend),
            in_flight: None,
            next_request_id: 0,
            progress_listener,
            result_listener,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Hands `request` to the worker and returns immediately.
    ///
    /// The in-flight slot is taken before the worker sees the request and is
    /// released only when its terminal result is dispatched.
    pub fn submit(&mut self, request: ConversionRequest) -> Result<RequestId, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }
        if !request.input_path.is_dir() {
            return Err(SubmitError::InputNotADirectory(request.input_path));
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight = Some(request_id);
        engine_info!(
            "submitting request {} for {} ({})",
            request_id,
            request.input_path.display(),
            request.output_format
        );
        if !self.engine.enqueue(request_id, request) {
            self.in_flight = None;
            return Err(SubmitError::WorkerGone);
        }
        Ok(request_id)
    }

    /// Dispatches every event already received. Returns how many were dispatched.
    pub fn poll(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(event);
            dispatched += 1;
        }
        dispatched
    }

    /// Like [`Self::poll`], but first waits up to `timeout` for an event to arrive.
    pub fn poll_timeout(&mut self, timeout: Duration) -> usize {
        match self.engine.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event);
                1 + self.poll()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                self.abandon_in_flight();
                0
            }
        }
    }

    /// Blocks until the in-flight conversion (if any) has delivered its result.
    pub fn wait_idle(&mut self) {
        while self.in_flight.is_some() {
            match self.engine.recv_timeout(WAIT_SLICE) {
                Ok(event) => self.dispatch(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.abandon_in_flight(),
            }
        }
    }

    fn dispatch(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Progress {
                request_id,
                progress,
            } if self.in_flight == Some(request_id) => {
                self.progress_listener.on_progress(progress);
            }
            EngineEvent::Finished { request_id, result } if self.in_flight == Some(request_id) => {
                // Cleared first so the listener observes an idle client.
                self.in_flight = None;
                engine_info!(
                    "request {} finished: success={} message={}",
                    request_id,
                    result.success,
                    result.message
                );
                self.result_listener.on_conversion_finished(&result);
            }
            other => engine_debug!("dropping event for a retired request: {:?}", other),
        }
    }

    fn abandon_in_flight(&mut self) {
        if self.in_flight.take().is_some() {
            engine_warn!("conversion worker stopped before finishing");
            let result = ConversionResult::failure("conversion worker stopped unexpectedly");
            self.result_listener.on_conversion_finished(&result);
        }
    }
}
