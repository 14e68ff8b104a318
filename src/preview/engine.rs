use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::api::{PrinterBackend, SavedValues, Temperatures};
use crate::errors::{MattaError, MattaResult};
use crate::geometry::{GeometryError, NozzleSelection};
use crate::preview::frame::{load_preview, select_point, PreviewFrame};
use crate::preview::state::{PanelAction, PanelCommand, PanelEvent, PanelState};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

/// Handle given to the host so it can drive the panel and observe it.
#[derive(Clone)]
pub struct PanelHandle {
    tx: mpsc::Sender<PanelCommand>,
    events: broadcast::Sender<PanelEvent>,
}

impl PanelHandle {
    pub async fn send(&self, command: PanelCommand) -> MattaResult<()> {
        self.tx.send(command).await.map_err(|_| MattaError::Cancelled)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }
}

/// Outcome of a spawned backend call, fed back into the loop.
enum Completion {
    Frame { ticket: u64, result: MattaResult<PreviewFrame> },
    Selection {
        ticket: u64,
        frame_id: uuid::Uuid,
        result: MattaResult<NozzleSelection>,
    },
    Values { result: MattaResult<SavedValues> },
    Temps { result: MattaResult<Temperatures> },
    Text { action: PanelAction, result: MattaResult<String> },
}

/// Single writer of `PanelState`.
///
/// Commands are handled in arrival order, backend calls run as separate
/// tasks, and their results are applied when they come back. Frame and
/// selection results carry a ticket; one older than the last applied result
/// of the same kind is dropped. A selection is also dropped once the frame it
/// was computed on has been replaced.
pub struct PreviewEngine {
    backend: Arc<dyn PrinterBackend>,
    state: PanelState,
    cmd_rx: mpsc::Receiver<PanelCommand>,
    events: broadcast::Sender<PanelEvent>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
    next_ticket: u64,
    applied_frame_ticket: u64,
    applied_selection_ticket: u64,
}

impl PreviewEngine {
    pub fn new(backend: Arc<dyn PrinterBackend>) -> (Self, PanelHandle) {
        let (tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let handle = PanelHandle {
            tx,
            events: events.clone(),
        };
        let engine = Self {
            backend,
            state: PanelState::default(),
            cmd_rx,
            events,
            done_tx,
            done_rx,
            next_ticket: 0,
            applied_frame_ticket: 0,
            applied_selection_ticket: 0,
        };
        (engine, handle)
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Run until `PanelCommand::Stop` or every handle is dropped. Returns the last state.
    pub async fn run_loop(mut self) -> PanelState {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(PanelCommand::Stop) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(done) = self.done_rx.recv() => self.apply(done),
            }
        }
        tracing::info!(revision = self.state.revision, "preview engine stopped");
        self.state
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let _ = done_tx.send(fut.await);
        });
    }

    fn handle_command(&mut self, cmd: PanelCommand) {
        tracing::debug!(command = ?cmd, "panel command");
        let backend = self.backend.clone();
        match cmd {
            PanelCommand::Refresh { container_width } => {
                let ticket = self.issue_ticket();
                self.spawn(async move {
                    let result = load_preview(backend.as_ref(), container_width).await;
                    Completion::Frame { ticket, result }
                });
            }
            PanelCommand::Click { point, displayed } => {
                let Some(frame) = self.state.frame.clone() else {
                    let err = MattaError::Geometry(GeometryError::unavailable("no preview loaded"));
                    self.fail(PanelAction::Click, &err);
                    return;
                };
                let ticket = self.issue_ticket();
                let frame_id = frame.id;
                self.spawn(async move {
                    let result = select_point(backend.as_ref(), &frame, point, displayed).await;
                    Completion::Selection {
                        ticket,
                        frame_id,
                        result,
                    }
                });
            }
            PanelCommand::SaveSelection => {
                let Some(selection) = self.state.selection else {
                    self.fail(PanelAction::SaveSelection, &MattaError::NoSelection);
                    return;
                };
                self.spawn(async move {
                    let result = backend.save_nozzle_coords(selection.nozzle).await;
                    Completion::Text { action: PanelAction::SaveSelection, result }
                });
            }
            PanelCommand::HomePrinter => self.spawn(async move {
                let result = backend.home_printer().await;
                Completion::Text { action: PanelAction::HomePrinter, result }
            }),
            PanelCommand::PrinterState => self.spawn(async move {
                let result = backend.get_printer_state().await;
                Completion::Text { action: PanelAction::PrinterState, result }
            }),
            PanelCommand::TestAuthToken => self.spawn(async move {
                let result = backend.test_auth_token().await;
                Completion::Text { action: PanelAction::TestAuthToken, result }
            }),
            PanelCommand::Temps => self.spawn(async move {
                Completion::Temps { result: backend.get_temps().await }
            }),
            PanelCommand::LoadValues => self.spawn(async move {
                Completion::Values { result: backend.get_values().await }
            }),
            PanelCommand::SaveValues(values) => self.spawn(async move {
                let result = backend.save_values(&values).await;
                Completion::Text { action: PanelAction::SaveValues, result }
            }),
            PanelCommand::Stop => {}
        }
    }

    fn apply(&mut self, done: Completion) {
        match done {
            Completion::Frame { ticket, result } => {
                if ticket < self.applied_frame_ticket {
                    tracing::debug!(ticket, latest = self.applied_frame_ticket, "stale preview discarded");
                    return;
                }
                self.applied_frame_ticket = ticket;
                match result {
                    Ok(frame) => self.replace(self.state.with_frame(frame)),
                    Err(e) => self.fail(PanelAction::Refresh, &e),
                }
            }
            Completion::Selection {
                ticket,
                frame_id,
                result,
            } => {
                if self.state.frame.as_ref().map(|f| f.id) != Some(frame_id) {
                    tracing::debug!(ticket, frame = %frame_id, "selection for replaced frame discarded");
                    return;
                }
                if ticket < self.applied_selection_ticket {
                    tracing::debug!(ticket, latest = self.applied_selection_ticket, "stale selection discarded");
                    return;
                }
                self.applied_selection_ticket = ticket;
                match result {
                    Ok(selection) => self.replace(self.state.with_selection(selection)),
                    Err(e) => self.fail(PanelAction::Click, &e),
                }
            }
            Completion::Values { result } => match result {
                Ok(values) => self.replace(self.state.with_values(values)),
                Err(e) => self.fail(PanelAction::LoadValues, &e),
            },
            Completion::Temps { result } => match result {
                Ok(temps) => self.replace(self.state.with_temps(temps)),
                Err(e) => self.fail(PanelAction::Temps, &e),
            },
            Completion::Text { action, result } => match result {
                Ok(text) => {
                    tracing::info!(action = %action, text = %text, "backend replied");
                    self.emit(PanelEvent::Status {
                        action,
                        text: text.clone(),
                    });
                    self.replace(self.state.with_status(text));
                }
                Err(e) => self.fail(action, &e),
            },
        }
    }

    fn replace(&mut self, state: PanelState) {
        self.state = state;
        self.emit(PanelEvent::StateChanged {
            state: self.state.clone(),
        });
    }

    fn fail(&mut self, action: PanelAction, err: &MattaError) {
        tracing::warn!(action = %action, error = %err, "panel action failed");
        let message = err.to_string();
        self.emit(PanelEvent::Error {
            action,
            message: message.clone(),
        });
        self.replace(self.state.with_error(message));
    }

    fn emit(&self, event: PanelEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
