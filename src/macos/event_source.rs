use crate::models::Point;
use crate::{Result, ZoneRSError};
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// One event from the global pointer stream
///
/// The source guarantees a total order of press/move/release for the
/// primary button; `modifier_held` is the state of the designated drag
/// modifier at event time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
    pub modifier_held: bool,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Press,
    Move,
    Release,
}

impl PointerEvent {
    pub fn press(position: Point, modifier_held: bool) -> Self {
        Self::new(PointerEventKind::Press, position, modifier_held)
    }

    pub fn moved(position: Point, modifier_held: bool) -> Self {
        Self::new(PointerEventKind::Move, position, modifier_held)
    }

    pub fn release(position: Point, modifier_held: bool) -> Self {
        Self::new(PointerEventKind::Release, position, modifier_held)
    }

    fn new(kind: PointerEventKind, position: Point, modifier_held: bool) -> Self {
        Self {
            kind,
            position,
            modifier_held,
            at: Instant::now(),
        }
    }

    /// Override the timestamp; used by tests exercising the press cooldown
    pub fn at(mut self, at: Instant) -> Self {
        self.at = at;
        self
    }
}

/// Collaborator that owns the OS input hook and feeds the engine
///
/// The engine never installs hooks itself; it only consumes the resulting
/// stream. A source that cannot deliver events fails `start` with
/// [`ZoneRSError::NoHookAvailable`], and the hotkey path keeps working.
pub trait PointerEventSource: Send + Sync {
    fn start(&self, events: UnboundedSender<PointerEvent>) -> Result<()>;
}

/// System-backed pointer source
///
/// Hosts without the event-tap bridge cannot deliver the global stream;
/// `start` reports the hook as unavailable so the caller can degrade to
/// hotkey-only operation.
#[derive(Debug, Default)]
pub struct SystemPointerSource;

impl SystemPointerSource {
    pub fn new() -> Self {
        Self
    }
}

impl PointerEventSource for SystemPointerSource {
    fn start(&self, _events: UnboundedSender<PointerEvent>) -> Result<()> {
        Err(ZoneRSError::NoHookAvailable(
            "the global event tap is not available in this environment".into(),
        )
        .into())
    }
}

/// Replays a scripted event sequence from a background thread, preserving
/// order; used to exercise the full event pipeline in tests.
#[derive(Debug, Default)]
pub struct ReplayPointerSource {
    events: Mutex<Vec<PointerEvent>>,
}

impl ReplayPointerSource {
    pub fn new(events: Vec<PointerEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

impl PointerEventSource for ReplayPointerSource {
    fn start(&self, sender: UnboundedSender<PointerEvent>) -> Result<()> {
        let events = std::mem::take(&mut *self.events.lock().unwrap());
        let run_loop = spawn_run_loop("pointer-replay")?;

        for event in events {
            let tx = sender.clone();
            run_loop.dispatch(move || {
                let _ = tx.send(event);
            })?;
        }

        run_loop.shutdown()
    }
}

/// Messages dispatched to the background hook thread
enum RunLoopMessage {
    Execute(Box<dyn FnOnce() + Send + 'static>),
    Shutdown,
}

/// Handle to a background thread that stands in for the OS run loop the
/// event tap lives on
pub struct RunLoopHandle {
    name: String,
    sender: Sender<RunLoopMessage>,
    join_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for RunLoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLoopHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl RunLoopHandle {
    /// Dispatch work to the run loop thread
    pub fn dispatch<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(RunLoopMessage::Execute(Box::new(work)))
            .map_err(|_| {
                ZoneRSError::MacOSAPIError(format!(
                    "Failed to dispatch work onto run loop '{}'",
                    self.name
                ))
            })?;

        Ok(())
    }

    /// Signal the run loop to terminate and wait for the background thread
    pub fn shutdown(mut self) -> Result<()> {
        self.sender.send(RunLoopMessage::Shutdown).map_err(|_| {
            ZoneRSError::MacOSAPIError(format!(
                "Failed to signal shutdown for run loop '{}'",
                self.name
            ))
        })?;

        if let Some(handle) = self.join_handle.take() {
            handle.join().map_err(|_| {
                ZoneRSError::MacOSAPIError(format!(
                    "Run loop '{}' panicked during shutdown",
                    self.name
                ))
            })?;
        }

        Ok(())
    }
}

/// Spawn a background run loop thread and return a handle for dispatching
/// work onto it
pub fn spawn_run_loop(name: impl Into<String>) -> Result<RunLoopHandle> {
    let name = name.into();
    let (sender, receiver) = mpsc::channel::<RunLoopMessage>();
    let thread_name = name.clone();

    let join_handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            while let Ok(message) = receiver.recv() {
                match message {
                    RunLoopMessage::Execute(work) => work(),
                    RunLoopMessage::Shutdown => break,
                }
            }
        })
        .map_err(|err| {
            ZoneRSError::MacOSAPIError(format!(
                "Failed to spawn run loop '{}' thread: {}",
                thread_name, err
            ))
        })?;

    Ok(RunLoopHandle {
        name,
        sender,
        join_handle: Some(join_handle),
    })
}
