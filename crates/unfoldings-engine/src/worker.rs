//! Background render thread.
//!
//! [`RenderWorker`] owns a thread that receives [`RenderJob`]s over a
//! crossbeam channel, renders each one with its own [`CancelToken`],
//! publishes to the shared [`RenderSlot`] and reports a [`RenderEvent`].
//! Submitting a job cancels the one in flight. Dropping the worker stops the
//! thread after the current stage.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::error::{RenderError, Result};
use crate::params::RenderParameters;
use crate::publish::RenderSlot;
use crate::render::{CancelToken, Renderer};

/// One queued render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Parameter snapshot to render.
    pub params: RenderParameters,
    /// Token the worker checks between stages.
    pub cancel: CancelToken,
}

/// Outcome reported for each job.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Rendered and published.
    Finished {
        /// Slot generation of the published buffer.
        generation: u64,
        /// Frames in the published buffer.
        frames: usize,
        /// Wall-clock render time.
        elapsed: Duration,
    },
    /// Cancelled before completion; nothing was published.
    Cancelled,
}

enum Command {
    Render(RenderJob),
    Shutdown,
}

/// Handle to the render thread.
#[derive(Debug)]
pub struct RenderWorker {
    commands: Sender<Command>,
    events: Receiver<RenderEvent>,
    in_flight: Mutex<Option<CancelToken>>,
    slot: RenderSlot,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Spawns the worker thread rendering at `host_rate`.
    pub fn spawn(host_rate: f64) -> std::io::Result<Self> {
        Self::spawn_with_slot(host_rate, RenderSlot::new())
    }

    /// Spawns the worker publishing into `slot`.
    pub fn spawn_with_slot(host_rate: f64, slot: RenderSlot) -> std::io::Result<Self> {
        let (command_tx, command_rx) = unbounded::<Command>();
        let (event_tx, event_rx) = unbounded::<RenderEvent>();
        let renderer = Renderer::with_slot(host_rate, slot.clone());

        let handle = thread::Builder::new()
            .name("unfoldings-render".into())
            .spawn(move || run(&renderer, &command_rx, &event_tx))?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            in_flight: Mutex::new(None),
            slot,
            handle: Some(handle),
        })
    }

    /// Slot the worker publishes to.
    pub fn slot(&self) -> &RenderSlot {
        &self.slot
    }

    /// Queues a render, cancelling any job still in flight.
    ///
    /// Returns the token for the new job.
    pub fn submit(&self, params: RenderParameters) -> Result<CancelToken> {
        let cancel = CancelToken::new();
        if let Some(previous) = self.in_flight.lock().replace(cancel.clone()) {
            previous.cancel();
        }
        self.commands
            .send(Command::Render(RenderJob {
                params,
                cancel: cancel.clone(),
            }))
            .map_err(|_| RenderError::WorkerDisconnected)?;
        Ok(cancel)
    }

    /// Cancels the job in flight, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.in_flight.lock().take() {
            token.cancel();
        }
    }

    /// Blocks until the next event.
    pub fn recv(&self) -> Result<RenderEvent> {
        self.events.recv().map_err(|_| RenderError::WorkerDisconnected)
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<RenderEvent>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(None),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                Err(RenderError::WorkerDisconnected)
            }
        }
    }

    /// Next event if one is ready.
    pub fn try_recv(&self) -> Option<RenderEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.cancel();
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("render thread panicked");
            }
        }
    }
}

fn run(renderer: &Renderer, commands: &Receiver<Command>, events: &Sender<RenderEvent>) {
    tracing::debug!(host_rate = renderer.host_rate(), "render worker started");
    while let Ok(command) = commands.recv() {
        let job = match command {
            Command::Render(job) => job,
            Command::Shutdown => break,
        };
        let started = Instant::now();
        let event = match renderer.render_cancellable(&job.params, &job.cancel) {
            Ok(buffer) => {
                let frames = buffer.len();
                let generation = renderer.slot().publish(buffer);
                RenderEvent::Finished {
                    generation,
                    frames,
                    elapsed: started.elapsed(),
                }
            }
            Err(_) => {
                tracing::debug!(mode = %job.params.mode, "render cancelled");
                RenderEvent::Cancelled
            }
        };
        if events.send(event).is_err() {
            break;
        }
    }
    tracing::debug!("render worker stopped");
}
