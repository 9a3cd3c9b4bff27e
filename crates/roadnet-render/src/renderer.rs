//! Two persistent render workers and the UI-side frame driver.
//!
//! Each paint wakes the node worker and the connection worker with the same
//! frame job, then blocks on a fresh [`FrameLatch`] until both have painted
//! their layer. Workers lock the session only to read it and lock the surface
//! only to paint; neither lock is ever held while taking the other.

use crate::latch::{CountDownOnDrop, FrameLatch};
use crate::passes::{background_pass, connection_pass, node_pass};
use crate::primitives::{Layer, Primitive, Surface};
use crate::style::Palette;
use crate::viewport::Viewport;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use roadnet_events::{Event, EventListener};
use roadnet_graph::EditorSession;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

pub type SharedSession = Arc<Mutex<EditorSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Nodes,
    Connections,
}

impl Pass {
    fn name(self) -> &'static str {
        match self {
            Pass::Nodes => "node-pass",
            Pass::Connections => "connection-pass",
        }
    }

    fn layer(self) -> Layer {
        match self {
            Pass::Nodes => Layer::Nodes,
            Pass::Connections => Layer::Connections,
        }
    }
}

struct FrameJob {
    number: u64,
    viewport: Viewport,
    latch: Arc<FrameLatch>,
}

enum WorkerMessage {
    Frame(FrameJob),
    Stop,
}

/// A composited frame, layers already flattened in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub number: u64,
    pub primitives: Vec<Primitive>,
}

/// Cloneable handle for asking the UI thread to repaint.
///
/// Requests coalesce: any number of calls before the next paint result in a
/// single frame.
#[derive(Debug, Clone, Default)]
pub struct RedrawHandle {
    pending: Arc<AtomicBool>,
}

impl RedrawHandle {
    /// Returns `true` if this call scheduled a new frame.
    pub fn request(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

struct Worker {
    pass: Pass,
    tx: Sender<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
}

pub struct Renderer {
    session: SharedSession,
    surface: Arc<Mutex<Surface>>,
    palette: Arc<Palette>,
    workers: Vec<Worker>,
    redraw: RedrawHandle,
    frame: u64,
}

impl Renderer {
    /// Spawn both workers. They live until [`Renderer::shutdown`] or drop.
    pub fn start(session: SharedSession) -> io::Result<Self> {
        Self::with_palette(session, Palette::default())
    }

    pub fn with_palette(session: SharedSession, palette: Palette) -> io::Result<Self> {
        let surface = Arc::new(Mutex::new(Surface::new()));
        let palette = Arc::new(palette);
        let mut renderer = Self {
            session,
            surface,
            palette,
            workers: Vec::with_capacity(2),
            redraw: RedrawHandle::default(),
            frame: 0,
        };
        for pass in [Pass::Nodes, Pass::Connections] {
            let (tx, rx) = unbounded();
            let session = renderer.session.clone();
            let surface = renderer.surface.clone();
            let palette = renderer.palette.clone();
            let handle = thread::Builder::new()
                .name(pass.name().to_string())
                .spawn(move || run_worker(pass, rx, session, surface, palette))?;
            renderer.workers.push(Worker {
                pass,
                tx,
                handle: Some(handle),
            });
        }
        tracing::info!("Renderer started with {} workers", renderer.workers.len());
        Ok(renderer)
    }

    pub fn redraw_handle(&self) -> RedrawHandle {
        self.redraw.clone()
    }

    /// Ask for a repaint. Returns `false` when one is already pending.
    pub fn request_redraw(&self) -> bool {
        self.redraw.request()
    }

    /// Paint only if a redraw was requested since the last frame.
    pub fn paint_if_requested(&mut self, viewport: Viewport) -> Option<Frame> {
        if self.redraw.take() {
            Some(self.paint(viewport))
        } else {
            None
        }
    }

    /// Produce one frame. Blocks until both workers have painted.
    pub fn paint(&mut self, viewport: Viewport) -> Frame {
        self.redraw.take();
        self.frame += 1;
        let number = self.frame;

        let (grid, profile) = {
            let session = self.session.lock();
            (session.config().grid.clone(), session.config().debug.profile_frames)
        };
        let started = Instant::now();
        let background = background_pass(&viewport, &grid, &self.palette);
        self.surface.lock().paint(Layer::Background, number, background);

        let latch = Arc::new(FrameLatch::new(self.workers.len()));
        for worker in &self.workers {
            let job = FrameJob {
                number,
                viewport,
                latch: latch.clone(),
            };
            if worker.tx.send(WorkerMessage::Frame(job)).is_err() {
                tracing::error!("{} worker is gone, frame {number} will miss its layer", worker.pass.name());
                latch.count_down();
            }
        }
        latch.wait();

        let primitives = self.surface.lock().composite();
        if profile {
            tracing::debug!(
                "Frame {number}: {} primitives in {:?}",
                primitives.len(),
                started.elapsed()
            );
        }
        Frame { number, primitives }
    }

    pub fn frames_painted(&self) -> u64 {
        self.frame
    }

    /// Stop both workers and wait for them to leave their loops.
    pub fn shutdown(&mut self) {
        for worker in &self.workers {
            let _ = worker.tx.send(WorkerMessage::Stop);
        }
        for worker in &mut self.workers {
            let Some(handle) = worker.handle.take() else {
                continue;
            };
            if handle.join().is_err() {
                tracing::error!("{} worker panicked", worker.pass.name());
            }
        }
        self.workers.clear();
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl EventListener for Renderer {
    fn handle_event(&mut self, event: &Event) {
        if matches!(event, Event::RedrawRequested) {
            self.request_redraw();
        }
    }
}

fn run_worker(
    pass: Pass,
    rx: Receiver<WorkerMessage>,
    session: SharedSession,
    surface: Arc<Mutex<Surface>>,
    palette: Arc<Palette>,
) {
    tracing::info!("{} worker started", pass.name());
    while let Ok(WorkerMessage::Frame(job)) = rx.recv() {
        let _done = CountDownOnDrop(&job.latch);
        let started = Instant::now();
        let (primitives, profile) = {
            let session = session.lock();
            let primitives = match pass {
                Pass::Nodes => node_pass(&session, &job.viewport, &palette),
                Pass::Connections => connection_pass(
                    session.map(),
                    &job.viewport,
                    &palette,
                    session.config().view.connection_margin,
                ),
            };
            (primitives, session.config().debug.profile_frames)
        };
        let count = primitives.len();
        surface.lock().paint(pass.layer(), job.number, primitives);
        if profile {
            tracing::debug!(
                "{} frame {}: {count} primitives in {:?}",
                pass.name(),
                job.number,
                started.elapsed()
            );
        }
    }
    tracing::info!("{} worker stopped", pass.name());
}
