use crossbeam_channel::{Receiver, Sender, unbounded};
use roadnet_core::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Graph
    GraphLoaded {
        node_count: usize,
        marker_count: usize,
    },
    NodeAdded {
        id: NodeId,
    },
    NodesDeleted {
        count: usize,
    },
    NodesMoved {
        count: usize,
    },
    ConnectionToggled {
        start: NodeId,
        end: NodeId,
    },

    // Curves
    CurveStarted {
        start: NodeId,
        end: NodeId,
    },
    CurveCommitted {
        created: usize,
    },
    CurveCancelled,

    // ========================================================================
    // Undo/Redo Events
    // ========================================================================
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
        undo_description: Option<String>,
        redo_description: Option<String>,
    },
    /// An undo or redo could not be applied; the graph was left unchanged.
    HistoryError {
        message: String,
    },

    // Session
    StaleChanged {
        stale: bool,
    },
    RedrawRequested,

    // Notifications
    ShowInfo {
        message: String,
    },
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!(?event, "publish");
        let _ = self.tx.send(event);
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
