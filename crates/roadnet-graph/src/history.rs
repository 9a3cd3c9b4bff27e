//! Two-stack undo/redo log with a structural version guard.
//!
//! Every entry is stamped with the graph's structural version at the time it
//! was recorded. Renumbering performed through the manager itself (recording
//! a delete, undoing an add, ...) moves all consistent entries along to the
//! new version. A version change the manager did not make, such as a graph
//! reload, leaves the stamps behind and the affected entries are refused.

use crate::changes::Change;
use crate::road_map::RoadMap;
use roadnet_core::GraphError;
use roadnet_events::{Event, EventBus};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error(
        "History was recorded against graph version {recorded} but the graph is now at \
         version {current}; discarded {discarded} entries"
    )]
    StaleVersion {
        recorded: u64,
        current: u64,
        discarded: usize,
    },
    #[error("Could not apply '{description}': {source}")]
    Apply {
        description: String,
        #[source]
        source: GraphError,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    change: Change,
    stamp: u64,
}

pub struct ChangeManager {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    max_size: usize,
    /// Structural version the stacks were last brought in line with.
    version: u64,
    event_bus: EventBus,
}

impl ChangeManager {
    pub fn new(max_size: usize, event_bus: EventBus) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            version: 0,
            event_bus,
        }
    }

    /// Push a change that has already been applied to `map`.
    ///
    /// Clears the redo branch. A batch delete is the only recorded change that
    /// renumbers on its own, so the manager accepts exactly that one bump.
    pub fn record(&mut self, change: Change, map: &RoadMap) {
        let current = map.structural_version();
        let expected = match change {
            Change::DeleteNodes { .. } => self.version + 1,
            _ => self.version,
        };
        if current == expected {
            self.restamp(self.version, current);
        } else if self.can_undo() || self.can_redo() {
            tracing::warn!(
                "Graph version moved from {} to {} outside the change manager",
                self.version,
                current
            );
        }
        self.version = current;

        tracing::debug!("Recorded: {}", change.description());
        self.redo_stack.clear();
        self.undo_stack.push(Entry {
            change,
            stamp: current,
        });
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        self.notify_change();
    }

    /// Revert the most recent change.
    ///
    /// On a version mismatch the rest of the undo stack is discarded and the
    /// graph is not touched. When reverting fails the entry is dropped and the
    /// other entries are kept.
    pub fn undo(&mut self, map: &mut RoadMap) -> Result<(), HistoryError> {
        let Some(mut entry) = self.undo_stack.pop() else {
            return Err(HistoryError::NothingToUndo);
        };
        let current = map.structural_version();
        if entry.stamp != current {
            let discarded = self.undo_stack.len() + 1;
            self.undo_stack.clear();
            return Err(self.fail(HistoryError::StaleVersion {
                recorded: entry.stamp,
                current,
                discarded,
            }));
        }

        if let Err(source) = entry.change.undo(map) {
            return Err(self.fail(HistoryError::Apply {
                description: entry.change.description(),
                source,
            }));
        }
        tracing::debug!("Undo: {}", entry.change.description());

        entry.stamp = self.adopt(current, map.structural_version());
        self.redo_stack.push(entry);
        self.notify_change();
        Ok(())
    }

    /// Re-apply the most recently reverted change.
    pub fn redo(&mut self, map: &mut RoadMap) -> Result<(), HistoryError> {
        let Some(mut entry) = self.redo_stack.pop() else {
            return Err(HistoryError::NothingToRedo);
        };
        let current = map.structural_version();
        if entry.stamp != current {
            let discarded = self.redo_stack.len() + 1;
            self.redo_stack.clear();
            return Err(self.fail(HistoryError::StaleVersion {
                recorded: entry.stamp,
                current,
                discarded,
            }));
        }

        if let Err(source) = entry.change.redo(map) {
            return Err(self.fail(HistoryError::Apply {
                description: entry.change.description(),
                source,
            }));
        }
        tracing::debug!("Redo: {}", entry.change.description());

        entry.stamp = self.adopt(current, map.structural_version());
        self.undo_stack.push(entry);
        self.notify_change();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|e| e.change.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|e| e.change.description())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify_change();
    }

    /// Carry entries stamped `before` over to `after` and return the stamp the
    /// entry just applied should get.
    fn adopt(&mut self, before: u64, after: u64) -> u64 {
        if before != after {
            self.restamp(before, after);
        }
        self.version = after;
        after
    }

    fn restamp(&mut self, from: u64, to: u64) {
        if from == to {
            return;
        }
        for entry in self
            .undo_stack
            .iter_mut()
            .chain(self.redo_stack.iter_mut())
            .filter(|entry| entry.stamp == from)
        {
            entry.stamp = to;
        }
    }

    fn fail(&self, error: HistoryError) -> HistoryError {
        tracing::warn!("{error}");
        self.event_bus.publish(Event::HistoryError {
            message: error.to_string(),
        });
        self.notify_change();
        error
    }

    fn notify_change(&self) {
        self.event_bus.publish(Event::HistoryChanged {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_description: self.undo_description(),
            redo_description: self.redo_description(),
        });
    }
}
