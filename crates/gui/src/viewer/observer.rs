//! Selection listeners: an id-keyed registry instead of a bare callback
//! list, so removal is well-defined.

use super::error::{Result, ViewerError};
use super::selection::PickedItem;

/// Where a selection change came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOrigin {
    Point { x: f32, y: f32 },
    Area { min: [f32; 2], max: [f32; 2] },
}

/// Snapshot handed to listeners after every selection-changing interaction
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    pub selection: Vec<PickedItem>,
    pub origin: SelectionOrigin,
}

/// Receives selection snapshots. Closures of the matching signature
/// implement this automatically.
pub trait SelectionListener {
    fn on_selection(&mut self, event: &SelectionEvent);
}

impl<F: FnMut(&SelectionEvent)> SelectionListener for F {
    fn on_selection(&mut self, event: &SelectionEvent) {
        self(event)
    }
}

/// Handle for removing a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listener registry. Registering the same listener twice yields
/// two entries with distinct ids; each removal consumes one entry.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn SelectionListener>)>,
}

impl ListenerRegistry {
    pub fn add(&mut self, listener: Box<dyn SelectionListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> Result<()> {
        match self.entries.iter().position(|(eid, _)| *eid == id) {
            Some(pos) => {
                self.entries.remove(pos);
                Ok(())
            }
            None => Err(ViewerError::UnknownListener(id.0)),
        }
    }

    pub fn notify(&mut self, event: &SelectionEvent) {
        for (_, listener) in &mut self.entries {
            listener.on_selection(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
