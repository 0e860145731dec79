//! Single-slot exchange holding the current generation.
//!
//! The slot is a capacity-one channel. Whoever holds the view is the only
//! actor allowed to read or replace the current generation; everyone else
//! blocks in [`SnapshotStore::take`] until it is handed back. Views are only
//! handed out wrapped in a [`Snapshot`] guard, which puts the view back when
//! dropped, so a panic or early return cannot leave the slot empty.

use std::ops::Deref;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::grid::GridView;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    slot_tx: Sender<GridView>,
    slot_rx: Receiver<GridView>,
}

impl SnapshotStore {
    /// Create a store already holding `view`.
    pub fn new(view: GridView) -> Self {
        let (slot_tx, slot_rx) = crossbeam_channel::bounded(1);
        let store = SnapshotStore { slot_tx, slot_rx };
        store.put(view);
        store
    }

    /// Remove the current view, blocking until one is available.
    pub fn take(&self) -> Snapshot<'_> {
        // Both channel ends live in `self`, so the channel cannot disconnect.
        let view = self
            .slot_rx
            .recv()
            .unwrap_or_else(|_| unreachable!("snapshot store disconnected"));
        log::trace!("snapshot taken");
        self.adopt(view)
    }

    /// Non-blocking variant of [`SnapshotStore::take`].
    pub fn try_take(&self) -> Option<Snapshot<'_>> {
        self.slot_rx.try_recv().ok().map(|view| self.adopt(view))
    }

    /// Channel end that becomes ready whenever the slot is occupied, for use
    /// in `select!`. A view received from it must be passed to
    /// [`SnapshotStore::adopt`] immediately.
    pub fn ready(&self) -> &Receiver<GridView> {
        &self.slot_rx
    }

    /// Wrap a view that was received directly from [`SnapshotStore::ready`].
    pub fn adopt(&self, view: GridView) -> Snapshot<'_> {
        Snapshot { store: self, view: Some(view) }
    }

    pub fn is_empty(&self) -> bool {
        self.slot_rx.is_empty()
    }

    /// Fill the slot. A second view while the slot is occupied means two
    /// actors believed they owned the current generation at once.
    fn put(&self, view: GridView) {
        match self.slot_tx.try_send(view) {
            Ok(()) => log::trace!("snapshot returned"),
            Err(TrySendError::Full(_)) => panic!("snapshot slot already occupied"),
            Err(TrySendError::Disconnected(_)) => unreachable!("snapshot store disconnected"),
        }
    }
}

/// Exclusive access to the current generation.
///
/// Dropping the guard returns the view unchanged; [`Snapshot::replace`]
/// publishes a new generation instead.
#[derive(Debug)]
pub struct Snapshot<'a> {
    store: &'a SnapshotStore,
    view: Option<GridView>,
}

impl Snapshot<'_> {
    /// Publish `next` as the current generation in place of the held one.
    pub fn replace(mut self, next: GridView) {
        self.view = Some(next);
    }

    pub fn view(&self) -> &GridView {
        self
    }
}

impl Deref for Snapshot<'_> {
    type Target = GridView;

    fn deref(&self) -> &GridView {
        // Only vacated in `drop`.
        self.view.as_ref().unwrap_or_else(|| unreachable!("snapshot already returned"))
    }
}

impl Drop for Snapshot<'_> {
    fn drop(&mut self) {
        if let Some(view) = self.view.take() {
            self.store.put(view);
        }
    }
}
