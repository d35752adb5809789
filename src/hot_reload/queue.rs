use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender};

use super::watcher::{ChangeEvent, ChangeSource};

/// Pending change events between the watcher and the update loop.
///
/// Pushing never blocks and may happen from any thread. Popping happens only
/// through `drain_all`, which never waits for new events.
pub struct EventQueue {
    tx: Sender<ChangeEvent>,
    rx: Receiver<ChangeEvent>,
    forwarding: AtomicBool,
    draining: AtomicBool,
}

/// Cloneable push side of an [`EventQueue`]
#[derive(Clone)]
pub struct QueueIntake {
    tx: Sender<ChangeEvent>,
}

impl QueueIntake {
    pub fn push(&self, event: ChangeEvent) {
        // The receiver lives as long as the queue itself
        let _ = self.tx.send(event);
    }
}

/// Clears a guard flag when dropped, including on unwind
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlagGuard(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            forwarding: AtomicBool::new(false),
            draining: AtomicBool::new(false),
        }
    }

    pub fn intake(&self) -> QueueIntake {
        QueueIntake {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Move everything the source has reported into the queue.
    ///
    /// Only one forward may run at a time; an overlapping call is rejected
    /// and returns 0.
    pub fn forward_from(&self, source: &mut dyn ChangeSource) -> usize {
        let Some(_guard) = FlagGuard::acquire(&self.forwarding) else {
            log::warn!("[queue] Forwarding already in progress, rejecting second forwarder");
            return 0;
        };

        let events = source.next_events();
        let count = events.len();
        for event in events {
            self.push(event);
        }
        count
    }

    /// Hand every queued event to `process` until the queue is empty.
    ///
    /// Events pushed while draining are part of the same drain. Only one drain
    /// may run at a time; an overlapping call is rejected and returns 0.
    pub fn drain_all(&self, mut process: impl FnMut(ChangeEvent)) -> usize {
        let Some(_guard) = FlagGuard::acquire(&self.draining) else {
            log::warn!("[queue] Drain already in progress, rejecting nested drain");
            return 0;
        };

        let mut drained = 0;
        while let Ok(event) = self.rx.try_recv() {
            process(event);
            drained += 1;
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
