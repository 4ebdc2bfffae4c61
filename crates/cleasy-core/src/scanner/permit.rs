/// Counting permit bounding how many directory listings run at once.
///
/// Built on a bounded crossbeam channel used as a token bucket: acquiring
/// sends a token (blocking while the channel is full), dropping the guard
/// takes one back out.
use crossbeam_channel::{bounded, Receiver, Sender};

#[derive(Debug)]
pub struct Permits {
    acquire_tx: Sender<()>,
    release_rx: Receiver<()>,
    capacity: usize,
}

impl Permits {
    /// Create a limiter allowing `capacity` holders at once (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (acquire_tx, release_rx) = bounded(capacity);
        Self {
            acquire_tx,
            release_rx,
            capacity,
        }
    }

    /// Block until a permit is free. The permit is released on drop.
    pub fn acquire(&self) -> PermitGuard<'_> {
        // Both channel ends live in `self`, so the channel cannot disconnect.
        let _ = self.acquire_tx.send(());
        PermitGuard { permits: self }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_use(&self) -> usize {
        self.acquire_tx.len()
    }
}

/// A held permit.
#[derive(Debug)]
pub struct PermitGuard<'a> {
    permits: &'a Permits,
}

impl Drop for PermitGuard<'_> {
    fn drop(&mut self) {
        let _ = self.permits.release_rx.try_recv();
    }
}
