/// Scan progress reporting over a crossbeam channel.
///
/// Each message is the number of subdirectories one directory turned out to
/// contain, sent once that directory has been listed (never zero). Summing
/// the messages approximates "directories discovered so far". The walker
/// drops its sender only after every listing task has finished, so a
/// disconnected channel means the tree is complete.
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

pub type ProgressSender = Sender<usize>;
pub type ProgressReceiver = Receiver<usize>;

/// Maximum number of messages [`ProgressTally::absorb`] drains per call.
///
/// A UI draining once per frame cannot stall on a large backlog.
pub const PROGRESS_DRAIN_LIMIT: usize = 300;

/// Create an unbounded progress channel.
///
/// Unbounded so that walker tasks never block on a slow consumer.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    crossbeam_channel::unbounded()
}

/// Block until the channel closes and return the sum of all messages.
pub fn drain_progress(rx: &ProgressReceiver) -> usize {
    rx.iter().sum()
}

/// Running total kept by a consumer that polls without blocking.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressTally {
    /// Sum of received subdirectory counts.
    pub dirs_discovered: usize,
    /// Set once the channel has closed: the scan has finished.
    pub finished: bool,
}

impl ProgressTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain up to [`PROGRESS_DRAIN_LIMIT`] pending messages.
    ///
    /// Returns `true` if anything changed (new counts or completion).
    pub fn absorb(&mut self, rx: &ProgressReceiver) -> bool {
        if self.finished {
            return false;
        }
        let mut changed = false;
        for _ in 0..PROGRESS_DRAIN_LIMIT {
            match rx.try_recv() {
                Ok(count) => {
                    self.dirs_discovered += count;
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    changed = true;
                    break;
                }
            }
        }
        changed
    }

    /// Wait up to `timeout` for a message, then drain whatever else is
    /// pending, like [`absorb`](Self::absorb).
    ///
    /// Returns as soon as something arrives or the channel closes, so a
    /// consumer looping on this reads the channel at the rate it is fed.
    pub fn absorb_timeout(&mut self, rx: &ProgressReceiver, timeout: Duration) -> bool {
        if self.finished {
            return false;
        }
        match rx.recv_timeout(timeout) {
            Ok(count) => {
                self.dirs_discovered += count;
                self.absorb(rx);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.finished = true;
                true
            }
        }
    }
}
