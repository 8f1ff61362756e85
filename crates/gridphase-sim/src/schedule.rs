// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host frame scheduling port.
//!
//! The loop driver never sleeps or spawns. It asks the host for "the next
//! frame" and receives an opaque handle; when the host later fires that
//! handle the driver runs a tick. Cancelling a handle (or firing a stale one)
//! is how `stop()` guarantees that no further tick runs.

use std::collections::BTreeSet;

/// Opaque token for one requested frame callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Raw handle value, for logging.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Something that can call back on the next frame (an event loop,
/// `requestAnimationFrame`, a timer).
pub trait FrameScheduler {
    /// Requests one callback on the next available frame.
    fn request_frame(&mut self) -> FrameHandle;
    /// Cancels a pending callback. Cancelling an unknown handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Deterministic in-process scheduler: requested handles wait in a set until
/// the host drains them with [`FrameQueue::take_due`].
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    next: u64,
    pending: BTreeSet<FrameHandle>,
}

impl FrameQueue {
    /// Removes and returns every pending handle in request order.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Number of handles waiting to fire.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_ordered() {
        let mut q = FrameQueue::default();
        let a = q.request_frame();
        let b = q.request_frame();
        assert!(a < b);
        assert_eq!(q.take_due(), vec![a, b]);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn cancelled_handles_never_fire() {
        let mut q = FrameQueue::default();
        let a = q.request_frame();
        let b = q.request_frame();
        q.cancel_frame(a);
        q.cancel_frame(FrameHandle(999));
        assert_eq!(q.take_due(), vec![b]);
    }
}
