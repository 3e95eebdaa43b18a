//! Animation frame scheduling.
//!
//! Frame callbacks run after the current layout pass and before the next
//! paint, i.e. during the next [`Document::render_frame`]. Layout reads done
//! synchronously can therefore be committed as writes one frame later.

use std::collections::VecDeque;

use crate::document::Document;

/// A unique identifier for a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameCallbackId(u64);

impl FrameCallbackId {
    /// Get the raw u64 value of this callback ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A boxed frame callback.
pub type FrameCallback = Box<dyn FnOnce(&mut Document) + Send + Sync + 'static>;

struct FrameTask {
    id: FrameCallbackId,
    callback: FrameCallback,
}

/// Queue of callbacks waiting for the next frame.
#[derive(Default)]
pub(crate) struct FrameScheduler {
    pending: VecDeque<FrameTask>,
    next_id: u64,
    frames_rendered: u64,
}

impl FrameScheduler {
    /// Queue a callback for the next frame.
    pub(crate) fn post(&mut self, callback: FrameCallback) -> FrameCallbackId {
        self.next_id += 1;
        let id = FrameCallbackId(self.next_id);
        self.pending.push_back(FrameTask { id, callback });
        id
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Take the callbacks belonging to the frame that is starting.
    ///
    /// Anything posted after this call waits for the following frame.
    pub(crate) fn begin_frame(&mut self) -> Vec<(FrameCallbackId, FrameCallback)> {
        self.frames_rendered += 1;
        self.pending
            .drain(..)
            .map(|task| (task.id, task.callback))
            .collect()
    }

    pub(crate) fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}
