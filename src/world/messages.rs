//! Typed per-tick message queues
//!
//! Systems publish events with `send` and later systems drain them with
//! `read_messages`. Queues live for one tick: whatever is left unread is
//! dropped at the commit boundary.

use std::any::Any;

/// Type-erased view the world uses to clear queues at commit.
pub(crate) trait AnyMailbox {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clear(&mut self);
}

pub(crate) struct Mailbox<M> {
    queue: Vec<M>,
}

impl<M: 'static> Mailbox<M> {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    pub fn send(&mut self, message: M) {
        self.queue.push(message);
    }

    /// Drains all pending messages in send order.
    pub fn drain(&mut self) -> Vec<M> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<M: 'static> AnyMailbox for Mailbox<M> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}
