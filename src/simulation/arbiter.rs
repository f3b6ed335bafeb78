//! Right-of-way arbitration between the four stoplights
//!
//! A FIFO of approaches waiting for green. The head of the queue is the
//! only approach allowed to hold green, and it keeps that right until its
//! light has finished yellow and releases the queue.

use std::collections::VecDeque;

use super::error::{SimError, SimResult};
use super::types::Approach;

#[derive(Debug, Clone, Default)]
pub struct ActivationArbiter {
    queue: VecDeque<Approach>,
}

impl ActivationArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for green on behalf of `approach`
    ///
    /// Granted when the queue is empty or `approach` already heads it.
    /// Otherwise the approach is queued once at the tail and must wait.
    pub fn request_activation(&mut self, approach: Approach) -> bool {
        match self.queue.front() {
            None => {
                self.queue.push_back(approach);
                true
            }
            Some(head) if *head == approach => true,
            Some(_) => {
                if !self.queue.contains(&approach) {
                    self.queue.push_back(approach);
                }
                false
            }
        }
    }

    /// Hand the right of way on once `approach` has completed its cycle
    pub fn release_head(&mut self, approach: Approach) -> SimResult<()> {
        match self.queue.front() {
            Some(head) if *head == approach => {
                self.queue.pop_front();
                Ok(())
            }
            head => Err(SimError::ArbiterOrder {
                expected: head.copied(),
                got: approach,
            }),
        }
    }

    /// The approach currently holding the right of way
    pub fn head(&self) -> Option<Approach> {
        self.queue.front().copied()
    }

    pub fn contains(&self, approach: Approach) -> bool {
        self.queue.contains(&approach)
    }

    pub fn queued(&self) -> impl Iterator<Item = Approach> + '_ {
        self.queue.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
