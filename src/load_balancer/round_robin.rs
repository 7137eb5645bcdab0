//! Round-robin slot selection with sticky sessions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::health::InstanceState;
use crate::http::Request;

/// Whether binding a new sticky session consumes a turn of the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StickyBinding {
    /// The slot a new session binds to is also skipped by the next
    /// non-sticky request.
    #[default]
    ConsumeCursor,
    /// New sessions bind to the cursor slot without moving the cursor.
    PreserveRotation,
}

/// Round-robin selector over a fixed number of slots.
///
/// Stores the rotation cursor and the session-key → slot bindings.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    cursor: usize,
    slot_count: usize,
    binding: StickyBinding,
    sessions: HashMap<String, usize>,
}

impl RoundRobin {
    pub fn new(slot_count: usize, binding: StickyBinding) -> Self {
        Self {
            cursor: 0,
            slot_count,
            binding,
            sessions: HashMap::new(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Slot bound to `session_key`, if any.
    pub fn session_slot(&self, session_key: &str) -> Option<usize> {
        self.sessions.get(session_key).copied()
    }

    /// Pick the slot for `request` given the current state of every slot.
    ///
    /// The cursor first moves past initializing slots, giving up after one
    /// full lap. Known sticky sessions return their bound slot whatever its
    /// state.
    pub fn next_slot(&mut self, request: &Request, states: &[InstanceState]) -> usize {
        debug_assert_eq!(states.len(), self.slot_count);

        for _ in 0..self.slot_count {
            if states[self.cursor].is_routable() {
                break;
            }
            self.advance();
        }

        if !request.is_sticky() {
            let slot = self.cursor;
            self.advance();
            return slot;
        }

        if let Some(slot) = self.sessions.get(request.session_key()) {
            return *slot;
        }

        let slot = self.cursor;
        self.sessions.insert(request.session_key().to_string(), slot);
        match self.binding {
            StickyBinding::ConsumeCursor => self.advance(),
            StickyBinding::PreserveRotation => {}
        }
        slot
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.slot_count;
    }
}
